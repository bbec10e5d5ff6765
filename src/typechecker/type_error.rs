use crate::ast::{BinaryOp, Identifier, TypeKind, UnaryOp};
use crate::source::{caret_excerpt, Source};
use std::fmt;

pub type Result<T> = std::result::Result<T, TypeError>;

#[derive(Debug, Clone, PartialEq)]
pub enum InnerTypeError {
    DuplicateStructDefinition(Identifier),
    DuplicateFunctionDefinition(Identifier),
    DuplicateField(Identifier),
    DuplicateParam(Identifier),
    VoidField(Identifier),
    VoidVariable(Identifier),
    UndeclaredStruct(Identifier),
    UndeclaredVariable(Identifier),
    VariableRedeclaration(Identifier),
    UndeclaredFunction(Identifier),
    WrongArgumentCount {
        function: Identifier,
        expected: usize,
        got: usize,
    },
    MismatchedType {
        expected: TypeKind,
        got: TypeKind,
    },
    BadOperands {
        op: BinaryOp,
        left: TypeKind,
        right: TypeKind,
    },
    BadUnaryOperand {
        op: UnaryOp,
        got: TypeKind,
    },
    NotAStruct(TypeKind),
    NoSuchField {
        struct_name: Identifier,
        field: Identifier,
    },
    MissingFieldInit {
        struct_name: Identifier,
        field: Identifier,
    },
    DuplicateFieldInit(Identifier),
    ConditionNotBool(TypeKind),
    PrintlnType(TypeKind),
    BreakOutsideLoop,
    MissingReturn(Identifier),
}

/// A type error rendered as a caret-pointer excerpt: the enclosing
/// construct's text truncated to the offending child's lines, carets under
/// the child, the message below.
#[derive(Debug, Clone)]
pub struct TypeError {
    pub inner: InnerTypeError,
    rendered: String,
}

impl InnerTypeError {
    pub(super) fn within(self, being_checked: &str, parent: &Source, child: &Source) -> TypeError {
        let rendered =
            caret_excerpt("Typechecker", being_checked, parent, child, &self.to_string());
        TypeError {
            inner: self,
            rendered,
        }
    }
}

// Comparing the kind alone lets tests assert on what went wrong without
// reproducing the rendered excerpt.
impl PartialEq for TypeError {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

impl fmt::Display for InnerTypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use InnerTypeError as TE;
        match self {
            TE::DuplicateStructDefinition(name) => {
                write!(f, "struct `{name}` is defined more than once")
            }
            TE::DuplicateFunctionDefinition(name) => {
                write!(f, "function `{name}` is defined more than once")
            }
            TE::DuplicateField(name) => write!(f, "field `{name}` is declared more than once"),
            TE::DuplicateParam(name) => {
                write!(f, "parameter `{name}` is declared more than once")
            }
            TE::VoidField(name) => write!(f, "field `{name}` cannot have type `void`"),
            TE::VoidVariable(name) => write!(f, "variable `{name}` cannot have type `void`"),
            TE::UndeclaredStruct(name) => write!(f, "struct type `{name}` is not defined"),
            TE::UndeclaredVariable(name) => write!(f, "variable `{name}` is not in scope"),
            TE::VariableRedeclaration(name) => {
                write!(f, "variable `{name}` is already declared in this scope")
            }
            TE::UndeclaredFunction(name) => write!(f, "function `{name}` is not defined"),
            TE::WrongArgumentCount {
                function,
                expected,
                got,
            } => write!(
                f,
                "function `{function}` takes {expected} arguments, but {got} were supplied"
            ),
            TE::MismatchedType { expected, got } => {
                write!(f, "expected type `{expected}`, but found `{got}`")
            }
            TE::BadOperands { op, left, right } => write!(
                f,
                "operator `{op}` cannot be applied to `{left}` and `{right}`"
            ),
            TE::BadUnaryOperand { op, got } => {
                write!(f, "operator `{}` cannot be applied to `{got}`", op.symbol())
            }
            TE::NotAStruct(ty) => write!(f, "type `{ty}` has no fields"),
            TE::NoSuchField { struct_name, field } => {
                write!(f, "struct `{struct_name}` has no field `{field}`")
            }
            TE::MissingFieldInit { struct_name, field } => write!(
                f,
                "allocation of struct `{struct_name}` is missing field `{field}`"
            ),
            TE::DuplicateFieldInit(name) => {
                write!(f, "field `{name}` is initialized more than once")
            }
            TE::ConditionNotBool(ty) => {
                write!(f, "condition must be `bool`, but found `{ty}`")
            }
            TE::PrintlnType(ty) => write!(
                f,
                "println argument must be `int` or `bool`, but found `{ty}`"
            ),
            TE::BreakOutsideLoop => write!(f, "break used outside of a loop"),
            TE::MissingReturn(name) => {
                write!(f, "function `{name}` does not return on every path")
            }
        }
    }
}

impl std::error::Error for TypeError {}
impl std::error::Error for InnerTypeError {}
