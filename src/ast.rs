//! AST node model.
//!
//! Nodes are built once by the parser and stay immutable afterwards, except
//! for an expression's resolved-type slot which the typechecker fills in
//! exactly once. Every node keeps the [Source] span it was parsed from;
//! structural equality ignores spans so trees compare cleanly in tests.

use crate::source::{Source, Sourced};
use std::fmt;

pub type Identifier = String;

/// Semantic type of an expression or declaration.
///
/// `Struct(None)` is the type of the `null` literal: it is assignment- and
/// equality-compatible with every struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Int,
    Bool,
    Void,
    Struct(Option<Identifier>),
}

/// A type annotation as written in the program, with its span.
pub type Type = Sourced<TypeKind>;

impl TypeKind {
    /// Struct name, for declared (non-null) struct types.
    pub fn struct_name(&self) -> Option<&Identifier> {
        match self {
            Self::Struct(name) => name.as_ref(),
            _ => None,
        }
    }

    /// Whether a slot declared with `self` accepts a value of type `other`.
    /// Exact matches aside, every struct slot accepts `null` (and the null
    /// type never appears as a declared slot type).
    pub fn accepts(&self, other: &TypeKind) -> bool {
        match (self, other) {
            (Self::Struct(_), Self::Struct(None)) => true,
            _ => self == other,
        }
    }

    /// Whether `==`/`!=` may compare values of these two types.
    pub fn equality_comparable_to(&self, other: &TypeKind) -> bool {
        self.accepts(other) || other.accepts(self)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Void => write!(f, "void"),
            Self::Struct(Some(name)) => write!(f, "{name}"),
            Self::Struct(None) => write!(f, "null"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::LessThan => "<",
            Self::LessThanEquals => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEquals => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }

    #[inline]
    pub fn is_logical(self) -> bool {
        matches!(self, Self::Or | Self::And)
    }

    #[inline]
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Equals | Self::NotEquals)
    }

    #[inline]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanEquals | Self::GreaterThan | Self::GreaterThanEquals
        )
    }

    #[inline]
    pub fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Subtract | Self::Multiply | Self::Divide)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One `name: exp` initializer inside a struct allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit {
    pub name: Sourced<Identifier>,
    pub value: Exp,
}

/// `new Name { field: exp, .. }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructAlloc {
    pub struct_name: Sourced<Identifier>,
    pub fields: Vec<FieldInit>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpKind {
    IntLiteral(i32),
    BoolLiteral(bool),
    Null,
    Var(Identifier),
    Unary(UnaryOp, Box<Exp>),
    Binary(BinaryOp, Box<Exp>, Box<Exp>),
    Dot(Box<Exp>, Sourced<Identifier>),
    Paren(Box<Exp>),
    Call(Sourced<Identifier>, Vec<Exp>),
    New(StructAlloc),
}

/// An expression with its span and resolved-type slot.
///
/// `ty` is `None` straight out of the parser and holds exactly one type
/// after the typechecker has run.
#[derive(Debug, Clone)]
pub struct Exp {
    pub kind: ExpKind,
    pub source: Source,
    pub ty: Option<TypeKind>,
}

impl Exp {
    pub fn new(kind: ExpKind, source: Source) -> Self {
        Self {
            kind,
            source,
            ty: None,
        }
    }

    /// The variable this expression names, looking through parentheses.
    /// Used by codegen to decide ownership moves and return escapes.
    pub fn as_var(&self) -> Option<&Identifier> {
        match &self.kind {
            ExpKind::Var(name) => Some(name),
            ExpKind::Paren(inner) => inner.as_var(),
            _ => None,
        }
    }

    /// Whether evaluating this expression produces a fresh heap allocation
    /// the surrounding code becomes responsible for.
    pub fn is_owning(&self) -> bool {
        match &self.kind {
            ExpKind::New(_) | ExpKind::Call(..) => true,
            ExpKind::Paren(inner) => inner.is_owning(),
            _ => false,
        }
    }

    /// Whether this is the `null` literal, looking through parentheses.
    pub fn is_null(&self) -> bool {
        match &self.kind {
            ExpKind::Null => true,
            ExpKind::Paren(inner) => inner.is_null(),
            _ => false,
        }
    }
}

impl PartialEq for Exp {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub source: Source,
}

impl Block {
    pub fn new(statements: Vec<Stmt>, source: Source) -> Self {
        Self { statements, source }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    VarDec {
        var_type: Type,
        name: Sourced<Identifier>,
        init: Exp,
    },
    Assign {
        name: Sourced<Identifier>,
        value: Exp,
    },
    If {
        condition: Exp,
        then: Box<Stmt>,
        els: Option<Box<Stmt>>,
    },
    While {
        condition: Exp,
        body: Box<Stmt>,
    },
    Break,
    Return(Option<Exp>),
    Println(Exp),
    Exp(Exp),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub source: Source,
}

impl Stmt {
    pub fn new(kind: StmtKind, source: Source) -> Self {
        Self { kind, source }
    }
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// A `type name` pair: struct field or function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub param_type: Type,
    pub name: Sourced<Identifier>,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: Sourced<Identifier>,
    pub fields: Vec<Param>,
    pub source: Source,
}

impl StructDef {
    pub fn field(&self, name: &str) -> Option<&Param> {
        self.fields.iter().find(|f| *f.name.value == *name)
    }
}

impl PartialEq for StructDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: Sourced<Identifier>,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Block,
    pub source: Source,
}

impl PartialEq for FunctionDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.return_type == other.return_type
            && self.body == other.body
    }
}

/// A whole source unit: struct definitions, then function definitions, then
/// top-level statements, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub struct_defs: Vec<StructDef>,
    pub function_defs: Vec<FunctionDef>,
    pub statements: Vec<Stmt>,
}
