use std::fmt;

pub type Result<T> = std::result::Result<T, CodegenError>;

/// Failures while emitting C. The ownership variants reject programs that
/// typecheck but have no leak-free lowering; the others are internal and
/// not expected for any typechecked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    UntypedExpression(String),
    ReturnedBorrow(String),
    UnboundAllocation(String),
    Emit(fmt::Error),
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UntypedExpression(text) => write!(
                f,
                "expression `{text}` reached code generation without a resolved type"
            ),
            Self::ReturnedBorrow(text) => {
                write!(f, "cannot return `{text}`: the function does not own it")
            }
            Self::UnboundAllocation(text) => write!(
                f,
                "the value of `{text}` is never received and cannot be freed; \
                 bind it to a variable first"
            ),
            Self::Emit(inner) => write!(f, "failed to write generated code: {inner}"),
        }
    }
}

impl From<fmt::Error> for CodegenError {
    fn from(inner: fmt::Error) -> Self {
        Self::Emit(inner)
    }
}

impl std::error::Error for CodegenError {}
