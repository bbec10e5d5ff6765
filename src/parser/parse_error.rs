use crate::lexer::Token;
use crate::source::SourcePosition;
use std::fmt;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerParseError {
    ExpectedButGot(Token, Token),
    ExpectedIdentifierButGot(Token),
    ExpectedTypeButGot(Token),
    ExpectedExpressionButGot(Token),
    ExpectedStatementButGot(Token),
    ChainedComparison(Token),
    IntLiteralOutOfRange(String),
    UnexpectedEof,
}

/// A syntax error with the position of the offending token (or of the end
/// of input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub inner: InnerParseError,
    pub position: SourcePosition,
}

impl InnerParseError {
    pub(super) fn at(self, position: SourcePosition) -> ParseError {
        ParseError {
            inner: self,
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}", self.inner, self.position)
    }
}

impl fmt::Display for InnerParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use InnerParseError as PE;
        match self {
            PE::ExpectedButGot(expected, got) => {
                write!(f, "expected {expected}, but got {got}")
            }
            PE::ExpectedIdentifierButGot(got) => {
                write!(f, "expected an identifier, but got {got}")
            }
            PE::ExpectedTypeButGot(got) => write!(f, "expected a type, but got {got}"),
            PE::ExpectedExpressionButGot(got) => {
                write!(f, "expected an expression, but got {got}")
            }
            PE::ExpectedStatementButGot(got) => {
                write!(f, "expected a statement, but got {got}")
            }
            PE::ChainedComparison(got) => write!(
                f,
                "comparison operators cannot be chained (unexpected {got})"
            ),
            PE::IntLiteralOutOfRange(literal) => {
                write!(f, "integer literal `{literal}` does not fit in an int")
            }
            PE::UnexpectedEof => write!(f, "reached unexpected end of input"),
        }
    }
}

impl std::error::Error for ParseError {}
impl std::error::Error for InnerParseError {}
