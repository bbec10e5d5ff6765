use crate::source::SourcePosition;
use std::{error, fmt};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InnerLexError {
    UnexpectedChar(char),
    BadIntLiteral(String),
}

/// A lexical error with the position of the offending text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub inner: InnerLexError,
    pub position: SourcePosition,
}

impl InnerLexError {
    pub(super) fn at(self, position: SourcePosition) -> LexError {
        LexError {
            inner: self,
            position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}", self.inner, self.position)
    }
}

impl fmt::Display for InnerLexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedChar(c) => write!(f, "unexpected character: `{c}`"),
            Self::BadIntLiteral(s) => write!(f, "bad integer literal: `{s}`"),
        }
    }
}

impl error::Error for LexError {}
impl error::Error for InnerLexError {}
