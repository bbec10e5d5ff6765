#[cfg(feature = "codegen")]
use structlang::codegen::CodegenError;
#[cfg(feature = "lexer")]
use structlang::lexer::LexError;
#[cfg(feature = "parser")]
use structlang::parser::ParseError;
#[cfg(feature = "typechecker")]
use structlang::typechecker::TypeError;

pub enum DriverError {
    BadInputExtension(String),
    BadOutputExtension(String),
    MissingOutputFile,
    LexerError(String),
    ParserError(String),
    TypecheckError(String),
    CodegenError(String),
    IoError(String),
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::BadInputExtension(name) => {
                write!(f, "input file {name} must have a .sl or .txt extension")
            }
            Self::BadOutputExtension(name) => {
                write!(f, "output file {name} must have a .c extension")
            }
            Self::MissingOutputFile => write!(f, "no output file given"),
            Self::LexerError(e) => write!(f, "lex error: {e}"),
            Self::ParserError(e) => write!(f, "parse error: {e}"),
            Self::TypecheckError(e) => write!(f, "{e}"),
            Self::CodegenError(e) => write!(f, "codegen error: {e}"),
            Self::IoError(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::fmt::Debug for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl std::error::Error for DriverError {}

#[cfg(feature = "lexer")]
impl From<LexError> for DriverError {
    fn from(e: LexError) -> Self {
        Self::LexerError(e.to_string())
    }
}

#[cfg(feature = "parser")]
impl From<ParseError> for DriverError {
    fn from(e: ParseError) -> Self {
        Self::ParserError(e.to_string())
    }
}

#[cfg(feature = "typechecker")]
impl From<TypeError> for DriverError {
    fn from(e: TypeError) -> Self {
        Self::TypecheckError(e.to_string())
    }
}

#[cfg(feature = "codegen")]
impl From<CodegenError> for DriverError {
    fn from(e: CodegenError) -> Self {
        Self::CodegenError(e.to_string())
    }
}

impl From<std::io::Error> for DriverError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}
