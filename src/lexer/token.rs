use super::lexer_error::InnerLexError;
use std::fmt;

/// Basic token type.
///
/// Tokens carry their literal text where it is not fixed by the variant
/// ([Identifier](Token::Identifier) and [IntLiteral](Token::IntLiteral));
/// everything else reproduces its text via [literal](Token::literal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// any unreserved word (variable, function, struct and field names)
    Identifier(String),
    /// integer literal, kept as raw text so spans reproduce the input
    IntLiteral(String),
    /// int keyword
    Int,
    /// bool keyword
    Bool,
    /// void keyword
    Void,
    /// struct keyword
    Struct,
    /// func keyword
    Func,
    /// true keyword
    True,
    /// false keyword
    False,
    /// null keyword
    Null,
    /// new keyword
    New,
    /// if keyword
    If,
    /// else keyword
    Else,
    /// while keyword
    While,
    /// break keyword
    Break,
    /// println keyword
    Println,
    /// return keyword
    Return,
    /// ,
    Comma,
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// ;
    Semicolon,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// :
    Colon,
    /// .
    Dot,
    /// *
    Star,
    /// /
    Slash,
    /// +
    Plus,
    /// -
    Minus,
    /// &&
    AndAnd,
    /// ||
    OrOr,
    /// !
    Not,
    /// ==
    EqualsEquals,
    /// !=
    NotEquals,
    /// <
    LessThan,
    /// <=
    LessThanEquals,
    /// >
    GreaterThan,
    /// >=
    GreaterThanEquals,
    /// =
    Assign,
}

impl Token {
    /// The exact text this token was lexed from.
    pub fn literal(&self) -> &str {
        match self {
            Self::Identifier(s) | Self::IntLiteral(s) => s,
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Void => "void",
            Self::Struct => "struct",
            Self::Func => "func",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::New => "new",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Break => "break",
            Self::Println => "println",
            Self::Return => "return",
            Self::Comma => ",",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Semicolon => ";",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Not => "!",
            Self::EqualsEquals => "==",
            Self::NotEquals => "!=",
            Self::LessThan => "<",
            Self::LessThanEquals => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEquals => ">=",
            Self::Assign => "=",
        }
    }

    #[inline]
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanEquals | Self::GreaterThan | Self::GreaterThanEquals
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}`", self.literal())
    }
}

impl TryFrom<char> for Token {
    type Error = InnerLexError;
    fn try_from(c: char) -> Result<Self, InnerLexError> {
        match c {
            ',' => Ok(Self::Comma),
            '{' => Ok(Self::LeftBrace),
            '}' => Ok(Self::RightBrace),
            ';' => Ok(Self::Semicolon),
            '(' => Ok(Self::LeftParen),
            ')' => Ok(Self::RightParen),
            ':' => Ok(Self::Colon),
            '.' => Ok(Self::Dot),
            '*' => Ok(Self::Star),
            '/' => Ok(Self::Slash),
            '+' => Ok(Self::Plus),
            '-' => Ok(Self::Minus),
            '!' => Ok(Self::Not),
            '<' => Ok(Self::LessThan),
            '>' => Ok(Self::GreaterThan),
            '=' => Ok(Self::Assign),
            // `|` and `&` only exist as the two-character forms
            _ => Err(InnerLexError::UnexpectedChar(c)),
        }
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        match s {
            "int" => Self::Int,
            "bool" => Self::Bool,
            "void" => Self::Void,
            "struct" => Self::Struct,
            "func" => Self::Func,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            "new" => Self::New,
            "if" => Self::If,
            "else" => Self::Else,
            "while" => Self::While,
            "break" => Self::Break,
            "println" => Self::Println,
            "return" => Self::Return,
            _ => Self::Identifier(s.to_owned()),
        }
    }
}
