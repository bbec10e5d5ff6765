//! Lexer: turns raw program text into source-tracked tokens.
//!
//! Single left-to-right scan with maximal munch for multi-character symbols.
//! Every produced token's span exactly bounds its matched text, so joining
//! all token spans in order reproduces the input byte-for-byte.

mod cursor;
mod lexer_error;
mod token;

#[cfg(test)]
mod lexer_tests;

use crate::source::{Source, Sourced};
use cursor::Cursor;

pub use lexer_error::{InnerLexError, LexError};
pub use token::Token;

pub type Tokens = Vec<Sourced<Token>>;
pub type Result<T> = std::result::Result<T, LexError>;

pub fn lex(input: &str) -> Result<Tokens> {
    let mut tokens = Tokens::new();
    let mut cursor = Cursor::new(input);

    loop {
        cursor.skip_whitespaces();
        let Some(c) = cursor.peek() else {
            break;
        };

        let token = match c {
            'a'..='z' | 'A'..='Z' => lex_word(&mut cursor),
            '0'..='9' => lex_int_literal(&mut cursor)?,
            _ => lex_symbol(&mut cursor)?,
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Maximal run of `[a-zA-Z0-9_]` starting with a letter: a reserved word if
/// it matches the fixed table exactly, else an identifier. A leading digit
/// or underscore never reaches this function.
fn lex_word(cursor: &mut Cursor) -> Sourced<Token> {
    let start = cursor.position();
    let word = cursor.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
    let end = cursor.position();

    let token = Token::from(word.as_str());
    Sourced::new(token, Source::new(word, start, end))
}

/// Maximal run of digits. A multi-digit literal starting with `0` and a
/// digit run immediately followed by a letter or underscore (e.g. `1234r`)
/// are both malformed literals.
fn lex_int_literal(cursor: &mut Cursor) -> Result<Sourced<Token>> {
    let start = cursor.position();
    let mut digits = cursor.take_while(|c| c.is_ascii_digit());

    if cursor
        .peek()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        let rest = cursor.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        digits.push_str(&rest);
        return Err(InnerLexError::BadIntLiteral(digits).at(start));
    }

    if digits.len() > 1 && digits.starts_with('0') {
        return Err(InnerLexError::BadIntLiteral(digits).at(start));
    }

    let end = cursor.position();
    let token = Token::IntLiteral(digits.clone());
    Ok(Sourced::new(token, Source::new(digits, start, end)))
}

fn lex_symbol(cursor: &mut Cursor) -> Result<Sourced<Token>> {
    let start = cursor.position();
    let first = cursor.take().expect("caller peeked a character");

    let token = match first {
        // these only exist doubled
        '&' | '|' => {
            if cursor.skip_if(|c| c == first) {
                if first == '&' {
                    Token::AndAnd
                } else {
                    Token::OrOr
                }
            } else {
                return Err(InnerLexError::UnexpectedChar(first).at(start));
            }
        }
        // maximal munch: `==` before `=`, `<=` before `<`, ..
        '=' | '!' | '<' | '>' if cursor.peek() == Some('=') => {
            cursor.take();
            match first {
                '=' => Token::EqualsEquals,
                '!' => Token::NotEquals,
                '<' => Token::LessThanEquals,
                _ => Token::GreaterThanEquals,
            }
        }
        _ => Token::try_from(first).map_err(|err| err.at(start))?,
    };

    let end = cursor.position();
    let text = token.literal().to_owned();
    Ok(Sourced::new(token, Source::new(text, start, end)))
}
