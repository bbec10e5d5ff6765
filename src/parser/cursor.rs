use crate::lexer::Token;
use crate::parser::{InnerParseError, Result};
use crate::source::{Source, SourcePosition, Sourced};

/// Token cursor with an explicit integer position.
///
/// [source_from](Cursor::source_from) turns a bookmarked start index into
/// the joined span of every token consumed since, which is how parsed nodes
/// get byte-exact source text.
#[derive(Debug)]
pub struct Cursor<'a> {
    tokens: &'a [Sourced<Token>],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Sourced<Token>]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.position
    }

    /// Joined span of the tokens consumed since `start_index`.
    ///
    /// # Panics
    /// Panics if no token was consumed since the bookmark; callers only ask
    /// for the span of a construct they have committed to.
    pub fn source_from(&self, start_index: usize) -> Source {
        let spans: Vec<Source> = self.tokens[start_index..self.position]
            .iter()
            .map(|t| t.source.clone())
            .collect();
        Source::join(&spans)
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|t| &t.value)
    }

    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n).map(|t| &t.value)
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub fn bump(&mut self) {
        self.position += 1;
    }

    /// Consumes the next token if it equals `t`, returning its span.
    pub fn take_if(&mut self, t: &Token) -> Option<Source> {
        let matched = self
            .tokens
            .get(self.position)
            .filter(|next| next.value == *t)?;
        let source = matched.source.clone();
        self.position += 1;
        Some(source)
    }

    pub fn next_or_error(&mut self) -> Result<&Sourced<Token>> {
        let next = self
            .tokens
            .get(self.position)
            .ok_or_else(|| InnerParseError::UnexpectedEof.at(self.end_position()))?;
        self.position += 1;
        Ok(next)
    }

    pub fn peek_or_error(&self) -> Result<&Sourced<Token>> {
        self.tokens
            .get(self.position)
            .ok_or_else(|| InnerParseError::UnexpectedEof.at(self.end_position()))
    }

    /// Consumes the next token, which must equal `t`, and returns its span.
    pub fn expect(&mut self, t: &Token) -> Result<Source> {
        let next = self.next_or_error()?;
        if next.value == *t {
            Ok(next.source.clone())
        } else {
            let position = next.source.start();
            Err(InnerParseError::ExpectedButGot(t.clone(), next.value.clone()).at(position))
        }
    }

    /// Position to report when the input ends too early.
    pub fn end_position(&self) -> SourcePosition {
        self.tokens
            .last()
            .map_or(SourcePosition::START, |t| t.source.end())
    }
}
