use crate::source::SourcePosition;
use std::str::Chars;

/// Character cursor that tracks the 1-indexed line and column of the next
/// unread character.
#[derive(Clone)]
pub struct Cursor<'a> {
    chars: Chars<'a>,
    position: SourcePosition,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self {
            chars: s.chars(),
            position: SourcePosition::START,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn position(&self) -> SourcePosition {
        self.position
    }

    pub fn take(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        Some(c)
    }

    #[inline]
    pub fn skip_if(&mut self, p: impl FnOnce(char) -> bool) -> bool {
        let skipped = self.peek().filter(|&c| p(c)).is_some();
        if skipped {
            self.take();
        }
        skipped
    }

    pub fn skip_whitespaces(&mut self) {
        while self.skip_if(char::is_whitespace) {}
    }

    /// Takes characters while `p` holds, returning the consumed run.
    pub fn take_while(&mut self, p: impl Fn(char) -> bool) -> String {
        let mut buf = String::new();
        while let Some(c) = self.peek().filter(|&c| p(c)) {
            self.take();
            buf.push(c);
        }
        buf
    }
}
