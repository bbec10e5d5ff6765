//! Source positions, spans and caret-pointer excerpts.
//!
//! Every token and AST node carries a [Source] locating it in the original
//! input, so that parser and typechecker diagnostics can point at the exact
//! offending text.

use std::fmt;
use std::ops::Deref;

/// 1-indexed (line, column) pair. End positions of a span are exclusive:
/// they point one past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub const START: SourcePosition = SourcePosition { line: 1, column: 1 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A contiguous (or logically joined) span of original source text together
/// with its start and end positions. Invariant: `start <= end` ordered by
/// (line, column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    text: String,
    start: SourcePosition,
    end: SourcePosition,
}

impl Source {
    pub fn new(text: impl Into<String>, start: SourcePosition, end: SourcePosition) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Placeholder span for nodes built directly in tests.
    pub fn empty() -> Self {
        Self::new("", SourcePosition::START, SourcePosition::START)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start(&self) -> SourcePosition {
        self.start
    }

    pub fn end(&self) -> SourcePosition {
        self.end
    }

    /// Joins an ordered list of spans into one span covering all of them.
    ///
    /// The whitespace that separated consecutive spans in the original input
    /// is recomputed from the gap between their positions and re-inserted,
    /// so the joined text is byte-identical to the original source slice.
    /// Newlines inside the gap collapse the column to the start of the last
    /// line, which is all the information the positions retain.
    ///
    /// # Panics
    /// Panics if `sources` is empty; joining zero spans has no meaning.
    pub fn join(sources: &[Source]) -> Source {
        assert!(!sources.is_empty(), "cannot join an empty list of sources");

        if sources.len() == 1 {
            return sources[0].clone();
        }

        let mut text = String::from(sources[0].text());
        let mut previous_end = sources[0].end();

        for source in &sources[1..] {
            let start = source.start();
            let (newlines, spaces) = gap_between(previous_end, start);
            for _ in 0..newlines {
                text.push('\n');
            }
            for _ in 0..spaces {
                text.push(' ');
            }
            text.push_str(source.text());
            previous_end = source.end();
        }

        Source::new(text, sources[0].start(), previous_end)
    }

    /// Human-readable position range, with exclusive end columns shifted
    /// back so the printed range is inclusive.
    pub fn position_string(&self) -> String {
        if self.start.line == self.end.line {
            format!(
                "line {}, columns {} to {}",
                self.start.line,
                self.start.column,
                self.end.column - 1
            )
        } else {
            format!(
                "{} to line {}, column {}",
                self.start,
                self.end.line,
                self.end.column - 1
            )
        }
    }
}

/// Whitespace separating two adjacent spans, as (newlines, spaces).
fn gap_between(previous_end: SourcePosition, next_start: SourcePosition) -> (usize, usize) {
    if previous_end.line == next_start.line {
        (0, next_start.column.saturating_sub(previous_end.column))
    } else {
        // After a newline the column restarts at 1, so the gap on the last
        // line is everything before the next span's column.
        (
            next_start.line.saturating_sub(previous_end.line),
            next_start.column.saturating_sub(1),
        )
    }
}

/// Renders the caret-pointer excerpt used by parser and typechecker errors:
/// the parent's text truncated to the lines spanning the child, a run of `^`
/// under the child, and the message below.
pub fn caret_excerpt(
    error_kind: &str,
    being_checked: &str,
    parent: &Source,
    child: &Source,
    message: &str,
) -> String {
    let mut out = format!(
        "{} error when evaluating {} at {}:\n",
        error_kind,
        being_checked,
        child.start()
    );

    let lines_to_print = (child.end().line - parent.start().line) + 1;
    for line in parent.text().lines().take(lines_to_print) {
        out.push_str(line);
        out.push('\n');
    }

    let spaces = if child.start().line == parent.start().line {
        child.start().column.saturating_sub(parent.start().column)
    } else {
        child.start().column.saturating_sub(1)
    };
    let prefix = " ".repeat(spaces);

    // a child spanning several lines gets carets across its first line
    let caret_width = if child.end().line == child.start().line {
        child.end().column.saturating_sub(child.start().column)
    } else {
        child.text().lines().next().map_or(1, |line| line.chars().count())
    };
    let carets = "^".repeat(caret_width.max(1));

    out.push_str(&prefix);
    out.push_str(&carets);
    out.push('\n');
    out.push_str(&prefix);
    out.push_str("    ");
    out.push_str(message);
    out.push('\n');

    out
}

/// A value paired with the span it came from.
///
/// Equality ignores the span so that token streams and AST fragments can be
/// compared structurally in tests.
#[derive(Debug, Clone)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    pub fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }
}

impl<T: PartialEq> PartialEq for Sourced<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Sourced<T> {}

impl<T> Deref for Sourced<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: fmt::Display> fmt::Display for Sourced<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}", self.value, self.source.position_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, start: (usize, usize), end: (usize, usize)) -> Source {
        Source::new(
            text,
            SourcePosition::new(start.0, start.1),
            SourcePosition::new(end.0, end.1),
        )
    }

    #[test]
    fn test_join_single_is_identity() {
        let source = span("int", (1, 1), (1, 4));
        assert_eq!(source, Source::join(std::slice::from_ref(&source)));
    }

    #[test]
    fn test_join_same_line_restores_spacing() {
        let a = span("int", (1, 1), (1, 4));
        let b = span("x", (1, 6), (1, 7));
        let c = span("=", (1, 8), (1, 9));
        let joined = Source::join(&[a, b, c]);
        assert_eq!("int  x =", joined.text());
        assert_eq!(SourcePosition::new(1, 1), joined.start());
        assert_eq!(SourcePosition::new(1, 9), joined.end());
    }

    #[test]
    fn test_join_across_lines_restores_newlines_and_indent() {
        let a = span("{", (1, 1), (1, 2));
        let b = span("break", (3, 5), (3, 10));
        let joined = Source::join(&[a, b]);
        assert_eq!("{\n\n    break", joined.text());
    }

    #[test]
    #[should_panic(expected = "empty list")]
    fn test_join_empty_panics() {
        let _ = Source::join(&[]);
    }

    #[test]
    fn test_position_string_single_line() {
        let source = span("true", (2, 5), (2, 9));
        assert_eq!("line 2, columns 5 to 8", source.position_string());
    }

    #[test]
    fn test_caret_excerpt_points_at_child() {
        let parent = span("int x = true;", (1, 1), (1, 14));
        let child = span("true", (1, 9), (1, 13));
        let rendered = caret_excerpt(
            "Typechecker",
            "variable declaration",
            &parent,
            &child,
            "expression type does not match declared type `int`",
        );
        let expected = "Typechecker error when evaluating variable declaration \
                        at line 1, column 9:\n\
                        int x = true;\n        ^^^^\n        \
                        \u{20}   expression type does not match declared type `int`\n";
        assert_eq!(expected, rendered);
    }

    #[test]
    fn test_caret_excerpt_with_multi_line_child() {
        let parent = span("int x = (1 ==\n2);", (1, 1), (2, 4));
        let child = span("(1 ==\n2)", (1, 9), (2, 3));
        let rendered = caret_excerpt(
            "Typechecker",
            "variable declaration",
            &parent,
            &child,
            "expected type `int`, but found `bool`",
        );
        let expected = "Typechecker error when evaluating variable declaration \
                        at line 1, column 9:\n\
                        int x = (1 ==\n2);\n        ^^^^^\n        \
                        \u{20}   expected type `int`, but found `bool`\n";
        assert_eq!(expected, rendered);
    }

    #[test]
    fn test_sourced_equality_ignores_span() {
        let a = Sourced::new(7, span("7", (1, 1), (1, 2)));
        let b = Sourced::new(7, span("7", (9, 30), (9, 31)));
        assert_eq!(a, b);
    }
}
