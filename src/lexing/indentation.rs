//! Indentation tracking for whitespace-significant lexicons
//!
//! The `Indentation` action receives the text of a line break together with the leading
//! whitespace of the following line (blank lines folded in). The width of the last line is
//! compared against a stack of open indentation levels, starting at `[0]`:
//!
//! - wider than the top: push it, emit one `Indent`
//! - narrower, and present further down the stack: pop down to it, one `Dedent` per level
//! - equal to the top: emit `NewLine`
//! - anything else is an error: the line dedents to a level that was never opened
//!
//! Synthesised tokens carry the matched text and its offset. Open levels are not closed at end
//! of input.

use super::LexError;
use crate::token::{Token, TokenKind, TokenSink};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indentation {
    widths: Vec<usize>,
}

impl Default for Indentation {
    fn default() -> Self {
        Indentation { widths: vec![0] }
    }
}

impl Indentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open levels above the baseline.
    pub fn depth(&self) -> usize {
        self.widths.len() - 1
    }

    pub fn current(&self) -> usize {
        self.widths.last().copied().unwrap_or(0)
    }

    /// Width of the whitespace after the last line break of `text`.
    pub fn measure(text: &str, tab_width: usize) -> usize {
        let line = match text.rfind('\n') {
            Some(index) => &text[index + 1..],
            None => text,
        };
        line.chars()
            .map(|c| match c {
                '\t' => tab_width,
                '\r' => 0,
                _ => 1,
            })
            .sum()
    }

    pub fn handle<K: TokenSink + ?Sized>(
        &mut self,
        text: &str,
        offset: usize,
        tab_width: usize,
        sink: &mut K,
    ) -> Result<(), LexError> {
        let width = Self::measure(text, tab_width);
        match width.cmp(&self.current()) {
            Ordering::Greater => {
                self.widths.push(width);
                sink.push(Token::new(TokenKind::INDENT, text, offset));
            }
            Ordering::Equal => {
                sink.push(Token::new(TokenKind::NEWLINE, text, offset));
            }
            Ordering::Less => {
                if !self.widths.contains(&width) {
                    return Err(LexError::Indentation { offset, width });
                }
                while self.current() > width {
                    self.widths.pop();
                    sink.push(Token::new(TokenKind::DEDENT, text, offset));
                }
            }
        }
        tracing::trace!(width, depth = self.depth(), "indentation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("\n", 0)]
    #[case("\n    ", 4)]
    #[case("\n\t", 8)]
    #[case("\n  \t", 10)]
    #[case("\r\n  ", 2)]
    #[case("\n        \n  ", 2)]
    fn test_measure(#[case] text: &str, #[case] width: usize) {
        assert_eq!(Indentation::measure(text, 8), width);
    }

    #[test]
    fn test_indent_newline_dedent() {
        let mut indentation = Indentation::new();
        let mut tokens: Vec<Token> = Vec::new();
        indentation.handle("\n    ", 1, 8, &mut tokens).unwrap();
        indentation.handle("\n    ", 7, 8, &mut tokens).unwrap();
        indentation.handle("\n", 13, 8, &mut tokens).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Indent", "NewLine", "Dedent"]);
        assert_eq!(indentation.depth(), 0);
    }

    #[test]
    fn test_dedent_several_levels() {
        let mut indentation = Indentation::new();
        let mut tokens: Vec<Token> = Vec::new();
        for text in ["\n  ", "\n    ", "\n      ", "\n  "] {
            indentation.handle(text, 0, 8, &mut tokens).unwrap();
        }
        let dedents = tokens.iter().filter(|t| t.is(TokenKind::DEDENT)).count();
        assert_eq!(dedents, 2);
        assert_eq!(indentation.current(), 2);
    }

    #[test]
    fn test_inconsistent_dedent() {
        let mut indentation = Indentation::new();
        let mut tokens: Vec<Token> = Vec::new();
        indentation.handle("\n    ", 0, 8, &mut tokens).unwrap();
        assert_eq!(
            indentation.handle("\n  ", 9, 8, &mut tokens),
            Err(LexError::Indentation {
                offset: 9,
                width: 2
            })
        );
    }
}
