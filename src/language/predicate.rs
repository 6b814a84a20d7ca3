//! Symbol tests used by `Literal` nodes.

use super::Symbol;
use crate::token::{Token, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::rc::Rc;

static LETTER: Lazy<Regex> = Lazy::new(|| anchored("[a-zA-Z]"));
static DIGIT: Lazy<Regex> = Lazy::new(|| anchored("[0-9]"));
static HEX: Lazy<Regex> = Lazy::new(|| anchored("[0-9a-fA-F]"));

fn anchored(pattern: &str) -> Regex {
    compile(pattern).unwrap_or_else(|err| panic!("builtin pattern {pattern:?}: {err}"))
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

#[derive(Clone)]
pub struct Predicate<S: Symbol> {
    label: Rc<str>,
    test: Rc<dyn Fn(&S) -> bool>,
}

impl<S: Symbol> Predicate<S> {
    pub fn new(label: impl Into<Rc<str>>, test: impl Fn(&S) -> bool + 'static) -> Self {
        Predicate {
            label: label.into(),
            test: Rc::new(test),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn test(&self, symbol: &S) -> bool {
        (self.test)(symbol)
    }
}

impl<S: Symbol> fmt::Debug for Predicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Predicate<char> {
    pub fn char(expected: char) -> Self {
        Predicate::new(format!("C({})", expected.escape_debug()), move |c| {
            *c == expected
        })
    }

    /// Matches any single character accepted by a regex character class such as `[a-z]`.
    pub fn class(pattern: &str) -> Result<Self, regex::Error> {
        let regex = compile(pattern)?;
        Ok(Self::regex(format!("RE({})", pattern), regex))
    }

    pub fn any() -> Self {
        Predicate::new("Any", |_| true)
    }

    pub fn except(excluded: char) -> Self {
        Predicate::new(format!("Not({})", excluded.escape_debug()), move |c| {
            *c != excluded
        })
    }

    pub fn letter() -> Self {
        Self::builtin("LETTER", &LETTER)
    }

    pub fn digit() -> Self {
        Self::builtin("DIGIT", &DIGIT)
    }

    pub fn hex_digit() -> Self {
        Self::builtin("HEX", &HEX)
    }

    fn builtin(label: &'static str, regex: &'static Lazy<Regex>) -> Self {
        Predicate::new(label, move |c: &char| {
            let mut buf = [0u8; 4];
            regex.is_match(c.encode_utf8(&mut buf))
        })
    }

    fn regex(label: String, regex: Regex) -> Self {
        Predicate::new(label, move |c: &char| {
            let mut buf = [0u8; 4];
            regex.is_match(c.encode_utf8(&mut buf))
        })
    }
}

impl Predicate<Token> {
    /// Token class test. The generic `Token` kind accepts tokens of every kind.
    pub fn kind(kind: impl Into<TokenKind>) -> Self {
        let kind = kind.into();
        Predicate::new(format!("@{}", kind), move |token: &Token| {
            kind.is_generic() || token.kind == kind
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Predicate::new(format!("{:?}", text), move |token: &Token| token.text == text)
    }

    /// Matches tokens whose whole text is accepted by `pattern`.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let regex = compile(pattern)?;
        Ok(Predicate::new(format!("/{}/", pattern), move |token: &Token| {
            regex.is_match(&token.text)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_class_matches_single_chars() {
        let lower = Predicate::class("[a-z]").unwrap();
        assert!(lower.test(&'q'));
        assert!(!lower.test(&'Q'));
        assert_eq!(lower.label(), "RE([a-z])");
    }

    #[test]
    fn test_negated_class() {
        let not_newline = Predicate::class("[^\\n]").unwrap();
        assert!(not_newline.test(&'x'));
        assert!(!not_newline.test(&'\n'));
    }

    #[test]
    fn test_invalid_class() {
        assert!(Predicate::class("[a-").is_err());
    }

    #[test]
    fn test_builtins() {
        assert!(Predicate::letter().test(&'Z'));
        assert!(!Predicate::letter().test(&'_'));
        assert!(Predicate::digit().test(&'7'));
        assert!(Predicate::hex_digit().test(&'f'));
        assert!(!Predicate::hex_digit().test(&'g'));
    }

    #[test]
    fn test_generic_kind_accepts_everything() {
        let token = Token::new("Number", "1", 0);
        assert!(Predicate::kind(TokenKind::GENERIC).test(&token));
        assert!(Predicate::kind("Number").test(&token));
        assert!(!Predicate::kind(TokenKind::IDENTIFIER).test(&token));
    }

    #[test]
    fn test_token_text_and_pattern() {
        let token = Token::new(TokenKind::KEYWORD, "def", 4);
        assert!(Predicate::text("def").test(&token));
        assert!(!Predicate::text("de").test(&token));
        assert!(Predicate::pattern("d[a-z]+").unwrap().test(&token));
        assert!(!Predicate::pattern("d").unwrap().test(&token));
    }
}
