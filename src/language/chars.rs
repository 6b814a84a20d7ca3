//! Character-level building blocks for lexicons.

use super::{Language, Predicate};

/// Exact sequence of the characters of `text`.
pub fn word(text: &str) -> Language<char> {
    Language::sequence(text.chars().map(Language::char))
}

/// Single character accepted by a regex character class, e.g. `[a-z_]`.
pub fn class(pattern: &str) -> Result<Language<char>, regex::Error> {
    Ok(Language::literal(Predicate::class(pattern)?))
}

pub fn one_or_more(inner: Language<char>) -> Language<char> {
    Language::one_or_more(inner)
}

pub fn letter() -> Language<char> {
    Language::literal(Predicate::letter())
}

pub fn digit() -> Language<char> {
    Language::literal(Predicate::digit())
}

pub fn hex_digit() -> Language<char> {
    Language::literal(Predicate::hex_digit())
}

pub fn any() -> Language<char> {
    Language::literal(Predicate::any())
}

pub fn except(excluded: char) -> Language<char> {
    Language::literal(Predicate::except(excluded))
}

/// Any one of the characters in `set`.
pub fn one_of(set: &str) -> Language<char> {
    let owned: Vec<char> = set.chars().collect();
    Language::literal(Predicate::new(format!("[{}]", set.escape_debug()), move |c: &char| {
        owned.contains(c)
    }))
}

/// Any character not in `set`.
pub fn none_of(set: &str) -> Language<char> {
    let owned: Vec<char> = set.chars().collect();
    Language::literal(Predicate::new(format!("[^{}]", set.escape_debug()), move |c: &char| {
        !owned.contains(c)
    }))
}

/// `\n`, optionally preceded by `\r`.
pub fn newline() -> Language<char> {
    Language::and(Language::optional(Language::char('\r')), Language::char('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts(language: &Language<char>, input: &str) -> bool {
        input
            .chars()
            .fold(language.clone(), |current, c| current.derive(&c))
            .is_nullable()
    }

    #[test]
    fn test_word() {
        let keyword = word("while");
        assert!(accepts(&keyword, "while"));
        assert!(!accepts(&keyword, "whil"));
        assert!(!accepts(&keyword, "whilee"));
    }

    #[test]
    fn test_newline_variants() {
        assert!(accepts(&newline(), "\n"));
        assert!(accepts(&newline(), "\r\n"));
        assert!(!accepts(&newline(), "\r"));
    }

    #[test]
    fn test_identifier_shape() {
        let ident = Language::and(
            letter(),
            Language::repeat(Language::or(letter(), digit())),
        );
        assert!(accepts(&ident, "x1y2"));
        assert!(!accepts(&ident, "1xy"));
    }

    #[test]
    fn test_hex_run() {
        let hex = Language::and(word("0x"), one_or_more(hex_digit()));
        assert!(accepts(&hex, "0xFF"));
        assert!(!accepts(&hex, "0x"));
        assert!(accepts(&class("[ab]").unwrap(), "b"));
    }

    #[test]
    fn test_character_sets() {
        assert!(accepts(&one_of(" \t"), "\t"));
        assert!(!accepts(&one_of(" \t"), "x"));
        assert!(accepts(&none_of("\"\n"), "x"));
        assert!(!accepts(&none_of("\"\n"), "\n"));
    }
}
