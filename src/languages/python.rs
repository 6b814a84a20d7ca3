//! Whitespace-significant lexicon in the style of Python.

use super::any_word;
use crate::language::chars::{any, digit, letter, newline, none_of, one_of, word};
use crate::language::Language;
use crate::lexing::{Action, Lexicon, LexiconError};
use crate::token::TokenKind;

pub const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "not", "or",
    "pass", "raise", "return", "try", "while", "with", "yield", "None", "True", "False",
];

pub const OPERATORS: &[&str] = &[
    "+", "-", "*", "**", "/", "//", "%", "<<", ">>", "&", "|", "^", "~", "<", ">", "<=", ">=",
    "==", "!=", "=", "+=", "-=", "*=", "/=", "//=", "%=", "**=", "->", "(", ")", "[", "]", "{",
    "}", ",", ":", ".", ";", "@",
];

fn identifier() -> Language<char> {
    let start = Language::or(letter(), Language::char('_'));
    let rest = Language::choice([letter(), digit(), Language::char('_')]);
    Language::and(start, Language::repeat(rest))
}

fn short_string(quote: char) -> Language<char> {
    let escape = Language::and(Language::char('\\'), any());
    let plain = none_of(&format!("{}\\\n", quote));
    Language::sequence([
        Language::char(quote),
        Language::repeat(Language::or(plain, escape)),
        Language::char(quote),
    ])
}

/// One or more line breaks, each followed by the next line's leading blanks. Blank lines fold
/// into the token so only the last line's width counts.
fn line_break() -> Language<char> {
    Language::one_or_more(Language::and(
        newline(),
        Language::repeat(one_of(" \t\u{c}")),
    ))
}

pub fn lexicon() -> Result<Lexicon, LexiconError> {
    Lexicon::builder()
        .mode("main", |m| {
            m.on(any_word(KEYWORDS), Action::emit(TokenKind::KEYWORD))
                .on(identifier(), Action::emit(TokenKind::IDENTIFIER))
                .on(Language::one_or_more(digit()), Action::emit("Integer"))
                .on(
                    Language::or(short_string('\''), short_string('"')),
                    Action::emit("String"),
                )
                .on(any_word(OPERATORS), Action::emit(TokenKind::GENERIC))
                .on(line_break(), Action::Indentation)
                .on(word("\\\n"), Action::skip("LineContinuation"))
                .on(
                    Language::one_or_more(one_of(" \t\u{c}")),
                    Action::skip(TokenKind::WHITESPACE),
                )
                .on(
                    Language::and(Language::char('#'), Language::repeat(none_of("\n"))),
                    Action::skip(TokenKind::COMMENT),
                )
        })
        .build()
}
