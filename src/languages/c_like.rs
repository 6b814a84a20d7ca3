//! Java-style lexicon.

use super::any_word;
use crate::grammar::{Grammar, GrammarError};
use crate::language::chars::{any, digit, hex_digit, letter, none_of, one_of, word};
use crate::language::Language;
use crate::lexing::{Action, Lexicon, LexiconError};
use crate::token::TokenKind;

pub const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while",
];

/// Punctuation, assignment and comparison operators. Longer forms share prefixes with shorter
/// ones and rely on maximal munch.
pub const OPERATORS: &[&str] = &[
    "(", ")", "[", "]", "{", "}", "@", ":", ".", ",", ";", "?", "=", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", ">>=", "<<=", ">>>=", "+", "-", "*", "/", "%", "++", "--", "<<",
    ">>", ">>>", "&", "|", "^", "~", "!", "&&", "||", "<", ">", "<=", ">=", "==", "!=", "->",
];

fn identifier() -> Language<char> {
    let start = Language::or(letter(), one_of("_$"));
    let rest = Language::choice([letter(), digit(), one_of("_$")]);
    Language::and(start, Language::repeat(rest))
}

fn number() -> Language<char> {
    let digits = Language::one_or_more(digit());
    let fraction = Language::optional(Language::and(Language::char('.'), digits.clone()));
    let decimal = Language::sequence([digits, fraction, Language::optional(one_of("lLfFdD"))]);
    let hex = Language::sequence([
        Language::char('0'),
        one_of("xX"),
        Language::one_or_more(hex_digit()),
    ]);
    let binary = Language::sequence([
        Language::char('0'),
        one_of("bB"),
        Language::one_or_more(one_of("01")),
    ]);
    let octal = Language::and(Language::char('0'), Language::one_or_more(one_of("01234567")));
    Language::choice([hex, binary, octal, decimal])
}

fn quoted(quote: char) -> Language<char> {
    let escape = Language::and(Language::char('\\'), any());
    let plain = none_of(&format!("{}\\\n", quote));
    Language::sequence([
        Language::char(quote),
        Language::repeat(Language::or(plain, escape)),
        Language::char(quote),
    ])
}

fn line_comment() -> Language<char> {
    Language::and(word("//"), Language::repeat(none_of("\n")))
}

fn block_comment() -> Language<char> {
    // "/*" then anything not containing "*/", then "*/"
    let stars = Language::one_or_more(Language::char('*'));
    let body = Language::repeat(Language::or(
        none_of("*"),
        Language::and(stars.clone(), none_of("*/")),
    ));
    Language::sequence([word("/*"), body, stars, Language::char('/')])
}

pub fn lexicon() -> Result<Lexicon, LexiconError> {
    Lexicon::builder()
        .mode("main", |m| {
            m.on(any_word(KEYWORDS), Action::emit(TokenKind::KEYWORD))
                .on(any_word(&["true", "false"]), Action::emit("Boolean"))
                .on(word("null"), Action::emit("Null"))
                .on(any_word(OPERATORS), Action::emit(TokenKind::GENERIC))
                .on(identifier(), Action::emit(TokenKind::IDENTIFIER))
                .on(number(), Action::emit("Number"))
                .on(quoted('"'), Action::emit("String"))
                .on(quoted('\''), Action::emit("Character"))
                .on(line_comment(), Action::skip(TokenKind::COMMENT))
                .on(block_comment(), Action::skip(TokenKind::COMMENT))
                .on(
                    Language::one_or_more(one_of(" \t\u{c}\r")),
                    Action::skip(TokenKind::WHITESPACE),
                )
                .on(Language::char('\n'), Action::skip(TokenKind::NEWLINE))
        })
        .build()
}

/// Compilation-unit headers: package, imports and class shells with annotated fields.
pub const GRAMMAR: &str = r#"
(rule unit (+ (? package) (.* import) (.* class)))

(rule dotted (+ @Identifier (.* "." @Identifier)))

(rule package (=> package "package" dotted ";"))
(rule import (=> import "import" dotted ";"))

(rule class
  (=> class
    (? "public") (? "abstract") "class" @Identifier
    (? "extends" dotted)
    "{" (.* field) "}"))

(rule field
  (=> field
    (? annotation)
    (? (| "public" "protected" "private"))
    (.* (| "static" "final"))
    type @Identifier (? "=" value) ";"))

(rule type (| dotted "int" "long" "short" "byte" "char" "boolean" "float" "double"))

(rule annotation
  (=> annotation "@" @Identifier
    (? "(" @Identifier "=" value (.* "," @Identifier "=" value) ")")))

(rule value (| @Number @String @Boolean @Null @Character))
"#;

pub fn grammar() -> Result<Grammar, GrammarError> {
    Grammar::from_sexp(GRAMMAR)
}
