//! End-to-end lexing through the bundled lexicons

use deriv::languages::{c_like, markup, python};
use deriv::lexing::{Action, LexError, Lexicon};
use deriv::language::chars::{class, digit, letter, newline, word};
use deriv::{EngineConfig, Language, Token, TokenKind};
use rstest::rstest;

fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|t| !t.skip)
        .map(|t| format!("{} {}", t.offset, t))
        .collect::<Vec<_>>()
        .join("\n")
}

fn assignments() -> Lexicon {
    let identifier = Language::and(letter(), Language::repeat(Language::or(letter(), digit())));
    Lexicon::builder()
        .mode("main", |m| {
            m.on(identifier, Action::emit(TokenKind::IDENTIFIER))
                .on(class("[=;]").unwrap(), Action::emit(TokenKind::GENERIC))
                .on(newline(), Action::skip(TokenKind::NEWLINE))
        })
        .build()
        .unwrap()
}

#[test]
fn test_assignment_statements() {
    let tokens = assignments().tokenize("foo=bar;\nx1=y;").unwrap();
    insta::assert_snapshot!(render(&tokens), @r###"
    0 Identifier("foo")
    3 Token("=")
    4 Identifier("bar")
    7 Token(";")
    9 Identifier("x1")
    11 Token("=")
    12 Identifier("y")
    13 Token(";")
    "###);
    assert!(tokens[4].skip && tokens[4].is(TokenKind::NEWLINE));
}

#[rstest]
#[case(">>>=", &[">>>="])]
#[case(">>>", &[">>>"])]
#[case(">>=>", &[">>=", ">"])]
#[case("a>>b", &["a", ">>", "b"])]
#[case("i++ + ++j", &["i", "++", "+", "++", "j"])]
#[case("x->y", &["x", "->", "y"])]
fn test_c_like_maximal_munch(#[case] source: &str, #[case] expected: &[&str]) {
    let tokens = c_like::lexicon().unwrap().tokenize(source).unwrap();
    let texts: Vec<_> = tokens
        .iter()
        .filter(|t| !t.skip)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(texts, expected);
}

#[test]
fn test_backtracking_replays_unconsumed_input() {
    let lexicon = Lexicon::builder()
        .mode("main", |m| {
            m.on(word("abcd"), Action::emit("Long"))
                .on(word("ab"), Action::emit("Short"))
                .on(letter(), Action::emit("Letter"))
        })
        .build()
        .unwrap();
    let tokens = lexicon.tokenize("abcabcd").unwrap();
    insta::assert_snapshot!(render(&tokens), @r###"
    0 Short("ab")
    2 Letter("c")
    3 Long("abcd")
    "###);
}

#[test]
fn test_python_block_tokens() {
    let source = "if x:\n    y = 1\n    z = 2\nw\n";
    let tokens = python::lexicon().unwrap().tokenize(source).unwrap();
    insta::assert_snapshot!(render(&tokens), @r###"
    0 Keyword("if")
    3 Identifier("x")
    4 Token(":")
    5 Indent("\n    ")
    10 Identifier("y")
    12 Token("=")
    14 Integer("1")
    15 NewLine("\n    ")
    20 Identifier("z")
    22 Token("=")
    24 Integer("2")
    25 Dedent("\n")
    26 Identifier("w")
    27 NewLine("\n")
    "###);
}

#[test]
fn test_python_comments_and_continuations() {
    let source = "a = 1 + \\\n  2  # sum\nb";
    let tokens = python::lexicon().unwrap().tokenize(source).unwrap();
    let kinds: Vec<_> = tokens
        .iter()
        .filter(|t| !t.skip)
        .map(|t| t.kind.as_str())
        .collect();
    assert_eq!(
        kinds,
        vec!["Identifier", "Token", "Integer", "Token", "Integer", "NewLine", "Identifier"]
    );
    assert!(tokens.iter().any(|t| t.skip && t.is(TokenKind::COMMENT)));
}

#[test]
fn test_python_dedent_to_unknown_level() {
    let err = python::lexicon()
        .unwrap()
        .tokenize("if a:\n        b\n    c")
        .unwrap_err();
    assert_eq!(err, LexError::Indentation { offset: 15, width: 4 });
}

#[test]
fn test_tab_width_is_configurable() {
    let config = EngineConfig {
        tab_width: 2,
        ..EngineConfig::default()
    };
    let tokens = python::lexicon()
        .unwrap()
        .tokenize_with("a\n  b\n\tc", &config)
        .unwrap();
    let structure: Vec<_> = tokens
        .iter()
        .filter(|t| t.is(TokenKind::INDENT) || t.is(TokenKind::NEWLINE))
        .map(|t| t.kind.as_str())
        .collect();
    assert_eq!(structure, vec!["Indent", "NewLine"]);
}

#[test]
fn test_markup_modes() {
    let tokens = markup::lexicon()
        .unwrap()
        .tokenize(r#"<img src="a.png" alt='x'/> caption"#)
        .unwrap();
    insta::assert_snapshot!(render(&tokens), @r###"
    0 TagOpen("<")
    1 Name("img")
    5 Name("src")
    8 Token("=")
    9 Quote("\"")
    10 Value("a.png")
    15 Quote("\"")
    17 Name("alt")
    20 Token("=")
    21 Quote("'")
    22 Value("x")
    23 Quote("'")
    24 TagClose("/>")
    26 Text(" caption")
    "###);
}

#[rstest]
#[case("\"abc", 0, "\"abc")]
#[case("x = 'ab", 4, "'ab")]
fn test_unterminated_literals(#[case] source: &str, #[case] offset: usize, #[case] input: &str) {
    let err = c_like::lexicon().unwrap().tokenize(source).unwrap_err();
    assert_eq!(
        err,
        LexError::Unterminated {
            offset,
            input: input.to_string()
        }
    );
}

#[test]
fn test_unknown_character() {
    let err = c_like::lexicon().unwrap().tokenize("a # b").unwrap_err();
    assert_eq!(
        err,
        LexError::NoRule {
            offset: 2,
            input: "#".to_string()
        }
    );
}
