//! Sample language definitions
//!
//! Small lexicons and grammars built on the engine, used by the command line tool and the
//! integration tests:
//!
//! - [c_like]: Java-style tokens, plus a grammar for package, import and class headers
//! - [python]: whitespace-significant tokens with `Indent` / `Dedent`
//! - [markup]: HTML-like tokens using lexer modes for tags and quoted attribute values
//! - [arith]: left-recursive arithmetic expressions over the c-like tokens

pub mod arith;
pub mod c_like;
pub mod markup;
pub mod python;

use crate::language::chars::word;
use crate::language::Language;

/// Alternation of the exact words in `words`.
pub(crate) fn any_word(words: &[&str]) -> Language<char> {
    Language::choice(words.iter().map(|w| word(w)))
}

/// Lexicons available by name.
pub const LEXICONS: &[&str] = &["c", "python", "markup"];

pub fn lexicon(name: &str) -> Option<Result<crate::lexing::Lexicon, crate::lexing::LexiconError>> {
    match name {
        "c" | "c_like" | "java" => Some(c_like::lexicon()),
        "python" | "py" => Some(python::lexicon()),
        "markup" | "html" => Some(markup::lexicon()),
        _ => None,
    }
}
