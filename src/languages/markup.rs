//! HTML-like lexicon. Tags and quoted attribute values each get their own lexer mode, so the
//! same character means different things inside and outside a tag.

use crate::language::chars::{digit, letter, none_of, one_of, word};
use crate::language::Language;
use crate::lexing::{Action, Lexicon, LexiconError, ModeBuilder};
use crate::token::TokenKind;

fn name() -> Language<char> {
    Language::one_or_more(Language::choice([letter(), digit(), one_of("-_:.")]))
}

/// Attribute value body, closed by `quote`.
fn quoted_value(quote: char) -> impl FnOnce(ModeBuilder) -> ModeBuilder {
    move |m| {
        m.on(
            Language::one_or_more(none_of(&quote.to_string())),
            Action::emit("Value"),
        )
        .on(Language::char(quote), Action::emit_then_pop("Quote"))
    }
}

pub fn lexicon() -> Result<Lexicon, LexiconError> {
    Lexicon::builder()
        .mode("main", |m| {
            m.on(word("<!--"), Action::push("comment"))
                .on(
                    Language::or(word("<"), word("</")),
                    Action::emit_then_push("TagOpen", "tag"),
                )
                .on(Language::one_or_more(none_of("<")), Action::emit("Text"))
        })
        .mode("tag", |m| {
            m.on(
                Language::or(word(">"), word("/>")),
                Action::emit_then_pop("TagClose"),
            )
            .on(name(), Action::emit("Name"))
            .on(Language::char('='), Action::emit(TokenKind::GENERIC))
            .on(Language::char('"'), Action::emit_then_push("Quote", "dq_string"))
            .on(Language::char('\''), Action::emit_then_push("Quote", "sq_string"))
            .on(
                Language::one_or_more(one_of(" \t\r\n")),
                Action::skip(TokenKind::WHITESPACE),
            )
        })
        .mode("dq_string", quoted_value('"'))
        .mode("sq_string", quoted_value('\''))
        .mode("comment", |m| {
            m.on(word("-->"), Action::Pop)
                .on(none_of("-"), Action::Discard)
                .on(Language::char('-'), Action::Discard)
        })
        .build()
}
