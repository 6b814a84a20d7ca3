//! S-expression grammar files
//!
//! A grammar file is a list of top-level forms:
//!
//!     ; comment to end of line
//!     (rule expr (| (=> add expr "+" term) term))
//!     (rule term (| @Number (+ "(" expr ")")))
//!     (start expr)
//!
//! Tags: `+` sequence, `|` alternation, `?` optional, `.*` zero or more, `.+` one or more,
//! `(=> label ...)` reduces the matched forest into a node named `label`. Tags with several
//! operands treat them as a sequence. Without a `start` form the first rule is the start rule;
//! with several, the last one wins.

use super::builder::GrammarBuilder;
use super::expr::{seq_of, Expr};
use super::GrammarError;
use crate::language::Reducer;
use crate::token::TokenKind;
use chumsky::prelude::*;

#[derive(Debug, Clone)]
enum Form {
    Rule(String, Expr),
    Start(String),
}

type ParserError = Simple<char>;

/// Reads a grammar file into a builder, ready to [build](GrammarBuilder::build).
pub fn parse(source: &str) -> Result<GrammarBuilder, GrammarError> {
    let forms = grammar_file().parse(source).map_err(|errors| {
        let first = errors.into_iter().next();
        GrammarError::Syntax {
            offset: first.as_ref().map(|err| err.span().start).unwrap_or(0),
            message: first
                .map(|err| err.to_string())
                .unwrap_or_else(|| "unreadable grammar".to_string()),
        }
    })?;

    let mut builder = GrammarBuilder::new();
    for form in forms {
        builder = match form {
            Form::Rule(name, expr) => builder.rule(&name, expr),
            Form::Start(name) => builder.start(&name),
        };
    }
    Ok(builder)
}

fn blank() -> impl Parser<char, (), Error = ParserError> + Clone {
    let comment = just(';')
        .then(filter(|c: &char| *c != '\n').repeated())
        .ignored();
    filter(|c: &char| c.is_whitespace())
        .ignored()
        .or(comment)
        .repeated()
        .ignored()
}

fn quoted() -> impl Parser<char, String, Error = ParserError> + Clone {
    let escape = just('\\').ignore_then(any()).map(|c: char| match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    });
    filter(|c: &char| *c != '"' && *c != '\\')
        .or(escape)
        .repeated()
        .delimited_by(just('"'), just('"'))
        .collect::<String>()
}

fn slashed() -> impl Parser<char, String, Error = ParserError> + Clone {
    // `\/` is a literal slash; any other escape is handed to the regex untouched
    let escape = just('\\').ignore_then(any()).map(|c: char| {
        if c == '/' {
            "/".to_string()
        } else {
            format!("\\{}", c)
        }
    });
    filter(|c: &char| *c != '/' && *c != '\\')
        .map(String::from)
        .or(escape)
        .repeated()
        .delimited_by(just('/'), just('/'))
        .map(|parts| parts.concat())
}

fn expression() -> impl Parser<char, Expr, Error = ParserError> + Clone {
    recursive(|expr| {
        let name = text::ident::<char, ParserError>();
        let operands = expr.padded_by(blank()).repeated();

        let tagged = choice((
            just("=>")
                .ignore_then(blank())
                .ignore_then(name)
                .then(operands.clone())
                .map(|(label, items): (String, Vec<Expr>)| {
                    Expr::Reduce(Reducer::node(label), Box::new(seq_of(items)))
                }),
            just(".*")
                .ignore_then(operands.clone())
                .map(|items| Expr::ZeroOrMore(Box::new(seq_of(items)))),
            just(".+")
                .ignore_then(operands.clone())
                .map(|items| Expr::OneOrMore(Box::new(seq_of(items)))),
            just('+').ignore_then(operands.clone()).map(Expr::Seq),
            just('|').ignore_then(operands.clone()).map(Expr::Alt),
            just('?')
                .ignore_then(operands)
                .map(|items| Expr::Opt(Box::new(seq_of(items)))),
        ))
        .padded_by(blank())
        .delimited_by(just('('), just(')'));

        let atom = choice((
            quoted().map(Expr::Text),
            slashed().map(Expr::Pattern),
            just('@')
                .ignore_then(name)
                .map(|kind: String| Expr::Kind(TokenKind::new(kind))),
            name.map(Expr::Rule),
        ));

        tagged.or(atom)
    })
}

fn grammar_file() -> impl Parser<char, Vec<Form>, Error = ParserError> {
    let name = text::ident::<char, ParserError>();

    let rule = text::keyword("rule")
        .ignore_then(blank())
        .ignore_then(name)
        .then(expression().padded_by(blank()).repeated().at_least(1))
        .map(|(name, items)| Form::Rule(name, seq_of(items)));

    let start = text::keyword("start")
        .ignore_then(blank())
        .ignore_then(name)
        .map(Form::Start);

    rule.or(start)
        .padded_by(blank())
        .delimited_by(just('('), just(')'))
        .padded_by(blank())
        .repeated()
        .then_ignore(end())
}
