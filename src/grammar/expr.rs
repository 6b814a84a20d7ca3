//! Rule expressions and the helpers used to write them in code.

use crate::language::Reducer;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone)]
pub enum Expr {
    Seq(Vec<Expr>),
    Alt(Vec<Expr>),
    Opt(Box<Expr>),
    ZeroOrMore(Box<Expr>),
    OneOrMore(Box<Expr>),
    Reduce(Reducer<Token>, Box<Expr>),
    Text(String),
    Kind(TokenKind),
    Pattern(String),
    Rule(String),
}

impl Expr {
    /// Names of every rule referenced below this expression, in order of appearance.
    pub fn rule_refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Seq(items) | Expr::Alt(items) => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            Expr::Opt(inner)
            | Expr::ZeroOrMore(inner)
            | Expr::OneOrMore(inner)
            | Expr::Reduce(_, inner) => inner.collect_refs(out),
            Expr::Rule(name) => out.push(name),
            Expr::Text(_) | Expr::Kind(_) | Expr::Pattern(_) => {}
        }
    }
}

/// Collapses a one-element sequence to its element.
pub(crate) fn seq_of(mut items: Vec<Expr>) -> Expr {
    if items.len() == 1 {
        items.remove(0)
    } else {
        Expr::Seq(items)
    }
}

pub fn seq(items: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Seq(items.into_iter().collect())
}

pub fn alt(items: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Alt(items.into_iter().collect())
}

pub fn opt(inner: Expr) -> Expr {
    Expr::Opt(Box::new(inner))
}

pub fn many(inner: Expr) -> Expr {
    Expr::ZeroOrMore(Box::new(inner))
}

pub fn many1(inner: Expr) -> Expr {
    Expr::OneOrMore(Box::new(inner))
}

/// Wraps the forest matched by `inner` in a node labelled `label`.
pub fn node(label: &str, inner: Expr) -> Expr {
    Expr::Reduce(Reducer::node(label), Box::new(inner))
}

pub fn reduce(reducer: Reducer<Token>, inner: Expr) -> Expr {
    Expr::Reduce(reducer, Box::new(inner))
}

pub fn text(text: &str) -> Expr {
    Expr::Text(text.to_string())
}

pub fn kind(kind: &str) -> Expr {
    Expr::Kind(TokenKind::new(kind))
}

pub fn pattern(pattern: &str) -> Expr {
    Expr::Pattern(pattern.to_string())
}

pub fn rule(name: &str) -> Expr {
    Expr::Rule(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_refs_in_order() {
        let expr = seq([
            rule("a"),
            alt([text("+"), rule("b")]),
            many(node("n", rule("a"))),
        ]);
        assert_eq!(expr.rule_refs(), vec!["a", "b", "a"]);
    }
}
