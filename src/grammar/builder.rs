//! Compiles rule definitions into a [Grammar].

use super::{Expr, Grammar, GrammarError};
use crate::language::{Language, Predicate};
use crate::rules::Resolver;
use crate::token::Token;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: Vec<(String, Expr)>,
    start: Option<String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, name: &str, expr: Expr) -> Self {
        self.rules.push((name.to_string(), expr));
        self
    }

    /// Selects the start rule. Defaults to the first rule defined.
    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(name.to_string());
        self
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let Some((first, _)) = self.rules.first() else {
            return Err(GrammarError::Empty);
        };
        let start = self.start.clone().unwrap_or_else(|| first.clone());

        let mut definitions: HashMap<&str, &Expr> = HashMap::new();
        for (name, expr) in &self.rules {
            if definitions.insert(name.as_str(), expr).is_some() {
                return Err(GrammarError::DuplicateRule(name.clone()));
            }
        }
        if !definitions.contains_key(start.as_str()) {
            return Err(GrammarError::UnknownStart(start));
        }
        for (name, expr) in &self.rules {
            if let Some(missing) = expr
                .rule_refs()
                .into_iter()
                .find(|referenced| !definitions.contains_key(referenced))
            {
                return Err(GrammarError::UndefinedRule {
                    rule: name.clone(),
                    name: missing.to_string(),
                });
            }
        }

        let mut resolver = Resolver::new();
        for (name, expr) in &self.rules {
            resolver.resolve(name, |res| compile(res, &definitions, name, expr))?;
        }
        let table = resolver.finish();

        let id = table
            .id(&start)
            .ok_or_else(|| GrammarError::UnknownStart(start.clone()))?;

        let unused = unreachable_rules(&self.rules, &start);
        if !unused.is_empty() {
            tracing::debug!(?unused, "rules not reachable from the start rule");
        }

        Ok(Grammar::new(table, id, start))
    }
}

fn compile(
    resolver: &mut Resolver<Token>,
    definitions: &HashMap<&str, &Expr>,
    rule: &str,
    expr: &Expr,
) -> Result<Language<Token>, GrammarError> {
    let language = match expr {
        Expr::Seq(items) => Language::sequence(
            items
                .iter()
                .map(|item| compile(resolver, definitions, rule, item))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Expr::Alt(items) => Language::choice(
            items
                .iter()
                .map(|item| compile(resolver, definitions, rule, item))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Expr::Opt(inner) => Language::optional(compile(resolver, definitions, rule, inner)?),
        Expr::ZeroOrMore(inner) => Language::repeat(compile(resolver, definitions, rule, inner)?),
        Expr::OneOrMore(inner) => {
            Language::one_or_more(compile(resolver, definitions, rule, inner)?)
        }
        Expr::Reduce(reducer, inner) => Language::reduce(
            compile(resolver, definitions, rule, inner)?,
            reducer.clone(),
        ),
        Expr::Text(text) => Language::literal(Predicate::text(text.as_str())),
        Expr::Kind(kind) => Language::literal(Predicate::kind(kind.clone())),
        Expr::Pattern(pattern) => Language::literal(Predicate::pattern(pattern).map_err(
            |err| GrammarError::Pattern {
                rule: rule.to_string(),
                pattern: pattern.clone(),
                message: err.to_string(),
            },
        )?),
        Expr::Rule(name) => {
            let body = definitions
                .get(name.as_str())
                .copied()
                .ok_or_else(|| GrammarError::UndefinedRule {
                    rule: rule.to_string(),
                    name: name.clone(),
                })?;
            resolver.resolve(name, |res| compile(res, definitions, name, body))?
        }
    };
    Ok(language)
}

fn unreachable_rules(rules: &[(String, Expr)], start: &str) -> Vec<String> {
    let by_name: HashMap<&str, &Expr> = rules
        .iter()
        .map(|(name, expr)| (name.as_str(), expr))
        .collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut pending = vec![start];
    while let Some(name) = pending.pop() {
        if !seen.insert(name) {
            continue;
        }
        if let Some(expr) = by_name.get(name) {
            pending.extend(expr.rule_refs());
        }
    }
    rules
        .iter()
        .filter(|(name, _)| !seen.contains(name.as_str()))
        .map(|(name, _)| name.clone())
        .collect()
}
