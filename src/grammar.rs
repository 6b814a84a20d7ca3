//! Token-level grammars
//!
//!     A grammar is a set of named rules over tokens. Rules are written as [Expr] trees,
//!     either in code through the helpers in [expr] or as s-expressions read by [sexp], and
//!     compiled by [GrammarBuilder] into a [RuleTable]. Rule references in the compiled
//!     languages point back into that table, so recursive and left-recursive rules compile to
//!     a finite graph.
//!
//! Leaves
//!
//!     "text"      token whose text is exactly `text`
//!     @Kind       token of kind `Kind`; `@Token` accepts every token
//!     /regex/     token whose whole text matches the pattern
//!     name        reference to rule `name`

pub mod builder;
pub mod expr;
pub mod sexp;

pub use builder::GrammarBuilder;
pub use expr::Expr;

use crate::language::Language;
use crate::rules::{RuleId, RuleTable};
use crate::token::Token;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar defines no rules")]
    Empty,
    #[error("rule '{0}' is defined more than once")]
    DuplicateRule(String),
    #[error("rule '{rule}' refers to undefined rule '{name}'")]
    UndefinedRule { rule: String, name: String },
    #[error("start rule '{0}' is not defined")]
    UnknownStart(String),
    #[error("invalid pattern /{pattern}/ in rule '{rule}': {message}")]
    Pattern {
        rule: String,
        pattern: String,
        message: String,
    },
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
}

/// A compiled grammar: the rule table plus the start rule.
pub struct Grammar {
    table: Rc<RuleTable<Token>>,
    start: RuleId,
    start_name: String,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// Reads and compiles a grammar written as s-expressions.
    pub fn from_sexp(source: &str) -> Result<Grammar, GrammarError> {
        sexp::parse(source)?.build()
    }

    pub(crate) fn new(table: Rc<RuleTable<Token>>, start: RuleId, start_name: String) -> Self {
        Grammar {
            table,
            start,
            start_name,
        }
    }

    /// Fresh handle to the start rule. Handles share the rule's derivative cache.
    pub fn start(&self) -> Language<Token> {
        self.table.reference(self.start)
    }

    pub fn start_name(&self) -> &str {
        &self.start_name
    }

    pub fn rule(&self, name: &str) -> Option<Language<Token>> {
        self.table.id(name).map(|id| self.table.reference(id))
    }

    pub fn table(&self) -> &Rc<RuleTable<Token>> {
        &self.table
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("start", &self.start_name)
            .field("slots", &self.table.len())
            .finish()
    }
}
