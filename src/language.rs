//! Language algebra
//!
//!     A `Language<S>` is the set of symbol sequences still acceptable from some point of a
//!     run. Deriving it by a symbol gives the residual language after that symbol, and once
//!     the empty sequence is acceptable the language carries the parse forest built so far.
//!     The same algebra runs over characters (lexing) and tokens (parsing).
//!
//! Node kinds
//!
//!     Reject      matches nothing, absorbing
//!     Match       completed match carrying its alternative parses, terminal
//!     Literal     exactly one symbol accepted by a predicate
//!     Or          alternation, the parses of both sides kept when both match
//!     And         sequence
//!     Repeat      zero or more
//!     Optional    zero or one
//!     Reduce      folds each inner parse into one tree
//!     Null        the null parses of a language, evaluated only on extraction
//!     Rule        handle into a [RuleTable](crate::rules::RuleTable)
//!
//!     Nodes are only built through the smart constructors (`Language::or`, `Language::and`,
//!     ...), which collapse `Reject` and completed matches immediately. Each node memoises its
//!     derivatives by symbol key, its nullability and its null parses.
//!
//!     Deriving a sequence whose head is nullable folds the head's null parses in front of
//!     the tail's derivative. When those parses depend on a cyclic rule they are left behind
//!     a `Null` node, so the iteration cap of whoever extracts the result applies to them.
//!
//! Cycles
//!
//!     Rule references can make the graph cyclic. Nullability and forest extraction over
//!     such graphs go through [fixed_point], never through plain recursion.

pub mod chars;
pub mod fixed_point;
pub mod forest;
mod node;
pub mod predicate;

pub use fixed_point::FixedPointError;
pub use forest::{flatten, render, Ast, Forest, Parses, Reducer};
pub use node::{Language, Node};
pub use predicate::Predicate;

use crate::token::{Token, TokenKind};
use std::fmt;
use std::hash::Hash;

/// An input unit the algebra can consume.
///
/// The key identifies the symbol for derivative caching. Two symbols with the same key must
/// be accepted by exactly the same predicates.
pub trait Symbol: Clone + PartialEq + fmt::Debug + 'static {
    type Key: Hash + Eq + Clone;

    fn key(&self) -> Self::Key;
}

impl Symbol for char {
    type Key = char;

    fn key(&self) -> char {
        *self
    }
}

impl Symbol for Token {
    type Key = (TokenKind, String);

    fn key(&self) -> Self::Key {
        (self.kind.clone(), self.text.clone())
    }
}
