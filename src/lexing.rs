//! Lexer driver
//!
//!     Character-level tokenisation on top of the language algebra. A [Lexicon] holds named
//!     modes, each an ordered list of rules pairing a `Language<char>` with an [Action]. The
//!     [Lexer] feeds characters one at a time to every live rule of the current mode:
//!
//!         extend while at least one rule survives the character
//!         remember the last state in which some rule could end (exact match first,
//!         otherwise the first nullable rule, in declaration order)
//!         at a dead end, fire that rule for the prefix it covered and replay the rest
//!
//!     The replay is what gives maximal munch across token boundaries: with rules for `>>`
//!     and `>>=`, the input `>>=` becomes one token, while `>>x` becomes `>>` followed by
//!     whatever `x` starts.
//!
//! Modes
//!
//!     Actions can push a mode (for example into a string body after an opening quote) and
//!     pop back to the enclosing one. The mode stack never becomes empty.
//!
//! Indentation
//!
//!     The `Indentation` action turns a matched line break plus leading whitespace into
//!     `Indent`, `Dedent` or `NewLine` tokens; see [indentation].

pub mod driver;
pub mod indentation;
pub mod lexicon;
pub mod state;

pub use driver::Lexer;
pub use indentation::Indentation;
pub use lexicon::{Action, LexRule, Lexicon, LexiconBuilder, ModeBuilder, ModeId};
pub use state::LexState;

use thiserror::Error;

/// Failures while running the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("no rule matches {input:?} at offset {offset}")]
    NoRule { offset: usize, input: String },
    #[error("input ends inside {input:?} at offset {offset} and no rule can complete it")]
    Unterminated { offset: usize, input: String },
    #[error("indentation width {width} at offset {offset} matches no enclosing level")]
    Indentation { offset: usize, width: usize },
    #[error("unknown lexer mode '{0}'")]
    UnknownMode(String),
    #[error("mode pop at offset {offset} would leave the lexer without a mode")]
    ModeStackUnderflow { offset: usize },
}

/// Failures while assembling a [Lexicon].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexiconError {
    #[error("lexicon defines no modes")]
    NoModes,
    #[error("mode '{0}' is defined more than once")]
    DuplicateMode(String),
    #[error("mode '{0}' has no rules")]
    EmptyMode(String),
    #[error("mode '{from}' switches to undefined mode '{mode}'")]
    UnknownMode { from: String, mode: String },
    #[error("initial mode '{0}' is not defined")]
    UnknownInitial(String),
}
