//! # deriv
//!
//! Lexing and parsing with derivatives of languages.
//!
//! A [Language] is a small graph of combinators over symbols. Deriving it by a symbol gives the
//! language of everything that may follow that symbol; a derivative that can accept the empty
//! input carries the parse forest built so far. The same machinery runs at two levels:
//!
//! - characters: a [Lexicon] of rules per mode drives a maximal-munch [Lexer] with
//!   backtracking, a mode stack and indentation tokens
//! - tokens: a [Grammar] of named, possibly left-recursive rules drives a [Parser]
//!
//! Recursive rules live in a [RuleTable]; nullability and forests of cyclic rules are
//! computed as fixed points (see [language::fixed_point]).
//!
//! ## Quick start
//!
//! ```ignore
//! use deriv::languages::{arith, c_like};
//! use deriv::Parser;
//!
//! let tokens = c_like::lexicon()?.tokenize("1 + 2 * 3")?;
//! let grammar = arith::grammar()?;
//! let outcome = Parser::new(&grammar).parse(&tokens)?;
//! println!("{}", deriv::language::render(&outcome.forest));
//! ```

pub mod config;
pub mod grammar;
pub mod language;
pub mod languages;
pub mod lexing;
pub mod parsing;
pub mod rules;
pub mod token;

pub use config::{ConfigError, EngineConfig};
pub use grammar::{Grammar, GrammarBuilder, GrammarError};
pub use language::{Ast, Forest, Language, Parses, Reducer, Symbol};
pub use lexing::{Action, LexError, Lexer, Lexicon, LexiconError};
pub use parsing::{ParseError, ParseOutcome, ParseSession, Parser, Rejection};
pub use rules::{Resolver, RuleId, RuleTable};
pub use token::{Token, TokenKind};
