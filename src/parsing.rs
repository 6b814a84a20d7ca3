//! Parser driver
//!
//!     Runs a [Grammar] over a token stream. Skip tokens are dropped, every other token
//!     derives the current language, and at the end of the stream the null parses of the
//!     final language are the result. An ambiguous input yields one parse per
//!     interpretation; the null parses of cyclic rules are only evaluated here, under
//!     [EngineConfig::max_fixed_point_iterations].
//!
//! Rejections
//!
//!     A token is rejected when the language derived by it accepts nothing. Through recursive
//!     rules that language need not have collapsed to `Reject`, so the check is a
//!     productivity test rather than a structural one. The session then records the
//!     rejection, starts over from the grammar's start rule and offers the same token once
//!     more; if the fresh start rejects it as well the token is dropped. Everything matched
//!     before the restart is discarded. The number of restarts is capped by
//!     [EngineConfig::max_restarts].

use crate::config::EngineConfig;
use crate::grammar::Grammar;
use crate::language::{flatten, FixedPointError, Forest, Language, Parses};
use crate::token::Token;
use serde::Serialize;
use thiserror::Error;

/// A token the grammar could not accept where it appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub offset: usize,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input does not match the grammar ({} rejected tokens)", .rejections.len())]
    NoParse {
        rejections: Vec<Rejection>,
        /// The input ended while the grammar still expected more tokens
        incomplete: bool,
    },
    #[error("gave up after {restarts} restarts; last rejected token {} at offset {}", .last.token, .last.offset)]
    TooManyRestarts { restarts: usize, last: Rejection },
    #[error(transparent)]
    FixedPoint(#[from] FixedPointError),
}

#[derive(Debug)]
pub struct ParseOutcome {
    /// Trees of every parse, first parse first
    pub forest: Forest<Token>,
    /// The same trees grouped by parse; more than one group when the input is ambiguous
    pub parses: Parses<Token>,
    /// Tokens that forced a restart, in input order
    pub rejections: Vec<Rejection>,
}

impl ParseOutcome {
    pub fn is_ambiguous(&self) -> bool {
        self.parses.len() > 1
    }
}

pub struct Parser<'g> {
    grammar: &'g Grammar,
    config: EngineConfig,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, EngineConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar, config: EngineConfig) -> Self {
        Parser { grammar, config }
    }

    pub fn session(&self) -> ParseSession<'g> {
        ParseSession {
            grammar: self.grammar,
            config: self.config.clone(),
            current: self.grammar.start(),
            consumed: 0,
            rejections: Vec::new(),
        }
    }

    pub fn parse<'t>(
        &self,
        tokens: impl IntoIterator<Item = &'t Token>,
    ) -> Result<ParseOutcome, ParseError> {
        let mut session = self.session();
        for token in tokens {
            session.push(token)?;
        }
        session.finish()
    }
}

/// Incremental parse, one token at a time.
pub struct ParseSession<'g> {
    grammar: &'g Grammar,
    config: EngineConfig,
    current: Language<Token>,
    /// Tokens accepted since the last restart
    consumed: usize,
    rejections: Vec<Rejection>,
}

impl<'g> ParseSession<'g> {
    pub fn push(&mut self, token: &Token) -> Result<(), ParseError> {
        if token.skip {
            return Ok(());
        }

        let next = self.current.derive(token);
        if next.is_productive() {
            self.current = next;
            self.consumed += 1;
            return Ok(());
        }

        let rejection = Rejection {
            offset: token.offset,
            token: token.clone(),
        };
        if self.rejections.len() >= self.config.max_restarts {
            return Err(ParseError::TooManyRestarts {
                restarts: self.rejections.len(),
                last: rejection,
            });
        }
        tracing::warn!(
            token = %token,
            offset = token.offset,
            discarded = self.consumed,
            "token rejected, restarting at rule '{}'",
            self.grammar.start_name()
        );
        self.rejections.push(rejection);

        let fresh = self.grammar.start();
        let retried = fresh.derive(token);
        if !retried.is_productive() {
            tracing::trace!(token = %token, "dropped after restart");
            self.current = fresh;
            self.consumed = 0;
        } else {
            self.current = retried;
            self.consumed = 1;
        }
        Ok(())
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// Whether the tokens since the last restart form a complete match.
    pub fn is_complete(&self) -> bool {
        self.current.is_nullable()
    }

    pub fn finish(self) -> Result<ParseOutcome, ParseError> {
        let parses = self
            .current
            .try_parses_with(self.config.max_fixed_point_iterations)?;
        let forest = flatten(parses.clone());
        if forest.is_empty() {
            let incomplete = !self.current.is_nullable();
            return Err(ParseError::NoParse {
                rejections: self.rejections,
                incomplete,
            });
        }
        Ok(ParseOutcome {
            forest,
            parses,
            rejections: self.rejections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::expr::{kind, many1, node};

    fn grammar() -> Grammar {
        Grammar::builder()
            .rule("stmt", node("stmt", many1(kind("Identifier"))))
            .build()
            .unwrap()
    }

    fn ident(text: &str, offset: usize) -> Token {
        Token::new("Identifier", text, offset)
    }

    #[test]
    fn test_skip_tokens_are_ignored() {
        let grammar = grammar();
        let tokens = vec![
            ident("a", 0),
            Token::new("Whitespace", " ", 1).skipped(),
            ident("b", 2),
        ];
        let outcome = Parser::new(&grammar).parse(&tokens).unwrap();
        assert_eq!(outcome.forest.len(), 1);
        assert_eq!(outcome.forest[0].children().len(), 2);
        assert!(outcome.rejections.is_empty());
    }

    #[test]
    fn test_restart_after_rejection() {
        let grammar = grammar();
        let tokens = vec![ident("a", 0), Token::new("Token", ";", 1), ident("b", 2)];
        let outcome = Parser::new(&grammar).parse(&tokens).unwrap();
        assert_eq!(outcome.rejections.len(), 1);
        assert_eq!(outcome.rejections[0].offset, 1);
        // only what follows the restart survives
        assert_eq!(outcome.forest[0].to_string(), r#"(stmt Identifier("b"))"#);
    }

    #[test]
    fn test_restart_cap() {
        let grammar = grammar();
        let config = EngineConfig {
            max_restarts: 1,
            ..EngineConfig::default()
        };
        let tokens = vec![
            Token::new("Token", ";", 0),
            Token::new("Token", ";", 1),
            ident("a", 2),
        ];
        let err = Parser::with_config(&grammar, config)
            .parse(&tokens)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::TooManyRestarts { restarts: 1, ref last } if last.offset == 1
        ));
    }

    #[test]
    fn test_empty_input_is_no_parse() {
        let grammar = grammar();
        let err = Parser::new(&grammar).parse(&Vec::new()).unwrap_err();
        assert_eq!(
            err,
            ParseError::NoParse {
                rejections: Vec::new(),
                incomplete: true
            }
        );
    }

    #[test]
    fn test_session_reports_completeness() {
        let grammar = grammar();
        let parser = Parser::new(&grammar);
        let mut session = parser.session();
        assert!(!session.is_complete());
        session.push(&ident("x", 0)).unwrap();
        assert!(session.is_complete());
        assert!(session.rejections().is_empty());
    }
}
