//! Streaming maximal-munch driver.

use super::indentation::Indentation;
use super::lexicon::{Action, Lexicon, ModeId};
use super::state::LexState;
use super::LexError;
use crate::config::EngineConfig;
use crate::token::{Token, TokenKind, TokenSink};
use std::collections::VecDeque;

/// Rule to fire and how much of the matched input it covers, in bytes.
#[derive(Debug, Clone, Copy)]
struct Accepting {
    rule: usize,
    len: usize,
}

pub struct Lexer<'l, K: TokenSink> {
    lexicon: &'l Lexicon,
    tab_width: usize,
    sink: K,
    modes: Vec<ModeId>,
    indentation: Indentation,
    state: LexState,
    last_accepting: Option<Accepting>,
    pending: VecDeque<char>,
}

impl<'l, K: TokenSink> Lexer<'l, K> {
    pub fn new(lexicon: &'l Lexicon, sink: K) -> Self {
        Self::with_config(lexicon, &EngineConfig::default(), sink)
    }

    pub fn with_config(lexicon: &'l Lexicon, config: &EngineConfig, sink: K) -> Self {
        let initial = lexicon.initial();
        Lexer {
            lexicon,
            tab_width: config.tab_width,
            sink,
            modes: vec![initial],
            indentation: Indentation::new(),
            state: LexState::new(lexicon, initial, 0),
            last_accepting: None,
            pending: VecDeque::new(),
        }
    }

    /// Lexes a whole input and returns the sink.
    pub fn lex(mut self, input: &str) -> Result<K, LexError> {
        for c in input.chars() {
            self.feed(c)?;
        }
        self.finish()
    }

    pub fn feed(&mut self, c: char) -> Result<(), LexError> {
        self.pending.push_back(c);
        self.drain()
    }

    /// Dispatches whatever input is still pending and returns the sink.
    pub fn finish(mut self) -> Result<K, LexError> {
        while !self.state.matched_input().is_empty() {
            let Some(accepting) = self.last_accepting.take() else {
                return Err(LexError::Unterminated {
                    offset: self.state.start(),
                    input: self.state.matched_input().to_string(),
                });
            };
            let rest = self.fire(accepting)?;
            self.pending.extend(rest.chars());
            self.drain()?;
        }
        Ok(self.sink)
    }

    pub fn mode(&self) -> ModeId {
        self.current_mode()
    }

    pub fn mode_depth(&self) -> usize {
        self.modes.len()
    }

    fn drain(&mut self) -> Result<(), LexError> {
        while let Some(c) = self.pending.pop_front() {
            self.step(c)?;
        }
        Ok(())
    }

    fn step(&mut self, c: char) -> Result<(), LexError> {
        let next = self.state.next(c);
        if !next.is_reject() {
            self.state = next;
            if let Some(rule) = self.state.dispatchable() {
                self.last_accepting = Some(Accepting {
                    rule,
                    len: self.state.matched_input().len(),
                });
            }
            return Ok(());
        }

        let Some(accepting) = self.last_accepting.take() else {
            let mut input = self.state.matched_input().to_string();
            input.push(c);
            return Err(LexError::NoRule {
                offset: self.state.start(),
                input,
            });
        };

        let rest = self.fire(accepting)?;
        self.pending.push_front(c);
        for replayed in rest.chars().rev() {
            self.pending.push_front(replayed);
        }
        if !rest.is_empty() {
            tracing::debug!(replay = %rest, "backtracking");
        }
        Ok(())
    }

    /// Runs the accepting rule on its prefix of the matched input and resets the state in the
    /// mode that is current afterwards. Returns the unconsumed rest of the matched input.
    fn fire(&mut self, accepting: Accepting) -> Result<String, LexError> {
        let matched = self.state.matched_input();
        let text = matched[..accepting.len].to_string();
        let rest = matched[accepting.len..].to_string();
        let offset = self.state.start();

        let action = self
            .lexicon
            .rules(self.state.mode())
            .get(accepting.rule)
            .map(|rule| rule.action.clone())
            .unwrap_or(Action::Discard);

        match action {
            Action::Emit { kind, skip } => self.emit(kind, skip, &text, offset),
            Action::EmitThenPush { kind, skip, mode } => {
                self.emit(kind, skip, &text, offset);
                self.push(&mode)?;
            }
            Action::EmitThenPop { kind, skip } => {
                self.emit(kind, skip, &text, offset);
                self.pop(offset)?;
            }
            Action::Push(mode) => self.push(&mode)?,
            Action::Pop => self.pop(offset)?,
            Action::Discard => {}
            Action::Indentation => {
                self.indentation
                    .handle(&text, offset, self.tab_width, &mut self.sink)?;
            }
        }

        self.state = LexState::new(self.lexicon, self.current_mode(), offset + text.len());
        self.last_accepting = None;
        Ok(rest)
    }

    fn emit(&mut self, kind: TokenKind, skip: bool, text: &str, offset: usize) {
        let mut token = Token::new(kind, text, offset);
        token.skip = skip;
        tracing::trace!(%token, offset, "emit");
        self.sink.push(token);
    }

    fn push(&mut self, mode: &str) -> Result<(), LexError> {
        let id = self.lexicon.mode_id(mode)?;
        self.modes.push(id);
        Ok(())
    }

    fn pop(&mut self, offset: usize) -> Result<(), LexError> {
        if self.modes.len() <= 1 {
            return Err(LexError::ModeStackUnderflow { offset });
        }
        self.modes.pop();
        Ok(())
    }

    fn current_mode(&self) -> ModeId {
        self.modes
            .last()
            .copied()
            .unwrap_or_else(|| self.lexicon.initial())
    }
}

impl Lexicon {
    /// Lexes `input` into a vector of tokens, skip tokens included.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        Lexer::new(self, Vec::new()).lex(input)
    }

    pub fn tokenize_with(&self, input: &str, config: &EngineConfig) -> Result<Vec<Token>, LexError> {
        Lexer::with_config(self, config, Vec::new()).lex(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::chars::{class, digit, letter, newline, word};
    use crate::language::Language;

    fn operators() -> Lexicon {
        Lexicon::builder()
            .mode("main", |m| {
                m.on(word(">>="), Action::emit("Token"))
                    .on(word(">>"), Action::emit("Token"))
                    .on(word(">"), Action::emit("Token"))
                    .on(word("="), Action::emit("Token"))
                    .on(word(" "), Action::skip("Whitespace"))
            })
            .build()
            .unwrap()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_maximal_munch() {
        let tokens = operators().tokenize(">>=").unwrap();
        assert_eq!(texts(&tokens), vec![">>="]);
    }

    #[test]
    fn test_backtracks_to_last_accepting_state() {
        let tokens = operators().tokenize(">>>= >=").unwrap();
        assert_eq!(texts(&tokens), vec![">>", ">", "=", " ", ">", "="]);
        assert!(tokens[3].skip);
        let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 2, 3, 4, 5, 6]);
    }

    fn assignments() -> Lexicon {
        let ident = Language::and(letter(), Language::repeat(Language::or(letter(), digit())));
        Lexicon::builder()
            .mode("main", |m| {
                m.on(ident, Action::emit(TokenKind::IDENTIFIER))
                    .on(class("[=;]").unwrap(), Action::emit(TokenKind::GENERIC))
                    .on(newline(), Action::Discard)
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_assignment_tokens() {
        let tokens = assignments().tokenize("foo=bar;\nx1=y;").unwrap();
        let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                r#"Identifier("foo")"#,
                r#"Token("=")"#,
                r#"Identifier("bar")"#,
                r#"Token(";")"#,
                r#"Identifier("x1")"#,
                r#"Token("=")"#,
                r#"Identifier("y")"#,
                r#"Token(";")"#,
            ]
        );
        assert_eq!(tokens[4].offset, 9);
    }

    #[test]
    fn test_no_rule() {
        let err = assignments().tokenize("foo?").unwrap_err();
        assert_eq!(
            err,
            LexError::NoRule {
                offset: 3,
                input: "?".into()
            }
        );
    }

    #[test]
    fn test_unterminated_at_end_of_input() {
        let lexicon = Lexicon::builder()
            .mode("main", |m| m.on(word("abc"), Action::emit("Abc")))
            .build()
            .unwrap();
        assert_eq!(
            lexicon.tokenize("abcab").unwrap_err(),
            LexError::Unterminated {
                offset: 3,
                input: "ab".into()
            }
        );
    }

    #[test]
    fn test_feed_is_incremental() {
        let lexicon = assignments();
        let mut lexer = Lexer::new(&lexicon, Vec::new());
        for c in "ab=c".chars() {
            lexer.feed(c).unwrap();
        }
        let tokens = lexer.finish().unwrap();
        assert_eq!(texts(&tokens), vec!["ab", "=", "c"]);
    }

    #[test]
    fn test_pop_underflow() {
        let lexicon = Lexicon::builder()
            .mode("main", |m| m.on(word(")"), Action::emit_then_pop("Close")))
            .build()
            .unwrap();
        assert_eq!(
            lexicon.tokenize(")").unwrap_err(),
            LexError::ModeStackUnderflow { offset: 0 }
        );
    }
}
