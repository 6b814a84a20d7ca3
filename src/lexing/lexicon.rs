//! Lexicon definition: modes, rules and their actions.

use super::{LexError, LexiconError};
use crate::language::Language;
use crate::token::TokenKind;
use std::collections::HashMap;

/// What happens when a rule fires for the text it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Emit { kind: TokenKind, skip: bool },
    EmitThenPush { kind: TokenKind, skip: bool, mode: String },
    EmitThenPop { kind: TokenKind, skip: bool },
    Push(String),
    Pop,
    /// Consume the text without emitting anything
    Discard,
    /// Measure the indentation after the matched line break
    Indentation,
}

impl Action {
    pub fn emit(kind: impl Into<TokenKind>) -> Self {
        Action::Emit {
            kind: kind.into(),
            skip: false,
        }
    }

    /// Emit a token the parser will not see.
    pub fn skip(kind: impl Into<TokenKind>) -> Self {
        Action::Emit {
            kind: kind.into(),
            skip: true,
        }
    }

    pub fn emit_then_push(kind: impl Into<TokenKind>, mode: &str) -> Self {
        Action::EmitThenPush {
            kind: kind.into(),
            skip: false,
            mode: mode.to_string(),
        }
    }

    pub fn emit_then_pop(kind: impl Into<TokenKind>) -> Self {
        Action::EmitThenPop {
            kind: kind.into(),
            skip: false,
        }
    }

    pub fn push(mode: &str) -> Self {
        Action::Push(mode.to_string())
    }

    fn target(&self) -> Option<&str> {
        match self {
            Action::EmitThenPush { mode, .. } | Action::Push(mode) => Some(mode),
            _ => None,
        }
    }
}

pub struct LexRule {
    pub language: Language<char>,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeId(usize);

impl ModeId {
    pub fn index(self) -> usize {
        self.0
    }
}

pub(crate) struct Mode {
    pub(crate) name: String,
    pub(crate) rules: Vec<LexRule>,
}

pub struct Lexicon {
    modes: Vec<Mode>,
    names: HashMap<String, ModeId>,
    initial: ModeId,
}

impl Lexicon {
    pub fn builder() -> LexiconBuilder {
        LexiconBuilder::default()
    }

    pub fn initial(&self) -> ModeId {
        self.initial
    }

    pub fn mode_id(&self, name: &str) -> Result<ModeId, LexError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| LexError::UnknownMode(name.to_string()))
    }

    pub fn mode_name(&self, id: ModeId) -> &str {
        self.modes
            .get(id.0)
            .map(|mode| mode.name.as_str())
            .unwrap_or("?")
    }

    pub(crate) fn rules(&self, id: ModeId) -> &[LexRule] {
        self.modes
            .get(id.0)
            .map(|mode| mode.rules.as_slice())
            .unwrap_or(&[])
    }
}

/// Rules of one mode, in priority order.
#[derive(Default)]
pub struct ModeBuilder {
    rules: Vec<LexRule>,
}

impl ModeBuilder {
    pub fn on(mut self, language: Language<char>, action: Action) -> Self {
        self.rules.push(LexRule { language, action });
        self
    }
}

#[derive(Default)]
pub struct LexiconBuilder {
    modes: Vec<(String, ModeBuilder)>,
    initial: Option<String>,
}

impl LexiconBuilder {
    pub fn mode(mut self, name: &str, define: impl FnOnce(ModeBuilder) -> ModeBuilder) -> Self {
        self.modes
            .push((name.to_string(), define(ModeBuilder::default())));
        self
    }

    /// Mode the lexer starts in. Defaults to the first mode defined.
    pub fn initial(mut self, name: &str) -> Self {
        self.initial = Some(name.to_string());
        self
    }

    pub fn build(self) -> Result<Lexicon, LexiconError> {
        let Some((first, _)) = self.modes.first() else {
            return Err(LexiconError::NoModes);
        };
        let initial_name = self.initial.clone().unwrap_or_else(|| first.clone());

        let mut names = HashMap::new();
        for (index, (name, mode)) in self.modes.iter().enumerate() {
            if names.insert(name.clone(), ModeId(index)).is_some() {
                return Err(LexiconError::DuplicateMode(name.clone()));
            }
            if mode.rules.is_empty() {
                return Err(LexiconError::EmptyMode(name.clone()));
            }
        }
        for (name, mode) in &self.modes {
            for rule in &mode.rules {
                if let Some(target) = rule.action.target() {
                    if !names.contains_key(target) {
                        return Err(LexiconError::UnknownMode {
                            from: name.clone(),
                            mode: target.to_string(),
                        });
                    }
                }
            }
        }
        let initial = *names
            .get(&initial_name)
            .ok_or(LexiconError::UnknownInitial(initial_name))?;

        Ok(Lexicon {
            modes: self
                .modes
                .into_iter()
                .map(|(name, mode)| Mode {
                    name,
                    rules: mode.rules,
                })
                .collect(),
            names,
            initial,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::chars::word;

    #[test]
    fn test_unknown_push_target() {
        let err = Lexicon::builder()
            .mode("main", |m| m.on(word("\""), Action::push("string")))
            .build()
            .err();
        assert_eq!(
            err,
            Some(LexiconError::UnknownMode {
                from: "main".into(),
                mode: "string".into()
            })
        );
    }

    #[test]
    fn test_duplicate_and_empty_modes() {
        let dup = Lexicon::builder()
            .mode("a", |m| m.on(word("x"), Action::emit("X")))
            .mode("a", |m| m.on(word("y"), Action::emit("Y")))
            .build()
            .err();
        assert_eq!(dup, Some(LexiconError::DuplicateMode("a".into())));

        let empty = Lexicon::builder().mode("a", |m| m).build().err();
        assert_eq!(empty, Some(LexiconError::EmptyMode("a".into())));
        assert_eq!(
            Lexicon::builder().build().err(),
            Some(LexiconError::NoModes)
        );
    }

    #[test]
    fn test_initial_mode() {
        let lexicon = Lexicon::builder()
            .mode("a", |m| m.on(word("x"), Action::emit("X")))
            .mode("b", |m| m.on(word("y"), Action::emit("Y")))
            .initial("b")
            .build()
            .unwrap();
        assert_eq!(lexicon.mode_name(lexicon.initial()), "b");
        assert!(matches!(
            lexicon.mode_id("c"),
            Err(LexError::UnknownMode(name)) if name == "c"
        ));
    }
}
