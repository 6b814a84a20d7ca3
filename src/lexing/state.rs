use super::lexicon::{Lexicon, ModeId};
use crate::language::Language;

#[derive(Clone)]
struct Candidate {
    language: Language<char>,
    rule: usize,
}

/// Matched text plus every rule of the current mode that still accepts it.
#[derive(Clone)]
pub struct LexState {
    matched_input: String,
    /// Byte offset of `matched_input` in the whole input
    start: usize,
    mode: ModeId,
    rules: Vec<Candidate>,
}

impl LexState {
    pub fn new(lexicon: &Lexicon, mode: ModeId, start: usize) -> Self {
        let rules = lexicon
            .rules(mode)
            .iter()
            .enumerate()
            .map(|(rule, lex_rule)| Candidate {
                language: lex_rule.language.clone(),
                rule,
            })
            .collect();
        LexState {
            matched_input: String::new(),
            start,
            mode,
            rules,
        }
    }

    /// State after `c`; rules that reject `c` are dropped.
    pub fn next(&self, c: char) -> LexState {
        let rules = self
            .rules
            .iter()
            .filter_map(|candidate| {
                let language = candidate.language.derive(&c);
                (!language.is_reject()).then(|| Candidate {
                    language,
                    rule: candidate.rule,
                })
            })
            .collect();
        let mut matched_input = self.matched_input.clone();
        matched_input.push(c);
        LexState {
            matched_input,
            start: self.start,
            mode: self.mode,
            rules,
        }
    }

    pub fn matched_input(&self) -> &str {
        &self.matched_input
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn mode(&self) -> ModeId {
        self.mode
    }

    /// Some rule matched the input exactly and accepts nothing more.
    pub fn has_exact_match(&self) -> bool {
        self.rules
            .iter()
            .any(|candidate| candidate.language.is_match())
    }

    /// Some rule could end here.
    pub fn has_matchables(&self) -> bool {
        self.rules
            .iter()
            .any(|candidate| candidate.language.is_nullable())
    }

    pub fn is_reject(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule to fire for the current input: the first exact match, else the first rule that
    /// could end here.
    pub fn dispatchable(&self) -> Option<usize> {
        self.rules
            .iter()
            .find(|candidate| candidate.language.is_match())
            .or_else(|| {
                self.rules
                    .iter()
                    .find(|candidate| candidate.language.is_nullable())
            })
            .map(|candidate| candidate.rule)
    }
}
