//! Fixed-point evaluation of nullability, productivity and null-parse forests
//!
//!     All three questions are answered by the same evaluator over the value domain
//!     `Option<Parses>`, where `None` means "no". Productivity asks whether the language
//!     accepts anything at all. Without rule references this is a plain bottom-up fold. Rule
//!     references can close cycles, so a rule's value is defined in terms of itself; the
//!     evaluator then runs Kleene iteration over the whole system:
//!
//!         every rule starts at None (bottom)
//!         one pass re-evaluates the root, reading the previous approximation of any rule
//!         that is re-entered while being evaluated
//!         the system has converged once a full pass changes no approximation
//!
//!     Values computed without reading an approximation are exact and are memoised on their
//!     node or rule slot at once. Values that depended on an approximation are memoised only
//!     after convergence, and only for rule slots.
//!
//!     Nullability and productivity live in a two-point domain and always converge. Forests
//!     can grow without bound (a rule ambiguous over the empty string), so forest evaluation
//!     stops after a fixed number of passes and reports the last approximation.

use super::forest::{product, unit};
use super::node::{concat, Language, Node};
use super::{Parses, Symbol};
use crate::rules::{RuleRef, Slot};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

/// Passes allowed before forest extraction gives up on a cyclic rule.
pub const DEFAULT_MAX_ITERATIONS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixedPointError {
    #[error("rule '{rule}' did not reach a fixed point after {iterations} passes")]
    NonConvergent { rule: String, iterations: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Nullability,
    Productivity,
    Forest,
}

pub(crate) struct Evaluation<S: Symbol> {
    pub(crate) value: Option<Parses<S>>,
    pub(crate) error: Option<FixedPointError>,
}

pub(crate) fn nullable<S: Symbol>(root: &Language<S>) -> bool {
    Evaluator::new(Mode::Nullability)
        .run(root, None)
        .value
        .is_some()
}

pub(crate) fn productive<S: Symbol>(root: &Language<S>) -> bool {
    Evaluator::new(Mode::Productivity)
        .run(root, None)
        .value
        .is_some()
}

pub(crate) fn forest<S: Symbol>(root: &Language<S>, max_iterations: usize) -> Evaluation<S> {
    Evaluator::new(Mode::Forest).run(root, Some(max_iterations.max(1)))
}

/// Null parses of `root` if a single pass settles them without reading an approximation.
///
/// `None` when they depend on a cyclic rule that has not been stabilised yet.
pub(crate) fn settled_forest<S: Symbol>(root: &Language<S>) -> Option<Option<Parses<S>>> {
    let mut evaluator = Evaluator::new(Mode::Forest);
    let value = evaluator.eval(root);
    (!evaluator.tainted && !evaluator.incomplete).then_some(value)
}

type SlotKey<S> = *const Slot<S>;

struct Approximation<S: Symbol> {
    slot: Rc<Slot<S>>,
    value: Option<Parses<S>>,
}

struct Evaluator<S: Symbol> {
    mode: Mode,
    approximations: HashMap<SlotKey<S>, Approximation<S>>,
    visiting: HashSet<SlotKey<S>>,
    done_this_pass: HashSet<SlotKey<S>>,
    /// Set when the value being computed read an approximation
    tainted: bool,
    changed: Option<String>,
    /// Set when an undefined rule body was reached; nothing may be memoised then
    incomplete: bool,
}

impl<S: Symbol> Evaluator<S> {
    fn new(mode: Mode) -> Self {
        Evaluator {
            mode,
            approximations: HashMap::new(),
            visiting: HashSet::new(),
            done_this_pass: HashSet::new(),
            tainted: false,
            changed: None,
            incomplete: false,
        }
    }

    fn run(mut self, root: &Language<S>, max_passes: Option<usize>) -> Evaluation<S> {
        let mut pass = 0;
        loop {
            pass += 1;
            self.tainted = false;
            self.changed = None;
            self.done_this_pass.clear();

            let value = self.eval(root);

            if !self.tainted {
                return Evaluation { value, error: None };
            }

            let Some(rule) = self.changed.take() else {
                tracing::debug!(mode = ?self.mode, passes = pass, "fixed point reached");
                self.commit(root, &value);
                return Evaluation { value, error: None };
            };

            if let Some(max) = max_passes {
                if pass >= max {
                    return Evaluation {
                        value,
                        error: Some(FixedPointError::NonConvergent {
                            rule,
                            iterations: pass,
                        }),
                    };
                }
            }
        }
    }

    fn commit(&self, root: &Language<S>, value: &Option<Parses<S>>) {
        if self.incomplete {
            return;
        }
        for approximation in self.approximations.values() {
            self.memoise_slot(&approximation.slot, &approximation.value);
        }
        self.memoise_node(root, value);
    }

    fn eval(&mut self, language: &Language<S>) -> Option<Parses<S>> {
        if let Some(known) = self.memoised(language) {
            return known;
        }

        let outer = std::mem::replace(&mut self.tainted, false);
        let value = self.eval_node(language);
        if !self.tainted && !self.incomplete {
            self.memoise_node(language, &value);
        }
        self.tainted |= outer;
        value
    }

    fn eval_node(&mut self, language: &Language<S>) -> Option<Parses<S>> {
        match language.node() {
            Node::Reject => None,
            Node::Literal(_) => (self.mode == Mode::Productivity).then(unit),
            Node::Match(parses) => Some(match self.mode {
                Mode::Forest => parses.clone(),
                _ => unit(),
            }),
            Node::Or(left, right) => {
                let left = self.eval(left);
                let right = self.eval(right);
                match (left, right) {
                    (None, None) => None,
                    (Some(parses), None) | (None, Some(parses)) => Some(parses),
                    (Some(left), Some(right)) => Some(match self.mode {
                        Mode::Forest => concat(&left, &right),
                        _ => unit(),
                    }),
                }
            }
            Node::And(left, right) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Some(product(&left, &right))
            }
            Node::Repeat(_) => Some(unit()),
            Node::Optional(inner) => Some(self.eval(inner).unwrap_or_else(unit)),
            Node::Reduce(inner, reducer) => {
                let parses = self.eval(inner)?;
                Some(match self.mode {
                    Mode::Forest => parses
                        .into_iter()
                        .map(|forest| vec![reducer.apply(forest)])
                        .collect(),
                    _ => unit(),
                })
            }
            Node::Null(inner) => match self.mode {
                Mode::Productivity => inner.is_nullable().then(unit),
                _ => self.eval(inner),
            },
            Node::Rule(rule) => self.eval_rule(rule),
        }
    }

    fn eval_rule(&mut self, rule: &RuleRef<S>) -> Option<Parses<S>> {
        let Some(slot) = rule.slot() else {
            tracing::error!(rule = %rule.id(), "rule table dropped while its languages are still in use");
            return None;
        };
        if let Some(known) = self.slot_memo(&slot) {
            return known;
        }

        let key = Rc::as_ptr(&slot);
        if self.visiting.contains(&key) || self.done_this_pass.contains(&key) {
            self.tainted = true;
            return self
                .approximations
                .get(&key)
                .and_then(|approximation| approximation.value.clone());
        }

        let Some(body) = slot.body() else {
            self.incomplete = true;
            self.tainted = true;
            return None;
        };

        self.visiting.insert(key);
        let outer = std::mem::replace(&mut self.tainted, false);
        let value = self.eval(&body);
        let cyclic = self.tainted;
        self.visiting.remove(&key);
        self.tainted |= outer;

        if !cyclic {
            if !self.incomplete {
                self.memoise_slot(&slot, &value);
            }
            return value;
        }

        self.done_this_pass.insert(key);
        let previous = self.approximations.insert(
            key,
            Approximation {
                slot: slot.clone(),
                value: value.clone(),
            },
        );
        let previous_value = previous.and_then(|approximation| approximation.value);
        if previous_value != value && self.changed.is_none() {
            self.changed = Some(slot.label());
        }
        value
    }

    fn memoised(&self, language: &Language<S>) -> Option<Option<Parses<S>>> {
        match self.mode {
            Mode::Nullability => language
                .nullable_memo()
                .map(|nullable| nullable.then(unit)),
            Mode::Productivity => language
                .productive_memo()
                .map(|productive| productive.then(unit)),
            Mode::Forest => {
                if language.nullable_memo() == Some(false) {
                    return Some(None);
                }
                language.forest_memo().cloned()
            }
        }
    }

    fn memoise_node(&self, language: &Language<S>, value: &Option<Parses<S>>) {
        match self.mode {
            Mode::Nullability => language.set_nullable_memo(value.is_some()),
            Mode::Productivity => language.set_productive_memo(value.is_some()),
            Mode::Forest => language.set_forest_memo(value.clone()),
        }
    }

    fn slot_memo(&self, slot: &Slot<S>) -> Option<Option<Parses<S>>> {
        match self.mode {
            Mode::Nullability => slot
                .nullable
                .get()
                .map(|nullable| nullable.then(unit)),
            Mode::Productivity => slot
                .productive
                .get()
                .map(|productive| productive.then(unit)),
            Mode::Forest => {
                if slot.nullable.get() == Some(false) {
                    return Some(None);
                }
                slot.forest.get().cloned()
            }
        }
    }

    fn memoise_slot(&self, slot: &Slot<S>, value: &Option<Parses<S>>) {
        match self.mode {
            Mode::Nullability => slot.nullable.set(Some(value.is_some())),
            Mode::Productivity => slot.productive.set(Some(value.is_some())),
            Mode::Forest => {
                slot.nullable.set(Some(value.is_some()));
                let _ = slot.forest.set(value.clone());
            }
        }
    }
}
