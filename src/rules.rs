//! Rule table and resolver for self-referential productions
//!
//!     Named rules live in an arena (`RuleTable`) and are referenced from the language graph
//!     through `RuleRef` handles instead of being expanded eagerly. This keeps a recursive
//!     grammar finite: a rule that mentions itself, directly or through other rules, points
//!     back at its own slot.
//!
//! Construction
//!
//!     `Resolver` builds rule bodies on demand. While a rule's body is being built its name
//!     sits in the in-progress set; a re-entrant request for it returns a `RuleRef`
//!     placeholder instead of recursing. The set only lives for one construction pass.
//!
//! Derivation
//!
//!     Deriving through a rule goes through the slot's own derivative cache, shared by every
//!     `RuleRef` that points at the slot. Before the body is derived an anonymous slot is
//!     reserved for the result and cached, so a left-recursive body asking for the same
//!     derivative gets a reference to the reserved slot and the recursion bottoms out. When
//!     nothing referenced the reserved slot the body's derivative is returned directly and
//!     the slot stays empty.
//!
//! Extraction over cycles is handled by [fixed_point](crate::language::fixed_point), which
//! memoises stabilised results on the slots.
//!
//!     Derived languages hold weak handles to the table. The table must outlive them; the
//!     owner (usually a `Grammar`) keeps it alive while parsing.

use crate::language::{Language, Parses, Symbol};
use once_cell::unsync::OnceCell;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u32);

impl RuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct Slot<S: Symbol> {
    pub(crate) id: RuleId,
    name: Option<String>,
    body: RefCell<Option<Language<S>>>,
    referenced: Cell<bool>,
    pub(crate) derivatives: RefCell<HashMap<S::Key, Language<S>>>,
    pub(crate) nullable: Cell<Option<bool>>,
    pub(crate) productive: Cell<Option<bool>>,
    pub(crate) forest: OnceCell<Option<Parses<S>>>,
}

impl<S: Symbol> Slot<S> {
    fn new(id: RuleId, name: Option<String>) -> Self {
        Slot {
            id,
            name,
            body: RefCell::new(None),
            referenced: Cell::new(false),
            derivatives: RefCell::new(HashMap::new()),
            nullable: Cell::new(None),
            productive: Cell::new(None),
            forest: OnceCell::new(),
        }
    }

    pub(crate) fn body(&self) -> Option<Language<S>> {
        self.body.borrow().clone()
    }

    pub(crate) fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }
}

pub struct RuleTable<S: Symbol> {
    slots: RefCell<Vec<Rc<Slot<S>>>>,
    names: RefCell<HashMap<String, RuleId>>,
}

impl<S: Symbol> RuleTable<S> {
    pub fn new() -> Rc<Self> {
        Rc::new(RuleTable {
            slots: RefCell::new(Vec::new()),
            names: RefCell::new(HashMap::new()),
        })
    }

    /// Id of a named rule, if one was declared.
    pub fn id(&self, name: &str) -> Option<RuleId> {
        self.names.borrow().get(name).copied()
    }

    /// Number of slots, named and derived.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    pub fn name(&self, id: RuleId) -> String {
        self.slot(id)
            .map(|slot| slot.label())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn body(&self, id: RuleId) -> Option<Language<S>> {
        self.slot(id).and_then(|slot| slot.body())
    }

    pub fn is_defined(&self, id: RuleId) -> bool {
        self.slot(id)
            .map(|slot| slot.body.borrow().is_some())
            .unwrap_or(false)
    }

    /// A fresh `RuleRef` node pointing at `id`.
    pub fn reference(self: &Rc<Self>, id: RuleId) -> Language<S> {
        Language::rule(RuleRef {
            table: Rc::downgrade(self),
            id,
        })
    }

    pub(crate) fn intern(&self, name: &str) -> RuleId {
        if let Some(id) = self.id(name) {
            return id;
        }
        let id = self.push(Some(name.to_string()));
        self.names.borrow_mut().insert(name.to_string(), id);
        id
    }

    fn reserve(&self) -> RuleId {
        self.push(None)
    }

    fn push(&self, name: Option<String>) -> RuleId {
        let mut slots = self.slots.borrow_mut();
        let id = RuleId(slots.len() as u32);
        slots.push(Rc::new(Slot::new(id, name)));
        id
    }

    pub(crate) fn slot(&self, id: RuleId) -> Option<Rc<Slot<S>>> {
        self.slots.borrow().get(id.index()).cloned()
    }

    pub(crate) fn define(&self, id: RuleId, body: Language<S>) {
        if let Some(slot) = self.slot(id) {
            *slot.body.borrow_mut() = Some(body);
        }
    }
}

/// Handle from the language graph into a rule table.
#[derive(Clone)]
pub struct RuleRef<S: Symbol> {
    table: Weak<RuleTable<S>>,
    id: RuleId,
}

impl<S: Symbol> RuleRef<S> {
    pub fn id(&self) -> RuleId {
        self.id
    }

    pub(crate) fn slot(&self) -> Option<Rc<Slot<S>>> {
        self.table.upgrade()?.slot(self.id)
    }

    pub fn name(&self) -> String {
        match self.slot() {
            Some(slot) => slot.label(),
            None => self.id.to_string(),
        }
    }

    pub fn body(&self) -> Option<Language<S>> {
        self.slot()?.body()
    }

    pub(crate) fn derive(&self, symbol: &S) -> Language<S> {
        let Some(table) = self.table.upgrade() else {
            tracing::error!(rule = %self.id, "rule table dropped while its languages are still in use");
            return Language::reject();
        };
        let Some(slot) = table.slot(self.id) else {
            return Language::reject();
        };

        let key = symbol.key();
        let cached = slot.derivatives.borrow().get(&key).cloned();
        if let Some(derived) = cached {
            if let Some(pending) = derived.as_rule().and_then(|rule| rule.slot()) {
                if pending.body.borrow().is_none() {
                    pending.referenced.set(true);
                }
            }
            return derived;
        }

        let Some(body) = slot.body() else {
            tracing::debug!(rule = %slot.label(), "derivative requested before the rule body was defined");
            return Language::reject();
        };

        let reserved = table.reserve();
        let placeholder = table.reference(reserved);
        slot.derivatives
            .borrow_mut()
            .insert(key.clone(), placeholder.clone());

        let derived = body.derive(symbol);

        let referenced = table
            .slot(reserved)
            .map(|reserved| reserved.referenced.get())
            .unwrap_or(false);

        if referenced {
            table.define(reserved, derived.clone());
            if !derived.is_terminal() {
                tracing::trace!(rule = %slot.label(), derived = %reserved, "recursive derivative");
                return placeholder;
            }
        }

        slot.derivatives.borrow_mut().insert(key, derived.clone());
        derived
    }
}

impl<S: Symbol> fmt::Debug for RuleRef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({})", self.name())
    }
}

/// Builds rule bodies on demand, breaking construction cycles with placeholders.
pub struct Resolver<S: Symbol> {
    table: Rc<RuleTable<S>>,
    in_progress: HashSet<String>,
}

impl<S: Symbol> Resolver<S> {
    pub fn new() -> Self {
        Resolver {
            table: RuleTable::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn table(&self) -> &Rc<RuleTable<S>> {
        &self.table
    }

    pub fn is_in_progress(&self, name: &str) -> bool {
        self.in_progress.contains(name)
    }

    /// Returns a reference to rule `name`, building its body with `build` the first time.
    ///
    /// A request for a rule whose body is currently being built returns a `RuleRef`
    /// placeholder without calling `build`.
    pub fn resolve<E>(
        &mut self,
        name: &str,
        build: impl FnOnce(&mut Self) -> Result<Language<S>, E>,
    ) -> Result<Language<S>, E> {
        let id = self.table.intern(name);
        if self.in_progress.contains(name) || self.table.is_defined(id) {
            return Ok(self.table.reference(id));
        }

        self.in_progress.insert(name.to_string());
        let body = build(self);
        self.in_progress.remove(name);

        self.table.define(id, body?);
        Ok(self.table.reference(id))
    }

    /// Ends the construction pass and hands over the table.
    pub fn finish(self) -> Rc<RuleTable<S>> {
        debug_assert!(self.in_progress.is_empty());
        self.table
    }
}

impl<S: Symbol> Default for Resolver<S> {
    fn default() -> Self {
        Self::new()
    }
}
