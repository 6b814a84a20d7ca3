use super::fixed_point::{self, FixedPointError, DEFAULT_MAX_ITERATIONS};
use super::forest::{flatten, product};
use super::{Ast, Forest, Parses, Predicate, Reducer, Symbol};
use crate::rules::RuleRef;
use once_cell::unsync::OnceCell;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub enum Node<S: Symbol> {
    Reject,
    Match(Parses<S>),
    Literal(Predicate<S>),
    Or(Language<S>, Language<S>),
    And(Language<S>, Language<S>),
    Repeat(Language<S>),
    Optional(Language<S>),
    Reduce(Language<S>, Reducer<S>),
    Null(Language<S>),
    Rule(RuleRef<S>),
}

struct Inner<S: Symbol> {
    node: Node<S>,
    derivatives: RefCell<HashMap<S::Key, Language<S>>>,
    nullable: Cell<Option<bool>>,
    productive: Cell<Option<bool>>,
    forest: OnceCell<Option<Parses<S>>>,
}

/// Shared handle to an immutable language node.
///
/// Cloning is cheap. Handles compare by identity through [Language::ptr_eq]; structural
/// comparison is left to the smart constructors, which never build a node around `Reject`.
pub struct Language<S: Symbol>(Rc<Inner<S>>);

impl<S: Symbol> Clone for Language<S> {
    fn clone(&self) -> Self {
        Language(Rc::clone(&self.0))
    }
}

impl<S: Symbol> Language<S> {
    fn new(node: Node<S>) -> Self {
        Language(Rc::new(Inner {
            node,
            derivatives: RefCell::new(HashMap::new()),
            nullable: Cell::new(None),
            productive: Cell::new(None),
            forest: OnceCell::new(),
        }))
    }

    pub fn reject() -> Self {
        Language::new(Node::Reject)
    }

    /// Completed match with a single parse.
    pub fn matched(forest: Forest<S>) -> Self {
        Language::new(Node::Match(vec![forest]))
    }

    /// Completed match with every parse in `parses`; `Reject` when there are none.
    pub fn alternatives(parses: Parses<S>) -> Self {
        if parses.is_empty() {
            return Language::reject();
        }
        Language::new(Node::Match(parses))
    }

    /// Completed match with an empty forest.
    pub fn empty() -> Self {
        Language::matched(Vec::new())
    }

    pub fn literal(predicate: Predicate<S>) -> Self {
        Language::new(Node::Literal(predicate))
    }

    pub(crate) fn rule(rule: RuleRef<S>) -> Self {
        Language::new(Node::Rule(rule))
    }

    pub fn node(&self) -> &Node<S> {
        &self.0.node
    }

    pub fn or(left: Self, right: Self) -> Self {
        if left.is_reject() {
            return right;
        }
        if right.is_reject() {
            return left;
        }
        if let (Node::Match(a), Node::Match(b)) = (left.node(), right.node()) {
            return Language::alternatives(concat(a, b));
        }
        Language::new(Node::Or(left, right))
    }

    pub fn and(left: Self, right: Self) -> Self {
        if left.is_reject() || right.is_reject() {
            return Language::reject();
        }
        match (left.node(), right.node()) {
            (Node::Match(a), Node::Match(b)) => return Language::alternatives(product(a, b)),
            (Node::Match(a), _) if is_unit(a) => return right,
            (_, Node::Match(b)) if is_unit(b) => return left,
            _ => {}
        }
        Language::new(Node::And(left, right))
    }

    pub fn repeat(inner: Self) -> Self {
        if inner.is_terminal() {
            return Language::empty();
        }
        Language::new(Node::Repeat(inner))
    }

    pub fn optional(inner: Self) -> Self {
        if inner.is_reject() {
            return Language::empty();
        }
        if inner.is_match() {
            return inner;
        }
        Language::new(Node::Optional(inner))
    }

    pub fn reduce(inner: Self, reducer: Reducer<S>) -> Self {
        match inner.node() {
            Node::Reject => inner,
            Node::Match(parses) => Language::alternatives(
                parses
                    .iter()
                    .map(|forest| vec![reducer.apply(forest.clone())])
                    .collect(),
            ),
            _ => Language::new(Node::Reduce(inner, reducer)),
        }
    }

    /// `x` followed by zero or more `x`.
    pub fn one_or_more(inner: Self) -> Self {
        Language::and(inner.clone(), Language::repeat(inner))
    }

    /// Left-to-right sequence of `parts`; the empty sequence is the empty match.
    pub fn sequence(parts: impl IntoIterator<Item = Self>) -> Self {
        parts
            .into_iter()
            .reduce(Language::and)
            .unwrap_or_else(Language::empty)
    }

    /// Alternation of `choices`; no choices at all is `Reject`.
    pub fn choice(choices: impl IntoIterator<Item = Self>) -> Self {
        choices
            .into_iter()
            .reduce(Language::or)
            .unwrap_or_else(Language::reject)
    }

    pub fn is_reject(&self) -> bool {
        matches!(self.node(), Node::Reject)
    }

    pub fn is_match(&self) -> bool {
        matches!(self.node(), Node::Match(_))
    }

    /// `Reject` or a completed match: nothing more can be consumed.
    pub fn is_terminal(&self) -> bool {
        self.is_reject() || self.is_match()
    }

    pub fn as_rule(&self) -> Option<&RuleRef<S>> {
        match self.node() {
            Node::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Whether the empty sequence is in the language, i.e. a match could end here.
    pub fn is_nullable(&self) -> bool {
        match self.0.nullable.get() {
            Some(nullable) => nullable,
            None => fixed_point::nullable(self),
        }
    }

    /// Whether the language accepts any sequence at all.
    ///
    /// Derivatives through recursive rules can be empty without having collapsed to
    /// `Reject`; this answers the question for them too.
    pub fn is_productive(&self) -> bool {
        if self.is_terminal() {
            return self.is_match();
        }
        match self.0.productive.get() {
            Some(productive) => productive,
            None => fixed_point::productive(self),
        }
    }

    /// Residual language after consuming `symbol`.
    pub fn derive(&self, symbol: &S) -> Language<S> {
        match self.node() {
            Node::Reject | Node::Match(_) | Node::Null(_) => return Language::reject(),
            Node::Rule(rule) => return rule.derive(symbol),
            _ => {}
        }

        let key = symbol.key();
        let cached = self.0.derivatives.borrow().get(&key).cloned();
        if let Some(derived) = cached {
            return derived;
        }

        let derived = self.derive_uncached(symbol);
        self.0.derivatives.borrow_mut().insert(key, derived.clone());
        derived
    }

    fn derive_uncached(&self, symbol: &S) -> Language<S> {
        match self.node() {
            Node::Reject | Node::Match(_) | Node::Null(_) => Language::reject(),
            Node::Literal(predicate) => {
                if predicate.test(symbol) {
                    Language::matched(vec![Ast::Leaf(symbol.clone())])
                } else {
                    Language::reject()
                }
            }
            Node::Or(left, right) => Language::or(left.derive(symbol), right.derive(symbol)),
            Node::And(left, right) => {
                let continued = Language::and(left.derive(symbol), right.clone());
                if left.is_nullable() {
                    let finished = Language::and(left.null_parses(), right.derive(symbol));
                    Language::or(continued, finished)
                } else {
                    continued
                }
            }
            Node::Repeat(inner) => Language::and(inner.derive(symbol), self.clone()),
            Node::Optional(inner) => inner.derive(symbol),
            Node::Reduce(inner, reducer) => {
                Language::reduce(inner.derive(symbol), reducer.clone())
            }
            Node::Rule(rule) => rule.derive(symbol),
        }
    }

    /// The language of the empty sequence carrying this language's null parses.
    ///
    /// Parses that one evaluation pass settles are folded into a `Match` now. Anything
    /// that still depends on a cyclic rule is wrapped in a `Null` node and left for
    /// extraction.
    fn null_parses(&self) -> Language<S> {
        if self.is_match() {
            return self.clone();
        }
        match fixed_point::settled_forest(self) {
            Some(Some(parses)) => Language::alternatives(parses),
            Some(None) => Language::reject(),
            None => Language::new(Node::Null(self.clone())),
        }
    }

    /// Parse forest of the empty continuation, every alternative parse in turn.
    ///
    /// Empty when the language is not nullable. When a cyclic rule does not stabilise within
    /// the default iteration cap the last approximation is returned and a warning is logged;
    /// use [Language::try_extract] to observe that case.
    pub fn extract(&self) -> Forest<S> {
        flatten(self.parses())
    }

    /// Alternative parses of the empty continuation, kept apart.
    pub fn parses(&self) -> Parses<S> {
        let evaluation = fixed_point::forest(self, DEFAULT_MAX_ITERATIONS);
        if let Some(err) = &evaluation.error {
            tracing::warn!(error = %err, "returning last fixed-point approximation");
        }
        evaluation.value.unwrap_or_default()
    }

    pub fn try_extract(&self) -> Result<Forest<S>, FixedPointError> {
        self.try_extract_with(DEFAULT_MAX_ITERATIONS)
    }

    pub fn try_extract_with(&self, max_iterations: usize) -> Result<Forest<S>, FixedPointError> {
        self.try_parses_with(max_iterations).map(flatten)
    }

    pub fn try_parses_with(&self, max_iterations: usize) -> Result<Parses<S>, FixedPointError> {
        let evaluation = fixed_point::forest(self, max_iterations);
        match evaluation.error {
            Some(err) => Err(err),
            None => Ok(evaluation.value.unwrap_or_default()),
        }
    }

    pub(crate) fn nullable_memo(&self) -> Option<bool> {
        self.0.nullable.get()
    }

    pub(crate) fn set_nullable_memo(&self, nullable: bool) {
        self.0.nullable.set(Some(nullable));
    }

    pub(crate) fn productive_memo(&self) -> Option<bool> {
        self.0.productive.get()
    }

    pub(crate) fn set_productive_memo(&self, productive: bool) {
        self.0.productive.set(Some(productive));
    }

    pub(crate) fn forest_memo(&self) -> Option<&Option<Parses<S>>> {
        self.0.forest.get()
    }

    pub(crate) fn set_forest_memo(&self, parses: Option<Parses<S>>) {
        self.0.nullable.set(Some(parses.is_some()));
        let _ = self.0.forest.set(parses);
    }
}

impl Language<char> {
    pub fn char(c: char) -> Self {
        Language::literal(Predicate::char(c))
    }
}

pub(crate) fn concat<T: Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// A single empty parse: the identity of sequencing.
fn is_unit<S: Symbol>(parses: &Parses<S>) -> bool {
    matches!(parses.as_slice(), [only] if only.is_empty())
}

impl<S: Symbol> fmt::Debug for Language<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Reject => f.write_str("Reject"),
            Node::Match(parses) => f.debug_tuple("Match").field(parses).finish(),
            Node::Literal(predicate) => write!(f, "{:?}", predicate),
            Node::Or(left, right) => f.debug_tuple("Or").field(left).field(right).finish(),
            Node::And(left, right) => f.debug_tuple("And").field(left).field(right).finish(),
            Node::Repeat(inner) => f.debug_tuple("Repeat").field(inner).finish(),
            Node::Optional(inner) => f.debug_tuple("Optional").field(inner).finish(),
            Node::Reduce(inner, reducer) => {
                f.debug_tuple("Reduce").field(inner).field(reducer).finish()
            }
            Node::Null(inner) => f.debug_tuple("Null").field(inner).finish(),
            Node::Rule(rule) => write!(f, "{:?}", rule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::render;
    use std::rc::Rc;

    fn ch(c: char) -> Language<char> {
        Language::char(c)
    }

    fn run(language: &Language<char>, input: &str) -> Language<char> {
        input
            .chars()
            .fold(language.clone(), |current, c| current.derive(&c))
    }

    fn leaves(forest: &[Ast<char>]) -> String {
        forest
            .iter()
            .flat_map(|tree| tree.leaves())
            .copied()
            .collect()
    }

    #[test]
    fn test_reject_absorbs() {
        let x = Language::and(ch('a'), ch('b'));
        assert!(Language::or(Language::reject(), x.clone()).ptr_eq(&x));
        assert!(Language::or(x.clone(), Language::reject()).ptr_eq(&x));
        assert!(Language::and(Language::reject(), x.clone()).is_reject());
        assert!(Language::and(x, Language::reject()).is_reject());
    }

    #[test]
    fn test_literal_round_trip() {
        let a = ch('a');
        let matched = a.derive(&'a');
        assert!(matched.is_match());
        assert_eq!(matched.extract(), vec![Ast::Leaf('a')]);
        assert!(a.derive(&'b').is_reject());
        assert!(matched.derive(&'a').is_reject());
    }

    #[test]
    fn test_derivatives_are_cached_per_symbol() {
        let ab = Language::or(ch('a'), ch('b'));
        assert!(ab.derive(&'a').ptr_eq(&ab.derive(&'a')));
    }

    #[test]
    fn test_ambiguity_keeps_both_parses() {
        let left = Language::reduce(Language::and(ch('a'), ch('b')), Reducer::node("left"));
        let right = Language::reduce(Language::and(ch('a'), ch('b')), Reducer::node("right"));
        let forest = run(&Language::or(left, right), "ab").extract();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].name(), Some("left"));
        assert_eq!(forest[1].name(), Some("right"));
    }

    #[test]
    fn test_ambiguous_sequence_keeps_parses_apart() {
        // pair = x x, x = 'a' | 'a' 'a'
        let x = Language::or(
            Language::reduce(ch('a'), Reducer::node("one")),
            Language::reduce(Language::and(ch('a'), ch('a')), Reducer::node("two")),
        );
        let pair = Language::reduce(Language::and(x.clone(), x), Reducer::node("pair"));
        let done = run(&pair, "aaa");
        let mut parses: Vec<String> = done.parses().iter().map(|p| render(p)).collect();
        parses.sort();
        assert_eq!(
            parses,
            ["(pair (one a) (two a a))", "(pair (two a a) (one a))"]
        );
        assert_eq!(done.extract().len(), 2);
    }

    #[test]
    fn test_alternatives_of_nothing_is_reject() {
        assert!(Language::<char>::alternatives(Vec::new()).is_reject());
        let both = Language::alternatives(vec![vec![Ast::Leaf('a')], vec![Ast::Leaf('b')]]);
        let sequenced = Language::and(both, Language::matched(vec![Ast::Leaf('c')]));
        assert_eq!(sequenced.parses().len(), 2);
        assert_eq!(leaves(&sequenced.extract()), "acbc");
    }

    #[test]
    fn test_repeat_is_nullable_with_empty_forest() {
        let many = Language::repeat(ch('x'));
        assert!(many.is_nullable());
        assert!(many.extract().is_empty());
        assert!(Language::repeat(Language::<char>::reject()).is_nullable());
    }

    #[test]
    fn test_repeat_collects_every_iteration() {
        let many = Language::repeat(ch('x'));
        let after = run(&many, "xxx");
        assert!(after.is_nullable());
        assert_eq!(leaves(&after.extract()), "xxx");
        assert!(after.derive(&'y').is_reject());
    }

    #[test]
    fn test_optional() {
        let maybe = Language::and(Language::optional(ch('-')), ch('1'));
        assert_eq!(leaves(&run(&maybe, "-1").extract()), "-1");
        assert_eq!(leaves(&run(&maybe, "1").extract()), "1");
        assert!(run(&maybe, "--").is_reject());
    }

    #[test]
    fn test_sequence_after_nullable_prefix() {
        // ('a')* 'b'
        let lang = Language::and(Language::repeat(ch('a')), ch('b'));
        assert_eq!(leaves(&run(&lang, "b").extract()), "b");
        assert_eq!(leaves(&run(&lang, "aab").extract()), "aab");
        assert!(!run(&lang, "aa").is_nullable());
    }

    #[test]
    fn test_reduce_runs_once_per_match() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let reducer = Reducer::new("pair", move |children| {
            counter.set(counter.get() + 1);
            Ast::node("pair", children)
        });
        let lang = Language::reduce(Language::and(ch('a'), ch('b')), reducer);
        let done = run(&lang, "ab");
        assert!(done.is_match());
        for _ in 0..3 {
            assert_eq!(done.extract().len(), 1);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_reduce_over_nullable_inner_is_memoised() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let reducer = Reducer::new("list", move |children| {
            counter.set(counter.get() + 1);
            Ast::node("list", children)
        });
        let lang = run(&Language::reduce(Language::repeat(ch('a')), reducer), "aa");
        assert!(lang.is_nullable());
        assert_eq!(calls.get(), 0);
        let first = lang.extract();
        let second = lang.extract();
        assert_eq!(first, second);
        assert_eq!(leaves(&first), "aa");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_smart_constructors_collapse_matches() {
        let m = Language::or(
            Language::matched(vec![Ast::Leaf('a')]),
            Language::matched(vec![Ast::Leaf('b')]),
        );
        assert!(m.is_match());
        assert_eq!(m.extract().len(), 2);
        assert!(Language::optional(Language::<char>::reject()).is_match());
        assert!(Language::reduce(Language::<char>::reject(), Reducer::node("x")).is_reject());
        assert!(Language::<char>::sequence(Vec::new()).is_match());
        assert!(Language::<char>::choice(Vec::new()).is_reject());
    }

    #[test]
    fn test_pending_alternative_survives_a_match() {
        // 'a' | 'a' 'b'
        let lang = Language::or(ch('a'), Language::and(ch('a'), ch('b')));
        let after_a = lang.derive(&'a');
        assert!(!after_a.is_match());
        assert!(after_a.is_nullable());
        assert_eq!(leaves(&run(&lang, "ab").extract()), "ab");
    }

    #[test]
    fn test_one_or_more() {
        let digits = Language::one_or_more(ch('7'));
        assert!(!digits.is_nullable());
        assert_eq!(leaves(&run(&digits, "777").extract()), "777");
    }
}
