//! Parse results carried by completed matches.
//!
//!     A forest is the ordered list of trees one parse produced. A match carries every
//!     alternative parse of the input consumed so far as [Parses]: sequencing pairs each
//!     parse on the left with each parse on the right, and an alternation where both sides
//!     match keeps the parses of both, so every valid interpretation survives. A `Reduce`
//!     node folds each parse of its inner language into a single tree through a [Reducer].

use super::Symbol;
use std::fmt;
use std::rc::Rc;

pub type Forest<S> = Vec<Ast<S>>;

/// Alternative parses of the same input; more than one means the input is ambiguous.
pub type Parses<S> = Vec<Forest<S>>;

/// The single parse of the empty sequence.
pub(crate) fn unit<S: Symbol>() -> Parses<S> {
    vec![Vec::new()]
}

/// Every parse of `left` followed by every parse of `right`.
pub(crate) fn product<S: Symbol>(left: &[Forest<S>], right: &[Forest<S>]) -> Parses<S> {
    let mut parses = Vec::with_capacity(left.len() * right.len());
    for first in left {
        for second in right {
            let mut forest = Vec::with_capacity(first.len() + second.len());
            forest.extend_from_slice(first);
            forest.extend_from_slice(second);
            parses.push(forest);
        }
    }
    parses
}

/// All alternatives' trees in one list, first alternative first.
pub fn flatten<S: Symbol>(parses: Parses<S>) -> Forest<S> {
    parses.into_iter().flatten().collect()
}

#[derive(Clone, PartialEq)]
pub enum Ast<S: Symbol> {
    /// A consumed input symbol
    Leaf(S),
    /// A reduced sub-result
    Node { name: Rc<str>, children: Forest<S> },
}

impl<S: Symbol> Ast<S> {
    pub fn node(name: impl Into<Rc<str>>, children: Forest<S>) -> Self {
        Ast::Node {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Ast::Leaf(_) => None,
            Ast::Node { name, .. } => Some(name.as_ref()),
        }
    }

    pub fn children(&self) -> &[Ast<S>] {
        match self {
            Ast::Leaf(_) => &[],
            Ast::Node { children, .. } => children,
        }
    }

    pub fn as_leaf(&self) -> Option<&S> {
        match self {
            Ast::Leaf(symbol) => Some(symbol),
            Ast::Node { .. } => None,
        }
    }

    /// All leaves below this tree, left to right.
    pub fn leaves(&self) -> Vec<&S> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a S>) {
        match self {
            Ast::Leaf(symbol) => out.push(symbol),
            Ast::Node { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl<S: Symbol + fmt::Display> fmt::Display for Ast<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Leaf(symbol) => write!(f, "{}", symbol),
            Ast::Node { name, children } => {
                write!(f, "({}", name)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl<S: Symbol> fmt::Debug for Ast<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Leaf(symbol) => write!(f, "{:?}", symbol),
            Ast::Node { name, children } => f.debug_tuple(name).field(children).finish(),
        }
    }
}

/// Renders a whole forest as space separated trees.
pub fn render<S: Symbol + fmt::Display>(forest: &[Ast<S>]) -> String {
    forest
        .iter()
        .map(|tree| tree.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A named pure function folding a forest into one tree.
///
/// Reducers may run more than once while a cyclic rule is being stabilised, so they must
/// not have side effects anything depends on.
#[derive(Clone)]
pub struct Reducer<S: Symbol> {
    name: Rc<str>,
    apply: Rc<dyn Fn(Forest<S>) -> Ast<S>>,
}

impl<S: Symbol> Reducer<S> {
    pub fn new(name: impl Into<Rc<str>>, apply: impl Fn(Forest<S>) -> Ast<S> + 'static) -> Self {
        Reducer {
            name: name.into(),
            apply: Rc::new(apply),
        }
    }

    /// Wraps the forest in an `Ast::Node` labelled `name`.
    pub fn node(name: impl Into<Rc<str>>) -> Self {
        let name: Rc<str> = name.into();
        let label = name.clone();
        Reducer::new(name, move |children| Ast::Node {
            name: label.clone(),
            children,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, forest: Forest<S>) -> Ast<S> {
        (self.apply)(forest)
    }
}

impl<S: Symbol> fmt::Debug for Reducer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reducer({})", self.name)
    }
}
