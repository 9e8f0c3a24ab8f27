//! A single labelled edge of a state graph.

use crate::state::StateId;
use crate::symbol::Symbol;

/// An edge `source --symbol--> target`.
///
/// Transitions order lexicographically by source, then symbol, then target,
/// which is the order used for rendering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition<S> {
    pub source: StateId,
    pub symbol: S,
    pub target: StateId,
}

impl<S: Symbol> Transition<S> {
    pub fn new(source: StateId, symbol: S, target: StateId) -> Self {
        Self {
            source,
            symbol,
            target,
        }
    }

    /// Whether this edge leaves `state` on `symbol`.
    #[inline]
    pub fn matches(&self, state: StateId, symbol: &S) -> bool {
        self.source == state && self.symbol.cmp(symbol).is_eq()
    }

    /// Apply a state relabelling to both endpoints.
    pub(crate) fn relabel(&mut self, map: impl Fn(StateId) -> StateId) {
        self.source = map(self.source);
        self.target = map(self.target);
    }
}
