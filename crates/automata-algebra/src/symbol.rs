//! Symbol types for automata transitions.

use std::fmt::Debug;

/// An element of an automaton's alphabet.
///
/// Symbols are compared through their total order; two symbols are the same
/// symbol when `Ord` says they are equal.
pub trait Symbol: Ord + Clone + Debug {}

impl<T: Ord + Clone + Debug> Symbol for T {}

/// Symbol types that come with a conventional epsilon marker.
pub trait Epsilon: Symbol {
    /// The value reserved for epsilon (empty) transitions.
    const EPSILON: Self;

    /// Check if a symbol is the epsilon marker.
    #[inline]
    fn is_epsilon(&self) -> bool {
        *self == Self::EPSILON
    }
}

/// `u32::MAX` is the epsilon marker for integer symbol ids.
impl Epsilon for u32 {
    const EPSILON: Self = u32::MAX;
}

impl Epsilon for char {
    const EPSILON: Self = 'ε';
}
