//! Error types for automaton composition and conversion.

use crate::state::StateId;
use thiserror::Error;

/// Errors raised while composing or converting automata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    #[error("fragment must have exactly one accepting state, found {accepting}")]
    MalformedFragment { accepting: usize },

    #[error("operands disagree on the epsilon symbol: {left} vs {right}")]
    EpsilonMismatch { left: String, right: String },

    #[error("offsetting state {state} by {delta} leaves the state id range")]
    StateOutOfRange { state: StateId, delta: i64 },

    #[error("DFA state limit exceeded: {states} states (max: {max})")]
    StateLimitExceeded { states: usize, max: usize },
}

/// Result type for automaton operations.
pub type Result<T> = std::result::Result<T, AutomatonError>;
