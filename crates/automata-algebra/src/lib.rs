//! Finite automata algebra over any totally ordered alphabet.
//!
//! This crate provides:
//! - A state graph shared by NFAs and DFAs
//! - NFA construction operators: concatenation, alternation, Kleene star
//!   and transition expansion
//! - Epsilon closure computation
//! - Subset construction (NFA to DFA conversion)
//!
//! ```
//! use automata_algebra::{Automaton, Dfa, Nfa};
//!
//! // a*b
//! let nfa = Nfa::new('a').star()?.and(&Nfa::new('b'))?;
//! let dfa = Dfa::from_nfa(&nfa);
//!
//! let mut state = dfa.initial_state();
//! for c in "aab".chars() {
//!     state = dfa.next_state(state, &c).unwrap();
//! }
//! assert!(dfa.is_accepting(state));
//! # Ok::<(), automata_algebra::AutomatonError>(())
//! ```

mod dfa;
mod epsilon_nfa;
mod error;
mod graph;
mod state;
mod subset_construction;
mod symbol;
mod transition;

pub use dfa::Dfa;
pub use epsilon_nfa::Nfa;
pub use error::{AutomatonError, Result};
pub use graph::{Automaton, StateGraph};
pub use state::{StateId, StateSet};
pub use subset_construction::{SubsetConfig, WorklistOrder, subset_construction};
pub use symbol::{Epsilon, Symbol};
pub use transition::Transition;

#[cfg(test)]
mod tests;
