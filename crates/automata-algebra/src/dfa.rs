//! Deterministic Finite Automaton (DFA) produced by subset construction.

use crate::epsilon_nfa::Nfa;
use crate::error::Result;
use crate::graph::{Automaton, StateGraph};
use crate::state::StateId;
use crate::subset_construction::{SubsetConfig, subset_construction};
use crate::symbol::Symbol;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

/// A Deterministic Finite Automaton.
///
/// Every state has at most one transition per symbol. States are numbered
/// `0..num_states()` with 0 the initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa<S> {
    graph: StateGraph<S>,
    /// Alphabet of the source NFA, including symbols no transition uses.
    alphabet: BTreeSet<S>,
    /// NFA states behind each DFA state, indexed by DFA state id.
    subsets: Vec<Vec<StateId>>,
}

impl<S: Symbol> Dfa<S> {
    pub(crate) fn new(
        graph: StateGraph<S>,
        alphabet: BTreeSet<S>,
        subsets: Vec<Vec<StateId>>,
    ) -> Self {
        Self {
            graph,
            alphabet,
            subsets,
        }
    }

    /// Determinize `nfa` with no limit on the number of states.
    pub fn from_nfa(nfa: &Nfa<S>) -> Self {
        match subset_construction(nfa, &SubsetConfig::default()) {
            Ok(dfa) => dfa,
            Err(err) => unreachable!("unbounded subset construction failed: {err}"),
        }
    }

    /// Determinize `nfa`, failing if `config` limits are exceeded.
    pub fn with_config(nfa: &Nfa<S>, config: &SubsetConfig) -> Result<Self> {
        subset_construction(nfa, config)
    }

    /// Get the number of states.
    pub fn num_states(&self) -> usize {
        self.subsets.len()
    }

    /// The sorted NFA states a DFA state stands for.
    pub fn subset(&self, state: StateId) -> Option<&[StateId]> {
        self.subsets.get(state as usize).map(Vec::as_slice)
    }

    pub fn into_graph(self) -> StateGraph<S> {
        self.graph
    }

    /// Check if the DFA accepts no string at all.
    pub fn is_empty(&self) -> bool {
        if self.graph.accepting_states().is_empty() {
            return true;
        }

        // BFS to find if any final state is reachable
        let mut visited = vec![false; self.num_states()];
        let mut queue = VecDeque::from([self.initial_state()]);

        while let Some(state) = queue.pop_front() {
            match visited.get_mut(state as usize) {
                Some(seen) if !*seen => *seen = true,
                _ => continue,
            }

            if self.is_accepting(state) {
                return false;
            }

            for symbol in &self.alphabet {
                if let Some(next) = self.next_state(state, symbol) {
                    queue.push_back(next);
                }
            }
        }

        true
    }
}

impl<S: Symbol> From<&Nfa<S>> for Dfa<S> {
    fn from(nfa: &Nfa<S>) -> Self {
        Self::from_nfa(nfa)
    }
}

impl<S: Symbol> Automaton<S> for Dfa<S> {
    fn graph(&self) -> &StateGraph<S> {
        &self.graph
    }

    fn alphabet(&self) -> BTreeSet<S> {
        self.alphabet.clone()
    }
}

impl<S: Symbol + fmt::Display> fmt::Display for Dfa<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.graph, f)
    }
}
