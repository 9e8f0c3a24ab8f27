//! Subset construction algorithm for converting ε-NFA to DFA.

use crate::dfa::Dfa;
use crate::epsilon_nfa::Nfa;
use crate::error::{AutomatonError, Result};
use crate::graph::{Automaton, StateGraph};
use crate::state::{StateId, StateSet};
use crate::symbol::Symbol;
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::VecDeque;

/// Order in which newly discovered subsets are processed.
///
/// The order changes how DFA states are numbered, never the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorklistOrder {
    /// Most recently discovered subset first.
    #[default]
    Lifo,
    /// Subsets in discovery order; DFA ids then follow breadth-first order.
    Fifo,
}

/// Configuration for subset construction.
#[derive(Debug, Clone, Default)]
pub struct SubsetConfig {
    /// Maximum number of DFA states (0 = unlimited).
    pub max_states: usize,

    /// Worklist discipline.
    pub order: WorklistOrder,
}

impl SubsetConfig {
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    pub fn with_order(mut self, order: WorklistOrder) -> Self {
        self.order = order;
        self
    }

    /// Id for the DFA state discovered after `count` others.
    fn next_dfa_state(&self, count: usize) -> Result<StateId> {
        let exceeded = AutomatonError::StateLimitExceeded {
            states: count.saturating_add(1),
            max: self.max_states,
        };
        if self.max_states != 0 && count >= self.max_states {
            return Err(exceeded);
        }
        StateId::try_from(count).map_err(|_| exceeded)
    }
}

/// Convert an epsilon-NFA to a DFA using the powerset construction algorithm.
///
/// DFA state 0 is the epsilon closure of the NFA's initial state. A DFA
/// state is accepting when its subset contains any accepting NFA state.
pub fn subset_construction<S: Symbol>(nfa: &Nfa<S>, config: &SubsetConfig) -> Result<Dfa<S>> {
    let edges = nfa.epsilon_edges();
    let alphabet = nfa.alphabet();
    let nfa_accepting: StateSet = nfa.accepting_states().iter().copied().collect();

    // Each DFA state corresponds to a set of NFA states, keyed by its sorted
    // member list. Insertion index equals DFA state id.
    let mut state_mapping: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
    let mut graph = StateGraph::new(0);
    let mut worklist: VecDeque<(StateId, StateSet)> = VecDeque::new();

    let initial_set = edges.closure(&StateSet::singleton(nfa.initial_state(), 1));
    state_mapping.insert(initial_set.to_vec(), 0);
    if initial_set.intersects(&nfa_accepting) {
        graph.add_accepting_state(0);
    }
    trace!("DFA state 0 = NFA states {initial_set:?}");
    worklist.push_back((0, initial_set));

    loop {
        let next_item = match config.order {
            WorklistOrder::Lifo => worklist.pop_back(),
            WorklistOrder::Fifo => worklist.pop_front(),
        };
        let Some((current_dfa_state, current_nfa_set)) = next_item else {
            break;
        };

        for symbol in &alphabet {
            let next_nfa_set = nfa.move_with(&edges, &current_nfa_set, symbol);

            if next_nfa_set.is_empty() {
                // No transition on this symbol
                continue;
            }

            let next_vec = next_nfa_set.to_vec();
            let next_dfa_state = if let Some(&existing) = state_mapping.get(&next_vec) {
                existing
            } else {
                let new_state = config.next_dfa_state(state_mapping.len())?;
                state_mapping.insert(next_vec, new_state);
                if next_nfa_set.intersects(&nfa_accepting) {
                    graph.add_accepting_state(new_state);
                }

                trace!("DFA state {new_state} = NFA states {next_nfa_set:?}");
                worklist.push_back((new_state, next_nfa_set));
                new_state
            };

            graph.add_transition(current_dfa_state, symbol.clone(), next_dfa_state);
        }
    }

    debug!(
        "subset construction: {} NFA states -> {} DFA states, {} transitions",
        nfa.states().len(),
        state_mapping.len(),
        graph.transitions().len()
    );

    let subsets = state_mapping.into_keys().collect();
    Ok(Dfa::new(graph, alphabet, subsets))
}
