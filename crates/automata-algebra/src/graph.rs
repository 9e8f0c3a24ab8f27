//! The state graph shared by NFAs and DFAs.

use crate::error::{AutomatonError, Result};
use crate::state::StateId;
use crate::symbol::Symbol;
use crate::transition::Transition;
use std::collections::BTreeSet;
use std::fmt;

/// The id after `state`, or `StateOutOfRange` if `state` is the last one.
pub(crate) fn successor(state: StateId) -> Result<StateId> {
    state
        .checked_add(1)
        .ok_or(AutomatonError::StateOutOfRange { state, delta: 1 })
}

/// A flat list of transitions with one initial state and a set of accepting
/// states.
///
/// Transitions keep their insertion order and may repeat. Accepting states
/// keep their insertion order but never repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateGraph<S> {
    transitions: Vec<Transition<S>>,
    initial_state: StateId,
    accepting_states: Vec<StateId>,
}

impl<S: Symbol> StateGraph<S> {
    /// Create a graph with no transitions and no accepting states.
    pub fn new(initial_state: StateId) -> Self {
        Self {
            transitions: Vec::new(),
            initial_state,
            accepting_states: Vec::new(),
        }
    }

    /// Append a transition from source to target on the given symbol.
    pub fn add_transition(&mut self, source: StateId, symbol: S, target: StateId) {
        self.transitions.push(Transition::new(source, symbol, target));
    }

    /// Mark a state as accepting. Adding it twice has no effect.
    pub fn add_accepting_state(&mut self, state: StateId) {
        if !self.accepting_states.contains(&state) {
            self.accepting_states.push(state);
        }
    }

    pub fn initial_state(&self) -> StateId {
        self.initial_state
    }

    pub(crate) fn set_initial_state(&mut self, state: StateId) {
        self.initial_state = state;
    }

    /// Accepting states in insertion order.
    pub fn accepting_states(&self) -> &[StateId] {
        &self.accepting_states
    }

    pub(crate) fn set_accepting_states(&mut self, states: impl IntoIterator<Item = StateId>) {
        self.accepting_states.clear();
        for state in states {
            self.add_accepting_state(state);
        }
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting_states.contains(&state)
    }

    /// Transitions in insertion order.
    pub fn transitions(&self) -> &[Transition<S>] {
        &self.transitions
    }

    pub(crate) fn take_transitions(&mut self) -> Vec<Transition<S>> {
        std::mem::take(&mut self.transitions)
    }

    pub(crate) fn extend_transitions(
        &mut self,
        transitions: impl IntoIterator<Item = Transition<S>>,
    ) {
        self.transitions.extend(transitions);
    }

    /// Every distinct symbol labelling a transition, ascending.
    pub fn symbols(&self) -> BTreeSet<S> {
        self.transitions.iter().map(|t| t.symbol.clone()).collect()
    }

    /// Every state referenced by a transition, the initial state or the
    /// accepting states, ascending.
    pub fn states(&self) -> BTreeSet<StateId> {
        let mut states: BTreeSet<StateId> = self
            .transitions
            .iter()
            .flat_map(|t| [t.source, t.target])
            .collect();
        states.insert(self.initial_state);
        states.extend(self.accepting_states.iter().copied());
        states
    }

    /// One past the largest state id referenced anywhere in the graph.
    ///
    /// This is the allocator for fresh states: any id at or above it is
    /// guaranteed to be unused. Fails when `StateId::MAX` is in use.
    pub fn next_available_state(&self) -> Result<StateId> {
        let max = self
            .transitions
            .iter()
            .flat_map(|t| [t.source, t.target])
            .chain(self.accepting_states.iter().copied())
            .fold(self.initial_state, StateId::max);
        successor(max)
    }

    /// Target of the first transition leaving `state` on `symbol`.
    pub fn next_state(&self, state: StateId, symbol: &S) -> Option<StateId> {
        self.targets(state, symbol).next()
    }

    /// Targets of every transition leaving `state` on `symbol`, in insertion
    /// order.
    pub fn targets<'a>(
        &'a self,
        state: StateId,
        symbol: &'a S,
    ) -> impl Iterator<Item = StateId> + 'a {
        self.transitions
            .iter()
            .filter(move |t| t.matches(state, symbol))
            .map(|t| t.target)
    }

    /// Shift every state id so that the initial state becomes `new_initial`.
    ///
    /// The graph is left untouched if any id would leave the `StateId` range.
    pub fn offset_states(&mut self, new_initial: StateId) -> Result<()> {
        let delta = i64::from(new_initial) - i64::from(self.initial_state);
        if delta == 0 {
            return Ok(());
        }

        for state in self.states() {
            if StateId::try_from(i64::from(state) + delta).is_err() {
                return Err(AutomatonError::StateOutOfRange { state, delta });
            }
        }

        // Every id was range checked above.
        self.relabel(|state| (i64::from(state) + delta) as StateId);
        Ok(())
    }

    /// Replace every occurrence of `old` with `new`.
    ///
    /// If `new` is already in use the two states become one.
    pub fn renumber_state(&mut self, old: StateId, new: StateId) {
        self.relabel(|state| if state == old { new } else { state });
    }

    /// Apply a state relabelling to the initial state, every transition
    /// endpoint and every accepting state.
    pub(crate) fn relabel(&mut self, map: impl Fn(StateId) -> StateId) {
        self.initial_state = map(self.initial_state);
        for transition in &mut self.transitions {
            transition.relabel(&map);
        }
        let accepting = std::mem::take(&mut self.accepting_states);
        self.set_accepting_states(accepting.into_iter().map(&map));
    }

    /// Transitions sorted by source, symbol and target.
    pub fn sorted_transitions(&self) -> Vec<&Transition<S>> {
        let mut sorted: Vec<&Transition<S>> = self.transitions.iter().collect();
        sorted.sort();
        sorted
    }

    fn annotate(&self, state: StateId) -> String {
        let prefix = if state == self.initial_state { ">" } else { "" };
        if self.is_accepting(state) {
            format!("{prefix}({state})")
        } else {
            format!("{prefix}{state}")
        }
    }
}

impl<S: Symbol + fmt::Display> fmt::Display for StateGraph<S> {
    /// One line per transition, `source->symbol->target`, with `>` marking
    /// the initial state and parentheses around accepting states.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.sorted_transitions().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{}->{}->{}",
                self.annotate(t.source),
                t.symbol,
                self.annotate(t.target)
            )?;
        }
        Ok(())
    }
}

/// Read access shared by every automaton built on a [`StateGraph`].
pub trait Automaton<S: Symbol> {
    /// The underlying state graph.
    fn graph(&self) -> &StateGraph<S>;

    /// Input symbols of the automaton, ascending.
    fn alphabet(&self) -> BTreeSet<S> {
        self.graph().symbols()
    }

    fn initial_state(&self) -> StateId {
        self.graph().initial_state()
    }

    fn accepting_states<'a>(&'a self) -> &'a [StateId]
    where
        S: 'a,
    {
        self.graph().accepting_states()
    }

    fn is_accepting(&self, state: StateId) -> bool {
        self.graph().is_accepting(state)
    }

    fn transitions(&self) -> &[Transition<S>] {
        self.graph().transitions()
    }

    fn states(&self) -> BTreeSet<StateId> {
        self.graph().states()
    }

    fn next_state(&self, state: StateId, symbol: &S) -> Option<StateId> {
        self.graph().next_state(state, symbol)
    }

    fn next_available_state(&self) -> Result<StateId> {
        self.graph().next_available_state()
    }
}

impl<S: Symbol> Automaton<S> for StateGraph<S> {
    fn graph(&self) -> &StateGraph<S> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> StateGraph<char> {
        // 0 -a-> 1 -b-> 2(final)
        let mut graph = StateGraph::new(0);
        graph.add_transition(0, 'a', 1);
        graph.add_transition(1, 'b', 2);
        graph.add_accepting_state(2);
        graph
    }

    #[test]
    fn test_derived_sets() {
        let graph = chain();
        assert_eq!(graph.states(), BTreeSet::from([0, 1, 2]));
        assert_eq!(graph.symbols(), BTreeSet::from(['a', 'b']));
        assert_eq!(graph.next_available_state(), Ok(3));
    }

    #[test]
    fn test_empty_graph_allocator() {
        let graph = StateGraph::<char>::new(0);
        assert_eq!(graph.next_available_state(), Ok(1));
        assert_eq!(graph.states(), BTreeSet::from([0]));
    }

    #[test]
    fn test_accepting_state_counts_for_allocator() {
        let mut graph = chain();
        graph.add_accepting_state(9);
        graph.add_accepting_state(9);
        assert_eq!(graph.accepting_states(), &[2, 9]);
        assert_eq!(graph.next_available_state(), Ok(10));
    }

    #[test]
    fn test_allocator_at_id_limit() {
        let graph = StateGraph::<char>::new(StateId::MAX);
        assert_eq!(
            graph.next_available_state(),
            Err(AutomatonError::StateOutOfRange {
                state: StateId::MAX,
                delta: 1
            })
        );

        let mut graph = StateGraph::new(0);
        graph.add_transition(0, 'a', StateId::MAX - 1);
        assert_eq!(graph.next_available_state(), Ok(StateId::MAX));
    }

    #[test]
    fn test_accepting_states_through_trait() {
        fn accepting<A: Automaton<char>>(automaton: &A) -> Vec<StateId> {
            automaton.accepting_states().to_vec()
        }

        assert_eq!(accepting(&chain()), vec![2]);
    }

    #[test]
    fn test_next_state_first_match() {
        let mut graph = chain();
        graph.add_transition(0, 'a', 2);

        assert_eq!(graph.next_state(0, &'a'), Some(1));
        assert_eq!(graph.targets(0, &'a').collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(graph.next_state(0, &'b'), None);
        assert_eq!(graph.next_state(2, &'a'), None);
    }

    #[test]
    fn test_offset_states() {
        let mut graph = chain();
        graph.offset_states(5).unwrap();

        assert_eq!(graph.initial_state(), 5);
        assert_eq!(graph.accepting_states(), &[7]);
        assert_eq!(graph.next_state(5, &'a'), Some(6));
        assert_eq!(graph.next_state(6, &'b'), Some(7));

        graph.offset_states(0).unwrap();
        assert_eq!(graph, chain());
    }

    #[test]
    fn test_offset_out_of_range() {
        let mut graph = chain();
        graph.renumber_state(0, 1);
        graph.renumber_state(2, 0);
        // Initial state is 1, state 0 would go negative.
        let before = graph.clone();

        let err = graph.offset_states(0).unwrap_err();
        assert_eq!(
            err,
            AutomatonError::StateOutOfRange {
                state: 0,
                delta: -1
            }
        );
        assert_eq!(graph, before);
    }

    #[test]
    fn test_renumber_state_fuses() {
        let mut graph = chain();
        graph.renumber_state(2, 0);

        assert_eq!(graph.accepting_states(), &[0]);
        assert_eq!(graph.states(), BTreeSet::from([0, 1]));
        assert_eq!(graph.next_state(1, &'b'), Some(0));
    }

    #[test]
    fn test_display() {
        let mut graph = chain();
        graph.add_transition(0, 'c', 0);
        assert_eq!(graph.to_string(), ">0->a->1\n>0->c->>0\n1->b->(2)");
    }
}
