//! Epsilon Non-deterministic Finite Automaton (ε-NFA) and its construction
//! algebra.
//!
//! Every operator borrows its operands, works on a clone and returns a new
//! automaton. Operands must be fragments: exactly one accepting state.
//!
//! Sub-automata are connected by fusing states rather than by adding
//! epsilon edges. A fragment endpoint is fused into a host state only when
//! that cannot create new paths: an initial state with no incoming edges,
//! or an accepting state with no outgoing edges. Otherwise the endpoint is
//! linked to the host state with an epsilon edge.

use crate::error::{AutomatonError, Result};
use crate::graph::{Automaton, StateGraph, successor};
use crate::state::{StateId, StateSet};
use crate::symbol::{Epsilon, Symbol};
use crate::transition::Transition;
use log::debug;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

/// An Epsilon Non-deterministic Finite Automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa<S> {
    graph: StateGraph<S>,
    /// Label of transitions that consume no input.
    epsilon: S,
}

/// How a grafted fragment endpoint joins a host state.
#[derive(Debug, Clone, Copy)]
enum Attach {
    /// The endpoint becomes the host state.
    Fuse(StateId),
    /// The endpoint stays separate, joined by an epsilon edge.
    Link(StateId),
}

/// A relabelled copy of a fragment, ready to be appended to a host graph.
struct Graft<S> {
    transitions: Vec<Transition<S>>,
    accepting: StateId,
    /// First state id not used by the copy.
    next: StateId,
}

/// Epsilon successor lists, built once and shared by closure queries.
pub(crate) struct EpsilonEdges {
    successors: HashMap<StateId, Vec<StateId>>,
}

impl EpsilonEdges {
    /// All states reachable from `states` through epsilon edges, `states`
    /// included. Iterative DFS guarded by the result set.
    pub(crate) fn closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(states.len());
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(s) = stack.pop() {
            if !closure.insert(s) {
                continue;
            }

            if let Some(destinations) = self.successors.get(&s) {
                stack.extend(destinations.iter().filter(|&&d| !closure.contains(d)));
            }
        }

        closure
    }
}

impl<S: Symbol> Nfa<S> {
    /// The two-state fragment `0 --symbol--> (1)`.
    pub fn symbol(symbol: S, epsilon: S) -> Self {
        let mut graph = StateGraph::new(0);
        graph.add_transition(0, symbol, 1);
        graph.add_accepting_state(1);
        Self { graph, epsilon }
    }

    /// Wrap a hand-built graph. The graph does not have to be a fragment,
    /// but the algebra operators will reject it if it is not.
    pub fn from_graph(graph: StateGraph<S>, epsilon: S) -> Self {
        Self { graph, epsilon }
    }

    pub fn epsilon(&self) -> &S {
        &self.epsilon
    }

    #[inline]
    pub fn is_epsilon(&self, symbol: &S) -> bool {
        symbol.cmp(&self.epsilon).is_eq()
    }

    pub fn into_graph(self) -> StateGraph<S> {
        self.graph
    }

    /// See [`StateGraph::offset_states`].
    pub fn offset_states(&mut self, new_initial: StateId) -> Result<()> {
        self.graph.offset_states(new_initial)
    }

    /// See [`StateGraph::renumber_state`].
    pub fn renumber_state(&mut self, old: StateId, new: StateId) {
        self.graph.renumber_state(old, new);
    }

    pub(crate) fn epsilon_edges(&self) -> EpsilonEdges {
        let mut successors: HashMap<StateId, Vec<StateId>> = HashMap::new();
        for t in self.graph.transitions() {
            if self.is_epsilon(&t.symbol) {
                successors.entry(t.source).or_default().push(t.target);
            }
        }
        EpsilonEdges { successors }
    }

    /// The epsilon closure of a single state, ascending. Always contains
    /// `state` itself.
    pub fn closure(&self, state: StateId) -> StateSet {
        self.epsilon_edges().closure(&StateSet::singleton(state, 1))
    }

    /// The epsilon closure of a set of states.
    pub fn closure_of(&self, states: &StateSet) -> StateSet {
        self.epsilon_edges().closure(states)
    }

    /// Get the states reachable from a set of states on a given symbol.
    /// Returns the epsilon closure of the reached states.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: &S) -> StateSet {
        self.move_with(&self.epsilon_edges(), states, symbol)
    }

    pub(crate) fn move_with(
        &self,
        edges: &EpsilonEdges,
        states: &StateSet,
        symbol: &S,
    ) -> StateSet {
        let reached: StateSet = states
            .iter()
            .flat_map(|state| self.graph.targets(state, symbol))
            .collect();

        if reached.is_empty() {
            return reached;
        }
        edges.closure(&reached)
    }

    /// Check if the NFA accepts no string at all.
    /// Uses BFS from the initial state following every transition.
    pub fn is_empty(&self) -> bool {
        let mut successors: HashMap<StateId, Vec<StateId>> = HashMap::new();
        for t in self.graph.transitions() {
            successors.entry(t.source).or_default().push(t.target);
        }

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([self.initial_state()]);

        while let Some(state) = queue.pop_front() {
            if !visited.insert(state) {
                continue;
            }
            if self.is_accepting(state) {
                return false;
            }
            if let Some(destinations) = successors.get(&state) {
                queue.extend(destinations.iter().filter(|d| !visited.contains(*d)));
            }
        }

        true
    }

    /// Concatenation: strings of `self` followed by strings of `other`.
    ///
    /// `other` is moved above the states of `self` and its initial state
    /// merged into the accepting state of `self`. The accepting state of the
    /// result is the relabelled accepting state of `other`.
    pub fn and(&self, other: &Self) -> Result<Self> {
        self.check_epsilon(other)?;
        let accepting = self.sole_accepting_state()?;

        let fusable =
            !other.has_incoming(other.initial_state()) || !self.has_outgoing(accepting);
        let entry = if fusable {
            Attach::Fuse(accepting)
        } else {
            Attach::Link(accepting)
        };
        let graft = other.graft(self.next_available_state()?, entry, None)?;

        let mut result = self.clone();
        result.graph.extend_transitions(graft.transitions);
        result.graph.set_accepting_states([graft.accepting]);

        debug!(
            "concatenation: {} states, {} transitions",
            result.states().len(),
            result.transitions().len()
        );
        Ok(result)
    }

    /// Alternation: strings of `self` or strings of `other`.
    ///
    /// Both operands share one initial and one accepting state. When those of
    /// `self` are clean the shared states keep their ids; otherwise fresh ones
    /// are allocated and joined to `self` by epsilon edges.
    pub fn or(&self, other: &Self) -> Result<Self> {
        self.check_epsilon(other)?;
        let accepting = self.sole_accepting_state()?;
        other.sole_accepting_state()?;
        let initial = self.initial_state();

        let mut result = self.clone();
        let mut next = self.next_available_state()?;

        let entry = if self.has_incoming(initial) {
            let fresh = next;
            next = successor(next)?;
            result.graph.add_transition(fresh, self.epsilon.clone(), initial);
            result.graph.set_initial_state(fresh);
            fresh
        } else {
            initial
        };

        let exit = if self.has_outgoing(accepting) || accepting == initial {
            let fresh = next;
            next = successor(next)?;
            result.graph.add_transition(accepting, self.epsilon.clone(), fresh);
            result.graph.set_accepting_states([fresh]);
            fresh
        } else {
            accepting
        };

        let graft = other.graft(next, other.entry_attach(entry), Some(other.exit_attach(exit)))?;
        result.graph.extend_transitions(graft.transitions);

        debug!(
            "alternation: {} states, {} transitions",
            result.states().len(),
            result.transitions().len()
        );
        Ok(result)
    }

    /// Kleene star: zero or more repetitions of `self`.
    ///
    /// States are shifted up by one, state 0 becomes the new entry and a
    /// fresh exit state is the only accepting state:
    /// `0 -ε-> body`, `body_accept -ε-> exit`, `exit -ε-> body`, `0 -ε-> exit`.
    pub fn star(&self) -> Result<Self> {
        let accepting = self.sole_accepting_state()?;

        let mut result = self.clone();
        result.graph.offset_states(successor(self.initial_state())?)?;
        let body = result.initial_state();
        let body_accepting = accepting + 1;
        let exit = result.next_available_state()?;
        let epsilon = self.epsilon.clone();

        result.graph.add_transition(0, epsilon.clone(), body);
        result.graph.add_transition(body_accepting, epsilon.clone(), exit);
        result.graph.add_transition(exit, epsilon.clone(), body);
        result.graph.add_transition(0, epsilon, exit);
        result.graph.set_initial_state(0);
        result.graph.set_accepting_states([exit]);

        debug!(
            "star: {} states, {} transitions",
            result.states().len(),
            result.transitions().len()
        );
        Ok(result)
    }

    /// Replace every transition labelled `symbol` with a fresh copy of
    /// `replacement` spliced between its source and target.
    ///
    /// Only transitions present before the call are expanded; copies that
    /// themselves contain `symbol` are left alone.
    pub fn replace_transitions(&self, symbol: &S, replacement: &Self) -> Result<Self> {
        self.check_epsilon(replacement)?;
        self.sole_accepting_state()?;
        replacement.sole_accepting_state()?;

        let mut result = self.clone();
        let mut next = self.next_available_state()?;
        let mut kept = Vec::new();
        let mut expanded = Vec::new();
        let mut count = 0usize;

        for transition in result.graph.take_transitions() {
            if !transition.symbol.cmp(symbol).is_eq() {
                kept.push(transition);
                continue;
            }

            let graft = replacement.graft(
                next,
                replacement.entry_attach(transition.source),
                Some(replacement.exit_attach(transition.target)),
            )?;
            next = graft.next;
            expanded.extend(graft.transitions);
            count += 1;
        }

        result.graph.extend_transitions(kept);
        result.graph.extend_transitions(expanded);

        debug!(
            "expanded {count} transitions on {symbol:?}: {} states, {} transitions",
            result.states().len(),
            result.transitions().len()
        );
        Ok(result)
    }

    fn sole_accepting_state(&self) -> Result<StateId> {
        match self.accepting_states() {
            [state] => Ok(*state),
            states => Err(AutomatonError::MalformedFragment {
                accepting: states.len(),
            }),
        }
    }

    fn check_epsilon(&self, other: &Self) -> Result<()> {
        if self.is_epsilon(&other.epsilon) {
            Ok(())
        } else {
            Err(AutomatonError::EpsilonMismatch {
                left: format!("{:?}", self.epsilon),
                right: format!("{:?}", other.epsilon),
            })
        }
    }

    fn has_incoming(&self, state: StateId) -> bool {
        self.transitions().iter().any(|t| t.target == state)
    }

    fn has_outgoing(&self, state: StateId) -> bool {
        self.transitions().iter().any(|t| t.source == state)
    }

    /// How this fragment's initial state may join `host`.
    fn entry_attach(&self, host: StateId) -> Attach {
        if self.has_incoming(self.initial_state()) {
            Attach::Link(host)
        } else {
            Attach::Fuse(host)
        }
    }

    /// How this fragment's accepting state may join `host`.
    fn exit_attach(&self, host: StateId) -> Attach {
        match self.accepting_states() {
            [state] if !self.has_outgoing(*state) => Attach::Fuse(host),
            _ => Attach::Link(host),
        }
    }

    /// Copy this fragment into the id range starting at `base`.
    ///
    /// Fused endpoints take the host id; every other state gets the next
    /// free id, in ascending order of its current id.
    fn graft(&self, base: StateId, entry: Attach, exit: Option<Attach>) -> Result<Graft<S>> {
        let initial = self.initial_state();
        let accepting = self.sole_accepting_state()?;
        // One state cannot become two different host states.
        let exit = match exit {
            Some(Attach::Fuse(host)) if accepting == initial => Some(Attach::Link(host)),
            exit => exit,
        };

        let mut relabelled: BTreeMap<StateId, StateId> = BTreeMap::new();
        if let Attach::Fuse(host) = entry {
            relabelled.insert(initial, host);
        }
        if let Some(Attach::Fuse(host)) = exit {
            relabelled.insert(accepting, host);
        }
        let mut next = base;
        for state in self.states() {
            if let Entry::Vacant(slot) = relabelled.entry(state) {
                slot.insert(next);
                next = successor(next)?;
            }
        }
        let map = |state: StateId| relabelled.get(&state).copied().unwrap_or(state);

        let mut transitions = Vec::with_capacity(self.transitions().len() + 2);
        if let Attach::Link(host) = entry {
            transitions.push(Transition::new(host, self.epsilon.clone(), map(initial)));
        }
        transitions.extend(self.transitions().iter().cloned().map(|mut t| {
            t.relabel(map);
            t
        }));
        if let Some(Attach::Link(host)) = exit {
            transitions.push(Transition::new(map(accepting), self.epsilon.clone(), host));
        }

        Ok(Graft {
            transitions,
            accepting: map(accepting),
            next,
        })
    }
}

impl<S: Epsilon> Nfa<S> {
    /// The two-state fragment for `symbol`, using the type's epsilon marker.
    pub fn new(symbol: S) -> Self {
        Self::symbol(symbol, S::EPSILON)
    }
}

impl<S: Symbol> Automaton<S> for Nfa<S> {
    fn graph(&self) -> &StateGraph<S> {
        &self.graph
    }

    /// Input symbols, epsilon excluded.
    fn alphabet(&self) -> BTreeSet<S> {
        let mut alphabet = self.graph.symbols();
        alphabet.retain(|s| !self.is_epsilon(s));
        alphabet
    }
}

impl<S: Symbol + fmt::Display> fmt::Display for Nfa<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.graph, f)
    }
}
