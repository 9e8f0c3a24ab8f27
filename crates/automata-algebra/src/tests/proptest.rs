use crate::{Automaton, Dfa, Nfa, Result};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Small regular expressions over `{a, b}`, compiled through the algebra and
/// checked against a direct backtracking matcher.
#[derive(Debug, Clone)]
enum Expr {
    Lit(char),
    Concat(Box<Expr>, Box<Expr>),
    Alt(Box<Expr>, Box<Expr>),
    Star(Box<Expr>),
}

impl Expr {
    fn compile(&self) -> Result<Nfa<char>> {
        match self {
            Expr::Lit(c) => Ok(Nfa::new(*c)),
            Expr::Concat(lhs, rhs) => lhs.compile()?.and(&rhs.compile()?),
            Expr::Alt(lhs, rhs) => lhs.compile()?.or(&rhs.compile()?),
            Expr::Star(inner) => inner.compile()?.star(),
        }
    }

    /// Every position a match starting at `start` can end at.
    fn ends(&self, input: &[char], start: usize) -> BTreeSet<usize> {
        match self {
            Expr::Lit(c) => match input.get(start) {
                Some(found) if found == c => BTreeSet::from([start + 1]),
                _ => BTreeSet::new(),
            },
            Expr::Concat(lhs, rhs) => lhs
                .ends(input, start)
                .into_iter()
                .flat_map(|mid| rhs.ends(input, mid))
                .collect(),
            Expr::Alt(lhs, rhs) => {
                let mut ends = lhs.ends(input, start);
                ends.extend(rhs.ends(input, start));
                ends
            }
            Expr::Star(inner) => {
                let mut ends = BTreeSet::from([start]);
                let mut frontier = vec![start];
                while let Some(position) = frontier.pop() {
                    for end in inner.ends(input, position) {
                        if ends.insert(end) {
                            frontier.push(end);
                        }
                    }
                }
                ends
            }
        }
    }

    fn matches(&self, input: &[char]) -> bool {
        self.ends(input, 0).contains(&input.len())
    }

    /// Replace every literal `symbol` with `replacement`.
    fn substitute(&self, symbol: char, replacement: &Expr) -> Expr {
        match self {
            Expr::Lit(c) if *c == symbol => replacement.clone(),
            Expr::Lit(c) => Expr::Lit(*c),
            Expr::Concat(lhs, rhs) => Expr::Concat(
                Box::new(lhs.substitute(symbol, replacement)),
                Box::new(rhs.substitute(symbol, replacement)),
            ),
            Expr::Alt(lhs, rhs) => Expr::Alt(
                Box::new(lhs.substitute(symbol, replacement)),
                Box::new(rhs.substitute(symbol, replacement)),
            ),
            Expr::Star(inner) => Expr::Star(Box::new(inner.substitute(symbol, replacement))),
        }
    }
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![Just('a'), Just('b')].prop_map(Expr::Lit);

    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(lhs, rhs)| Expr::Concat(Box::new(lhs), Box::new(rhs))),
            (inner.clone(), inner.clone())
                .prop_map(|(lhs, rhs)| Expr::Alt(Box::new(lhs), Box::new(rhs))),
            inner.prop_map(|e| Expr::Star(Box::new(e))),
        ]
    })
}

/// Every string over `{a, b}` up to length 5.
fn inputs() -> Vec<Vec<char>> {
    let mut all = vec![Vec::new()];
    let mut layer = vec![Vec::new()];
    for _ in 0..5 {
        layer = layer
            .iter()
            .flat_map(|prefix: &Vec<char>| {
                ['a', 'b'].map(|c| {
                    let mut word = prefix.clone();
                    word.push(c);
                    word
                })
            })
            .collect();
        all.extend(layer.iter().cloned());
    }
    all
}

fn run(dfa: &Dfa<char>, input: &[char]) -> bool {
    let mut state = dfa.initial_state();
    for c in input {
        match dfa.next_state(state, c) {
            Some(next) => state = next,
            None => return false,
        }
    }
    dfa.is_accepting(state)
}

fn language(nfa: &Nfa<char>) -> Vec<bool> {
    let dfa = Dfa::from_nfa(nfa);
    inputs().iter().map(|input| run(&dfa, input)).collect()
}

proptest! {
    #[test]
    fn dfa_matches_expression(e in arb_expr()) {
        let dfa = Dfa::from_nfa(&e.compile().unwrap());
        for input in inputs() {
            prop_assert_eq!(run(&dfa, &input), e.matches(&input), "input {:?}", input);
        }
    }

    #[test]
    fn concatenation_is_associative(a in arb_expr(), b in arb_expr(), c in arb_expr()) {
        let (a, b, c) = (a.compile().unwrap(), b.compile().unwrap(), c.compile().unwrap());
        let left = a.and(&b).unwrap().and(&c).unwrap();
        let right = a.and(&b.and(&c).unwrap()).unwrap();
        prop_assert_eq!(language(&left), language(&right));
    }

    #[test]
    fn alternation_is_commutative(a in arb_expr(), b in arb_expr()) {
        let (a, b) = (a.compile().unwrap(), b.compile().unwrap());
        prop_assert_eq!(language(&a.or(&b).unwrap()), language(&b.or(&a).unwrap()));
    }

    #[test]
    fn star_is_idempotent(a in arb_expr()) {
        let star = a.compile().unwrap().star().unwrap();
        prop_assert_eq!(language(&star.star().unwrap()), language(&star));
    }

    #[test]
    fn operators_keep_single_accepting_state(a in arb_expr(), b in arb_expr()) {
        let (a, b) = (a.compile().unwrap(), b.compile().unwrap());
        for nfa in [a.and(&b).unwrap(), a.or(&b).unwrap(), a.star().unwrap()] {
            prop_assert_eq!(nfa.accepting_states().len(), 1);
        }
    }

    #[test]
    fn offset_round_trip(e in arb_expr(), k in 0u32..64) {
        let original = e.compile().unwrap();
        let mut shifted = original.clone();
        shifted.offset_states(k).unwrap();
        prop_assert_eq!(shifted.initial_state(), k);
        prop_assert_eq!(shifted.states().len(), original.states().len());

        shifted.offset_states(original.initial_state()).unwrap();
        prop_assert_eq!(shifted, original);
    }

    #[test]
    fn closure_contains_state(e in arb_expr()) {
        let nfa = e.compile().unwrap();
        for state in nfa.states() {
            prop_assert!(nfa.closure(state).contains(state));
        }
    }

    #[test]
    fn subset_construction_is_deterministic(e in arb_expr()) {
        let nfa = e.compile().unwrap();
        prop_assert_eq!(Dfa::from_nfa(&nfa), Dfa::from_nfa(&nfa));
    }

    #[test]
    fn replacement_matches_substitution(e in arb_expr(), r in arb_expr()) {
        let expanded = e
            .compile()
            .unwrap()
            .replace_transitions(&'a', &r.compile().unwrap())
            .unwrap();
        let expected = e.substitute('a', &r);

        let dfa = Dfa::from_nfa(&expanded);
        for input in inputs() {
            prop_assert_eq!(run(&dfa, &input), expected.matches(&input), "input {:?}", input);
        }
    }
}
