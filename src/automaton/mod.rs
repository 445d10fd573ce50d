//! Automaton graphs and the compilation pipeline.
//!
//! States live in an arena and are referred to by dense [`StateId`]s. Each
//! phase produces a fresh arena and never mutates its input:
//!
//! ```text
//! RegexNode --build--> EpsilonNfa --reduce--> Nfa --determinize--> Dfa --minimize--> Dfa
//! ```

use std::collections::VecDeque;
use std::fmt;

use itertools::Itertools;

use crate::regex::ByteSet;

pub mod determinize;
pub mod dfa;
pub mod epsilon;
pub mod minimize;
pub mod thompson;

pub use dfa::{Dfa, ScanResult};
pub use epsilon::{EpsilonNfa, Nfa};
pub use thompson::Fragment;

/// Index of a state within its automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transition label. `Epsilon` sorts before every byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Epsilon,
    Byte(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition {
    pub label: Label,
    pub target: StateId,
}

/// One automaton state: its outgoing transitions and the rule it accepts, if any.
///
/// The accept value is the rule's registration index; lower wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    transitions: Vec<Transition>,
    accept: Option<u32>,
}

impl State {
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn accept(&self) -> Option<u32> {
        self.accept
    }

    pub fn is_accepting(&self) -> bool {
        self.accept.is_some()
    }
}

/// Keep the higher-priority (numerically smaller) of two accept markers.
pub fn min_accept(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// A mutable directed multigraph of states with byte or epsilon labels.
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    states: Vec<State>,
    entry: Option<StateId>,
}

impl Automaton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self) -> StateId {
        let id = StateId(u32::try_from(self.states.len()).unwrap_or(u32::MAX));
        self.states.push(State::default());
        id
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states
            .iter()
            .enumerate()
            .map(|(idx, state)| (StateId(idx as u32), state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The entry state. State 0 unless set explicitly.
    pub fn entry(&self) -> StateId {
        self.entry.unwrap_or(StateId(0))
    }

    pub fn set_entry(&mut self, id: StateId) {
        self.entry = Some(id);
    }

    /// Add a transition unless an identical one already exists.
    pub fn add_transition(&mut self, from: StateId, label: Label, to: StateId) {
        let transition = Transition { label, target: to };
        let transitions = &mut self.states[from.index()].transitions;
        if !transitions.contains(&transition) {
            transitions.push(transition);
        }
    }

    /// Remove a transition that is known to exist.
    ///
    /// # Panics
    ///
    /// Panics if `from` has no such transition.
    pub fn remove_transition(&mut self, from: StateId, transition: Transition) {
        let transitions = &mut self.states[from.index()].transitions;
        let Some(idx) = transitions.iter().position(|t| *t == transition) else {
            panic!("tried to remove a nonexistent transition {from} -> {}", transition.target);
        };
        transitions.remove(idx);
    }

    pub fn set_accept(&mut self, id: StateId, rule: u32) {
        self.states[id.index()].accept = Some(rule);
    }

    /// Fold another accept marker into `id`, keeping the smaller rule index.
    pub fn merge_accept(&mut self, id: StateId, rule: Option<u32>) {
        let state = &mut self.states[id.index()];
        state.accept = min_accept(state.accept, rule);
    }

    pub fn sort_transitions(&mut self) {
        for state in &mut self.states {
            state.transitions.sort();
        }
    }

    /// States reachable from the entry, in breadth-first order.
    pub fn reachable(&self) -> Vec<StateId> {
        if self.states.is_empty() {
            return Vec::new();
        }
        let mut seen = vec![false; self.states.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([self.entry()]);
        seen[self.entry().index()] = true;
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for transition in self.state(id).transitions() {
                let target = transition.target;
                if !seen[target.index()] {
                    seen[target.index()] = true;
                    queue.push_back(target);
                }
            }
        }
        order
    }

    /// A copy holding only the reachable states, renumbered in breadth-first
    /// order so that the entry becomes state 0.
    pub fn compact(&self) -> Automaton {
        let order = self.reachable();
        let mut renumber = vec![None; self.states.len()];
        for (new_idx, old) in order.iter().enumerate() {
            renumber[old.index()] = Some(StateId(new_idx as u32));
        }
        let states = order
            .iter()
            .map(|old| {
                let state = self.state(*old);
                State {
                    transitions: state
                        .transitions
                        .iter()
                        .filter_map(|t| {
                            renumber[t.target.index()].map(|target| Transition {
                                label: t.label,
                                target,
                            })
                        })
                        .collect(),
                    accept: state.accept,
                }
            })
            .collect();
        Automaton {
            states,
            entry: Some(StateId(0)),
        }
    }

    pub fn has_epsilon(&self) -> bool {
        self.states
            .iter()
            .flat_map(|state| &state.transitions)
            .any(|t| t.label == Label::Epsilon)
    }

    /// True when no reachable state has an epsilon transition or two
    /// transitions on the same byte.
    pub fn is_deterministic(&self) -> bool {
        self.reachable().into_iter().all(|id| {
            let mut labels = self.state(id).transitions().iter().map(|t| t.label);
            !labels.clone().any(|label| label == Label::Epsilon) && labels.all_unique()
        })
    }

    /// Graphviz rendering of the reachable part of the automaton.
    pub fn dot(&self) -> Dot<'_> {
        Dot { automaton: self }
    }
}

/// Display adapter produced by [`Automaton::dot`].
pub struct Dot<'a> {
    automaton: &'a Automaton,
}

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph {{")?;
        for id in self.automaton.reachable() {
            let state = self.automaton.state(id);
            match state.accept() {
                Some(rule) => writeln!(f, "  {id} [shape=doublecircle, label=\"{id}({rule})\"]")?,
                None => writeln!(f, "  {id} [shape=circle]")?,
            }
            let by_target = state
                .transitions()
                .iter()
                .sorted_by_key(|t| (t.target, t.label))
                .chunk_by(|t| t.target);
            for (target, edges) in &by_target {
                let mut epsilon = false;
                let mut bytes = ByteSet::empty();
                for edge in edges {
                    match edge.label {
                        Label::Epsilon => epsilon = true,
                        Label::Byte(byte) => bytes.insert(byte),
                    }
                }
                writeln!(f, "  {id} -> {target} [label=\"{}\"]", edge_label(epsilon, &bytes))?;
            }
        }
        writeln!(f, "}}")
    }
}

fn edge_label(epsilon: bool, bytes: &ByteSet) -> String {
    let mut label = String::new();
    if epsilon {
        label.push('ϵ');
    }
    for (lo, hi) in bytes.ranges() {
        label.push_str(&dot_byte(lo));
        if hi > lo {
            label.push('-');
            label.push_str(&dot_byte(hi));
        }
    }
    label
}

fn dot_byte(byte: u8) -> String {
    match byte {
        b'"' => "\\\"".to_string(),
        b'\\' => "\\\\".to_string(),
        0x21..=0x7e => (byte as char).to_string(),
        _ => format!("\\\\x{byte:02x}"),
    }
}
