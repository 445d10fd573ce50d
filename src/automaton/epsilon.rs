//! Epsilon-NFAs and their reduction to plain NFAs.

use std::collections::HashSet;

use crate::regex::RegexNode;

use super::{Automaton, Fragment, Label, StateId};

/// An automaton that may contain epsilon transitions.
///
/// Every registered pattern hangs off a shared root state by an epsilon
/// edge, and the exit of its fragment accepts the pattern's rule.
#[derive(Debug, Clone)]
pub struct EpsilonNfa {
    automaton: Automaton,
    root: StateId,
}

impl Default for EpsilonNfa {
    fn default() -> Self {
        Self::new()
    }
}

impl EpsilonNfa {
    pub fn new() -> Self {
        let mut automaton = Automaton::new();
        let root = automaton.add_state();
        automaton.set_entry(root);
        Self { automaton, root }
    }

    pub fn root(&self) -> StateId {
        self.root
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Build `node`, attach it to the root and mark its exit as accepting `rule`.
    pub fn add_pattern(&mut self, node: &RegexNode, rule: u32) -> Fragment {
        let fragment = self.automaton.build(node);
        self.automaton.set_accept(fragment.exit, rule);
        self.automaton.add_transition(self.root, Label::Epsilon, fragment.entry);
        fragment
    }

    /// An equivalent automaton without epsilon transitions.
    ///
    /// Each state absorbs the transitions and accept markers of its epsilon
    /// closure. When several accepting states are absorbed the lowest rule
    /// index wins. Epsilon cycles are absorbed once and terminate.
    pub fn reduce(&self) -> Nfa {
        let mut work = self.automaton.clone();
        for source in work.reachable() {
            let mut absorbed = HashSet::from([source]);
            loop {
                let Some(edge) = work
                    .state(source)
                    .transitions()
                    .iter()
                    .find(|t| t.label == Label::Epsilon)
                    .copied()
                else {
                    break;
                };
                work.remove_transition(source, edge);
                if !absorbed.insert(edge.target) {
                    continue;
                }
                let target = work.state(edge.target).clone();
                work.merge_accept(source, target.accept());
                for t in target.transitions() {
                    if t.label == Label::Epsilon && absorbed.contains(&t.target) {
                        continue;
                    }
                    work.add_transition(source, t.label, t.target);
                }
            }
        }
        let automaton = work.compact();
        log::trace!(
            "epsilon reduction: {} states -> {}",
            self.automaton.len(),
            automaton.len()
        );
        Nfa { automaton }
    }
}

/// An automaton with no epsilon transitions. It may still branch on a byte.
#[derive(Debug, Clone)]
pub struct Nfa {
    automaton: Automaton,
}

impl Nfa {
    /// Wrap an epsilon-free automaton.
    ///
    /// # Panics
    ///
    /// Panics if `automaton` has an epsilon transition.
    pub fn from_automaton(automaton: Automaton) -> Self {
        assert!(!automaton.has_epsilon(), "NFA must not contain epsilon transitions");
        Self { automaton }
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }
}
