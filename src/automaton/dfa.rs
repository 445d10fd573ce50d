//! Frozen deterministic automata and longest-match scanning.

use super::{Automaton, Dot, Label, StateId};
use crate::tables::Tables;

/// Outcome of running a DFA from one input position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    /// The longest accepted prefix ends at `end`; `rule` is its accept index.
    Accept { rule: u32, end: usize },
    /// Input remains but no prefix of it is accepted.
    NoMatch,
    /// The position is at or past the end of the input.
    Eof,
}

/// A deterministic automaton.
///
/// States are numbered densely in breadth-first order from the entry, which
/// is state 0, and each state's transitions are sorted by byte.
#[derive(Debug, Clone)]
pub struct Dfa {
    automaton: Automaton,
}

impl Dfa {
    /// Freeze a deterministic automaton.
    ///
    /// # Panics
    ///
    /// Panics if `automaton` has an epsilon transition or branches on a byte.
    pub fn from_automaton(automaton: &Automaton) -> Self {
        assert!(
            automaton.is_deterministic(),
            "DFA must have no epsilon transitions and at most one transition per byte"
        );
        let mut automaton = automaton.compact();
        automaton.sort_transitions();
        Self { automaton }
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn len(&self) -> usize {
        self.automaton.len()
    }

    pub fn is_empty(&self) -> bool {
        self.automaton.is_empty()
    }

    pub fn entry(&self) -> StateId {
        self.automaton.entry()
    }

    /// The state reached from `state` on `byte`, if any.
    pub fn next(&self, state: StateId, byte: u8) -> Option<StateId> {
        let transitions = self.automaton.state(state).transitions();
        transitions
            .binary_search_by(|t| t.label.cmp(&Label::Byte(byte)))
            .ok()
            .map(|idx| transitions[idx].target)
    }

    pub fn accept(&self, state: StateId) -> Option<u32> {
        self.automaton.state(state).accept()
    }

    /// Longest-match scan of `input` starting at `pos`.
    ///
    /// The walk stops at the first byte without a transition or at the end
    /// of input. The last accepting state reached wins. The entry state's
    /// own accept marker is not consulted, so an empty match is never
    /// reported.
    pub fn find(&self, input: &[u8], pos: usize) -> ScanResult {
        if pos >= input.len() {
            return ScanResult::Eof;
        }
        if self.is_empty() {
            return ScanResult::NoMatch;
        }
        let mut state = self.entry();
        let mut best = ScanResult::NoMatch;
        for (offset, &byte) in input[pos..].iter().enumerate() {
            let Some(next) = self.next(state, byte) else {
                break;
            };
            state = next;
            if let Some(rule) = self.accept(state) {
                best = ScanResult::Accept {
                    rule,
                    end: pos + offset + 1,
                };
            }
        }
        best
    }

    /// Dense transition table and accept vector.
    pub fn tables(&self) -> Tables {
        Tables::from_dfa(self)
    }

    pub fn dot(&self) -> Dot<'_> {
        self.automaton.dot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `ab` accepts 0, `abcd` accepts 1.
    fn sample() -> Dfa {
        let mut a = Automaton::new();
        let ids: Vec<StateId> = (0..5).map(|_| a.add_state()).collect();
        a.set_entry(ids[0]);
        for (idx, byte) in b"abcd".iter().enumerate() {
            a.add_transition(ids[idx], Label::Byte(*byte), ids[idx + 1]);
        }
        a.set_accept(ids[2], 0);
        a.set_accept(ids[4], 1);
        Dfa::from_automaton(&a)
    }

    #[test]
    fn test_find_prefers_the_longest_accept() {
        let dfa = sample();
        assert_eq!(dfa.find(b"abcd", 0), ScanResult::Accept { rule: 1, end: 4 });
    }

    #[test]
    fn test_find_falls_back_to_an_earlier_accept() {
        let dfa = sample();
        assert_eq!(dfa.find(b"abcx", 0), ScanResult::Accept { rule: 0, end: 2 });
        assert_eq!(dfa.find(b"abc", 0), ScanResult::Accept { rule: 0, end: 2 });
    }

    #[test]
    fn test_find_reports_no_match_and_eof() {
        let dfa = sample();
        assert_eq!(dfa.find(b"a", 0), ScanResult::NoMatch);
        assert_eq!(dfa.find(b"zab", 0), ScanResult::NoMatch);
        assert_eq!(dfa.find(b"ab", 2), ScanResult::Eof);
        assert_eq!(dfa.find(b"", 0), ScanResult::Eof);
    }

    #[test]
    fn test_empty_dfa_matches_nothing() {
        let dfa = Dfa::from_automaton(&Automaton::new());
        assert!(dfa.is_empty());
        assert_eq!(dfa.find(b"a", 0), ScanResult::NoMatch);
        assert_eq!(dfa.find(b"", 0), ScanResult::Eof);
    }

    #[test]
    fn test_find_starts_at_offset() {
        let dfa = sample();
        assert_eq!(dfa.find(b"xxab", 2), ScanResult::Accept { rule: 0, end: 4 });
    }

    #[test]
    fn test_next_uses_sorted_transitions() {
        let mut a = Automaton::new();
        let s0 = a.add_state();
        let s1 = a.add_state();
        let s2 = a.add_state();
        a.add_transition(s0, Label::Byte(b'z'), s1);
        a.add_transition(s0, Label::Byte(b'a'), s2);
        let dfa = Dfa::from_automaton(&a);
        let z = dfa.next(dfa.entry(), b'z').unwrap();
        let first = dfa.next(dfa.entry(), b'a').unwrap();
        assert_ne!(z, first);
        assert_eq!(dfa.next(dfa.entry(), b'm'), None);
    }

    #[test]
    #[should_panic(expected = "at most one transition per byte")]
    fn test_nondeterministic_input_panics() {
        let mut a = Automaton::new();
        let s0 = a.add_state();
        let s1 = a.add_state();
        a.add_transition(s0, Label::Byte(b'a'), s0);
        a.add_transition(s0, Label::Byte(b'a'), s1);
        let _ = Dfa::from_automaton(&a);
    }
}
