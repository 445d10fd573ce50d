//! Dense scanner tables for code generators.

use std::fmt;

use crate::automaton::{Dfa, Label, ScanResult};

/// A transition matrix with one row of 256 entries per state, and an accept
/// vector.
///
/// A transition entry equal to the state count means "no transition". An
/// accept entry of `-1` means the state does not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub transitions: Vec<[u32; 256]>,
    pub accept: Vec<i32>,
}

impl Tables {
    pub fn from_dfa(dfa: &Dfa) -> Self {
        let count = dfa.len();
        let sentinel = count as u32;
        let mut transitions = vec![[sentinel; 256]; count];
        let mut accept = vec![-1; count];
        for (id, state) in dfa.automaton().states() {
            for t in state.transitions() {
                if let Label::Byte(byte) = t.label {
                    transitions[id.index()][usize::from(byte)] = t.target.index() as u32;
                }
            }
            if let Some(rule) = state.accept() {
                accept[id.index()] = rule as i32;
            }
        }
        Self {
            transitions,
            accept,
        }
    }

    pub fn state_count(&self) -> usize {
        self.accept.len()
    }

    /// The no-transition marker.
    pub fn sentinel(&self) -> u32 {
        self.state_count() as u32
    }

    pub fn next(&self, state: usize, byte: u8) -> Option<usize> {
        let target = self.transitions[state][usize::from(byte)];
        (target != self.sentinel()).then_some(target as usize)
    }

    pub fn accept(&self, state: usize) -> Option<u32> {
        u32::try_from(self.accept[state]).ok()
    }

    /// Longest-match scan driven by the tables alone. Agrees with
    /// [`Dfa::find`] for the DFA the tables were built from.
    pub fn find(&self, input: &[u8], pos: usize) -> ScanResult {
        if pos >= input.len() {
            return ScanResult::Eof;
        }
        if self.state_count() == 0 {
            return ScanResult::NoMatch;
        }
        let mut state = 0;
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
}

/// Prints `states N`, then the accept vector, then one row per state.
impl fmt::Display for Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "states {}", self.state_count())?;
        write!(f, "accept")?;
        for accept in &self.accept {
            write!(f, " {accept}")?;
        }
        writeln!(f)?;
        for (idx, row) in self.transitions.iter().enumerate() {
            write!(f, "{idx}:")?;
            for target in row {
                write!(f, " {target}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Everything exported for one lexer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTables {
    pub state: String,
    /// Rule names indexed by accept value.
    pub rule_names: Vec<String>,
    /// Rule actions indexed by accept value.
    pub actions: Vec<Option<String>>,
    pub tables: Tables,
}

impl fmt::Display for StateTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "state {}", self.state)?;
        for (idx, name) in self.rule_names.iter().enumerate() {
            match self.actions.get(idx).and_then(Option::as_deref) {
                Some(action) => writeln!(f, "rule {idx} {name} => {action}")?,
                None => writeln!(f, "rule {idx} {name}")?,
            }
        }
        write!(f, "{}", self.tables)
    }
}
