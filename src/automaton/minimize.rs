//! DFA minimization by pairwise distinguishability.

use super::{Automaton, Dfa, StateId};

/// Symmetric table of state pairs known to be distinguishable.
struct Pairs {
    len: usize,
    marked: Vec<bool>,
}

impl Pairs {
    fn new(len: usize) -> Self {
        Self {
            len,
            marked: vec![false; len * len],
        }
    }

    fn get(&self, a: usize, b: usize) -> bool {
        self.marked[a * self.len + b]
    }

    fn mark(&mut self, a: usize, b: usize) {
        self.marked[a * self.len + b] = true;
        self.marked[b * self.len + a] = true;
    }
}

impl Dfa {
    /// The minimal equivalent DFA.
    ///
    /// Two states are distinguishable if their accept markers differ, if
    /// their sorted transition lists differ in length or labels, or if any
    /// pair of targets is distinguishable. Marking repeats until nothing
    /// changes. Each class of equivalent states collapses onto its earliest
    /// member.
    pub fn minimize(&self) -> Dfa {
        let automaton = self.automaton();
        let len = automaton.len();
        let state = |idx: usize| automaton.state(StateId(idx as u32));

        let mut pairs = Pairs::new(len);
        for a in 0..len {
            for b in (a + 1)..len {
                if state(a).accept() != state(b).accept() {
                    pairs.mark(a, b);
                }
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for a in 0..len {
                for b in (a + 1)..len {
                    if pairs.get(a, b) {
                        continue;
                    }
                    let lhs = state(a).transitions();
                    let rhs = state(b).transitions();
                    let distinct = lhs.len() != rhs.len()
                        || lhs.iter().zip(rhs).any(|(l, r)| {
                            l.label != r.label
                                || (l.target != r.target
                                    && pairs.get(l.target.index(), r.target.index()))
                        });
                    if distinct {
                        pairs.mark(a, b);
                        changed = true;
                    }
                }
            }
        }

        let representative: Vec<usize> = (0..len)
            .map(|b| (0..b).find(|a| !pairs.get(*a, b)).unwrap_or(b))
            .collect();

        let mut minimal = Automaton::new();
        for _ in 0..len {
            minimal.add_state();
        }
        for (idx, rep) in representative.iter().enumerate() {
            if *rep != idx {
                continue;
            }
            let id = StateId(idx as u32);
            if let Some(rule) = state(idx).accept() {
                minimal.set_accept(id, rule);
            }
            for t in state(idx).transitions() {
                let target = StateId(representative[t.target.index()] as u32);
                minimal.add_transition(id, t.label, target);
            }
        }
        if len > 0 {
            minimal.set_entry(StateId(representative[automaton.entry().index()] as u32));
        }

        let minimal = Dfa::from_automaton(&minimal);
        log::trace!("minimization: {} states -> {}", len, minimal.len());
        minimal
    }
}
