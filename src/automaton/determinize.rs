//! Subset construction.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::{Automaton, Dfa, Label, Nfa, StateId, min_accept};

impl Nfa {
    /// An equivalent deterministic automaton.
    ///
    /// Each DFA state stands for a set of NFA states. Sets are memoized by
    /// exact membership so each one is created once, and only sets reachable
    /// from the entry are built. A combined state accepts the lowest rule
    /// index among its members.
    pub fn determinize(&self) -> Dfa {
        let nfa = self.automaton();
        let mut dfa = Automaton::new();
        let mut memo: HashMap<Vec<StateId>, StateId> = HashMap::new();
        let mut queue: VecDeque<(Vec<StateId>, StateId)> = VecDeque::new();

        if !nfa.is_empty() {
            let start = vec![nfa.entry()];
            let entry = dfa.add_state();
            dfa.set_entry(entry);
            memo.insert(start.clone(), entry);
            queue.push_back((start, entry));
        }

        while let Some((members, id)) = queue.pop_front() {
            let mut by_byte: BTreeMap<u8, BTreeSet<StateId>> = BTreeMap::new();
            let mut accept = None;
            for member in &members {
                let state = nfa.state(*member);
                accept = min_accept(accept, state.accept());
                for t in state.transitions() {
                    let Label::Byte(byte) = t.label else {
                        panic!("cannot determinize a state with an epsilon transition");
                    };
                    by_byte.entry(byte).or_default().insert(t.target);
                }
            }
            if let Some(rule) = accept {
                dfa.set_accept(id, rule);
            }
            for (byte, targets) in by_byte {
                let key: Vec<StateId> = targets.into_iter().collect();
                let target = match memo.get(&key) {
                    Some(existing) => *existing,
                    None => {
                        let created = dfa.add_state();
                        memo.insert(key.clone(), created);
                        queue.push_back((key, created));
                        created
                    }
                };
                dfa.add_transition(id, Label::Byte(byte), target);
            }
        }

        log::trace!("subset construction: {} states -> {}", nfa.len(), dfa.len());
        Dfa::from_automaton(&dfa)
    }
}
