//! Thompson construction of epsilon-NFA fragments from pattern trees.

use crate::regex::RegexNode;

use super::{Automaton, Label, StateId};

/// The entry and exit of a sub-automaton built for one pattern node.
///
/// A fragment accepts exactly the byte strings that lead from `entry` to
/// `exit`. Accept markers are added by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub entry: StateId,
    pub exit: StateId,
}

impl Automaton {
    /// Add the states for `node` to this automaton and return their fragment.
    pub fn build(&mut self, node: &RegexNode) -> Fragment {
        match node {
            RegexNode::Literal(bytes) => self.build_literal(bytes),
            RegexNode::Sequence(children) => {
                let mut fragment: Option<Fragment> = None;
                for child in children {
                    let next = self.build(child);
                    fragment = Some(match fragment {
                        Some(prev) => {
                            self.add_transition(prev.exit, Label::Epsilon, next.entry);
                            Fragment {
                                entry: prev.entry,
                                exit: next.exit,
                            }
                        }
                        None => next,
                    });
                }
                fragment.unwrap_or_else(|| self.build_literal(&[]))
            }
            RegexNode::Alternation(children) => {
                let entry = self.add_state();
                let exit = self.add_state();
                for child in children {
                    let inner = self.build(child);
                    self.add_transition(entry, Label::Epsilon, inner.entry);
                    self.add_transition(inner.exit, Label::Epsilon, exit);
                }
                Fragment { entry, exit }
            }
            RegexNode::Optional(child) => self.build_optional(child),
            RegexNode::Repetition(child) => self.build_repetition(child),
            RegexNode::ZeroOrMore(child) => {
                let entry = self.add_state();
                let exit = self.add_state();
                let inner = self.build_repetition(child);
                self.add_transition(entry, Label::Epsilon, inner.entry);
                self.add_transition(entry, Label::Epsilon, exit);
                self.add_transition(inner.exit, Label::Epsilon, exit);
                Fragment { entry, exit }
            }
            RegexNode::Range(set) => {
                let entry = self.add_state();
                let exit = self.add_state();
                for byte in set.iter() {
                    self.add_transition(entry, Label::Byte(byte), exit);
                }
                Fragment { entry, exit }
            }
        }
    }

    fn build_literal(&mut self, bytes: &[u8]) -> Fragment {
        let entry = self.add_state();
        let mut exit = entry;
        for &byte in bytes {
            let next = self.add_state();
            self.add_transition(exit, Label::Byte(byte), next);
            exit = next;
        }
        Fragment { entry, exit }
    }

    // The skip edge lands on a fresh exit, never on the child's own exit,
    // which may carry a repetition back-edge.
    fn build_optional(&mut self, child: &RegexNode) -> Fragment {
        let entry = self.add_state();
        let exit = self.add_state();
        let inner = self.build(child);
        self.add_transition(entry, Label::Epsilon, inner.entry);
        self.add_transition(entry, Label::Epsilon, exit);
        self.add_transition(inner.exit, Label::Epsilon, exit);
        Fragment { entry, exit }
    }

    fn build_repetition(&mut self, child: &RegexNode) -> Fragment {
        let inner = self.build(child);
        self.add_transition(inner.exit, Label::Epsilon, inner.entry);
        inner
    }
}
