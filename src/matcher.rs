//! Rule tables and longest-match scanning over one compiled DFA.

use std::sync::Arc;

use log::{debug, trace};

use crate::automaton::{Dfa, EpsilonNfa, Fragment, ScanResult};
use crate::regex::{ParseOptions, RegexError, RegexNode, parse};
use crate::tables::Tables;

/// A registered rule. Its index is its priority; lower wins.
#[derive(Debug, Clone)]
pub struct Rule {
    name: Arc<str>,
    index: u32,
    pattern: RegexNode,
    fragment: Fragment,
    action: Option<String>,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn pattern(&self) -> &RegexNode {
        &self.pattern
    }

    /// Where the rule's states sit in the matcher's epsilon-NFA.
    pub fn fragment(&self) -> Fragment {
        self.fragment
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

/// One matched token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'i> {
    pub rule: Arc<str>,
    /// Registration index of the rule.
    pub index: u32,
    pub bytes: &'i [u8],
    pub start: usize,
    /// Position just past the match, where the next scan starts.
    pub end: usize,
}

/// Result of [`Matcher::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'i> {
    Matched(Token<'i>),
    NoMatch,
    Eof,
}

#[derive(Debug, Clone)]
enum Compilation {
    Uncompiled,
    Compiled(Dfa),
}

/// A prioritized set of rules sharing one automaton.
///
/// The DFA is built on first use and cached. Registering a rule drops the
/// cache.
#[derive(Debug, Clone)]
pub struct Matcher {
    rules: Vec<Rule>,
    enfa: EpsilonNfa,
    compilation: Compilation,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            enfa: EpsilonNfa::new(),
            compilation: Compilation::Uncompiled,
        }
    }

    /// Add a rule after all existing ones and return its index.
    pub fn register_rule(
        &mut self,
        name: impl Into<String>,
        pattern: RegexNode,
        action: Option<String>,
    ) -> u32 {
        let name: Arc<str> = Arc::from(name.into());
        let index = u32::try_from(self.rules.len()).unwrap_or(u32::MAX);
        let fragment = self.enfa.add_pattern(&pattern, index);
        debug!("rule {index} {name} => {pattern}");
        self.rules.push(Rule {
            name,
            index,
            pattern,
            fragment,
            action,
        });
        self.invalidate();
        index
    }

    /// Parse `pattern` and register it.
    pub fn register_pattern(
        &mut self,
        name: impl Into<String>,
        pattern: &str,
        options: &ParseOptions,
    ) -> Result<u32, RegexError> {
        let node = parse(pattern, options)?;
        Ok(self.register_rule(name, node, None))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, index: u32) -> Option<&Rule> {
        self.rules.get(index as usize)
    }

    pub fn epsilon_nfa(&self) -> &EpsilonNfa {
        &self.enfa
    }

    pub fn invalidate(&mut self) {
        self.compilation = Compilation::Uncompiled;
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.compilation, Compilation::Compiled(_))
    }

    /// The cached DFA, if compiled.
    pub fn dfa(&self) -> Option<&Dfa> {
        match &self.compilation {
            Compilation::Compiled(dfa) => Some(dfa),
            Compilation::Uncompiled => None,
        }
    }

    /// Compile now if needed and return the minimized DFA.
    pub fn compile(&mut self) -> &Dfa {
        if let Compilation::Uncompiled = self.compilation {
            self.compilation = Compilation::Compiled(self.build());
        }
        match &self.compilation {
            Compilation::Compiled(dfa) => dfa,
            Compilation::Uncompiled => unreachable!("matcher was compiled above"),
        }
    }

    fn build(&self) -> Dfa {
        let enfa = self.enfa.automaton();
        trace!("epsilon-NFA:\n{}", enfa.dot());
        let nfa = self.enfa.reduce();
        trace!("NFA:\n{}", nfa.automaton().dot());
        let dfa = nfa.determinize();
        trace!("DFA:\n{}", dfa.dot());
        let minimal = dfa.minimize();
        trace!("minimized DFA:\n{}", minimal.dot());
        debug!(
            "compiled {} rules: epsilon-NFA {} states, NFA {}, DFA {}, minimized {}",
            self.rules.len(),
            enfa.len(),
            nfa.automaton().len(),
            dfa.len(),
            minimal.len()
        );
        minimal
    }

    /// The longest match at `pos`, with ties going to the earliest rule.
    pub fn find<'i>(&mut self, input: &'i [u8], pos: usize) -> MatchOutcome<'i> {
        let result = self.compile().find(input, pos);
        match result {
            ScanResult::Eof => MatchOutcome::Eof,
            ScanResult::NoMatch => MatchOutcome::NoMatch,
            ScanResult::Accept { rule, end } => MatchOutcome::Matched(Token {
                rule: self.rules[rule as usize].name.clone(),
                index: rule,
                bytes: &input[pos..end],
                start: pos,
                end,
            }),
        }
    }

    pub fn tables(&mut self) -> Tables {
        self.compile().tables()
    }
}
