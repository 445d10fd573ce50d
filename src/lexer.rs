//! Multi-state lexer generator.
//!
//! A [`LexerGenerator`] holds one [`Matcher`] per lexer state. Only one
//! state is active at a time; switching state is a pointer change. The
//! `INITIAL` state is mandatory and is active as soon as it is added.

use log::debug;

use crate::matcher::{MatchOutcome, Matcher};
use crate::tables::StateTables;

mod scanner;

pub use scanner::{ScanError, Scanner};

/// Name of the default lexer state.
pub const INITIAL: &str = "INITIAL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    DuplicateState(String),
    UnknownState(String),
    /// No `INITIAL` state has been added.
    MissingInitial,
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateState(name) => write!(f, "Lexer state {name:?} already exists"),
            Self::UnknownState(name) => write!(f, "Unknown lexer state {name:?}"),
            Self::MissingInitial => write!(f, "No {INITIAL} lexer state"),
        }
    }
}

impl std::error::Error for LexerError {}

#[derive(Debug, Clone, Default)]
pub struct LexerGenerator {
    states: Vec<(String, Matcher)>,
    current: Option<usize>,
}

impl LexerGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state_matcher(
        &mut self,
        name: impl Into<String>,
        matcher: Matcher,
    ) -> Result<(), LexerError> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(LexerError::DuplicateState(name));
        }
        debug!("lexer state {name} with {} rules", matcher.rules().len());
        if name == INITIAL {
            self.current = Some(self.states.len());
        }
        self.states.push((name, matcher));
        Ok(())
    }

    /// Make `name` the active state.
    pub fn set_state(&mut self, name: &str) -> Result<(), LexerError> {
        let idx = self
            .position(name)
            .ok_or_else(|| LexerError::UnknownState(name.to_string()))?;
        debug!("switching lexer state to {name}");
        self.current = Some(idx);
        Ok(())
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.map(|idx| self.states[idx].0.as_str())
    }

    /// State names in the order they were added.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|(name, _)| name.as_str())
    }

    pub fn matcher(&self, name: &str) -> Option<&Matcher> {
        self.position(name).map(|idx| &self.states[idx].1)
    }

    pub fn matcher_mut(&mut self, name: &str) -> Option<&mut Matcher> {
        self.position(name).map(|idx| &mut self.states[idx].1)
    }

    /// Compile every state's matcher.
    pub fn compile(&mut self) {
        for (_, matcher) in &mut self.states {
            matcher.compile();
        }
    }

    /// Match at `pos` with the active state's matcher.
    pub fn find<'i>(&mut self, input: &'i [u8], pos: usize) -> Result<MatchOutcome<'i>, LexerError> {
        let idx = self.current.ok_or(LexerError::MissingInitial)?;
        Ok(self.states[idx].1.find(input, pos))
    }

    /// Tables for every state, in the order the states were added.
    pub fn export(&mut self) -> Result<Vec<StateTables>, LexerError> {
        if self.position(INITIAL).is_none() {
            return Err(LexerError::MissingInitial);
        }
        Ok(self
            .states
            .iter_mut()
            .map(|(name, matcher)| StateTables {
                state: name.clone(),
                rule_names: matcher.rules().iter().map(|r| r.name().to_string()).collect(),
                actions: matcher
                    .rules()
                    .iter()
                    .map(|r| r.action().map(str::to_string))
                    .collect(),
                tables: matcher.tables(),
            })
            .collect())
    }

    /// Tokenize `input` from the start, beginning in the active state.
    pub fn scanner<'g, 'i>(&'g mut self, input: &'i [u8]) -> Scanner<'g, 'i> {
        Scanner::new(self, input)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|(state, _)| state == name)
    }
}

#[cfg(test)]
mod tests;
