//! A table-driven lexical analyzer generator.
//!
//! Named rules are compiled per lexer state into one minimized DFA, and
//! scanning reports the longest match, with ties going to the rule
//! registered first.
//!
//! # Example
//!
//! ```rust
//! use lexgen::{INITIAL, LexerGenerator, MatchOutcome, Matcher, ParseOptions};
//!
//! let options = ParseOptions::default();
//! let mut matcher = Matcher::new();
//! matcher.register_pattern("kw", "if", &options).unwrap();
//! matcher.register_pattern("id", "[a-zA-Z_][a-zA-Z_0-9]*", &options).unwrap();
//! matcher.register_pattern("space", "[ \\t]+", &options).unwrap();
//!
//! let mut lexer = LexerGenerator::new();
//! lexer.add_state_matcher(INITIAL, matcher).unwrap();
//!
//! let Ok(MatchOutcome::Matched(token)) = lexer.find(b"if iffy", 0) else {
//!     panic!("expected a token");
//! };
//! assert_eq!((&*token.rule, token.bytes, token.end), ("kw", &b"if"[..], 2));
//!
//! let rules: Vec<String> = lexer
//!     .scanner(b"if iffy")
//!     .map(|token| token.unwrap().rule.to_string())
//!     .collect();
//! assert_eq!(rules, ["kw", "space", "id"]);
//! ```

pub mod automaton;
pub mod lexer;
pub mod matcher;
pub mod regex;
pub mod rules;
pub mod tables;

pub use automaton::{Automaton, Dfa, EpsilonNfa, Nfa, ScanResult};
pub use lexer::{INITIAL, LexerError, LexerGenerator, ScanError, Scanner};
pub use matcher::{MatchOutcome, Matcher, Rule, Token};
pub use regex::{ParseOptions, RegexError, RegexNode, Universe, parse};
pub use rules::compile_rules;
pub use tables::{StateTables, Tables};
