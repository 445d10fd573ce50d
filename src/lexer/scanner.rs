use crate::matcher::{MatchOutcome, Token};

use super::{LexerError, LexerGenerator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// No rule of the active state matches at `pos`.
    UnexpectedByte { byte: u8, pos: usize },
    Lexer(LexerError),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedByte { byte, pos } => write!(
                f,
                "unexpected byte '{}' at {pos}",
                byte.escape_ascii()
            ),
            Self::Lexer(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<LexerError> for ScanError {
    fn from(err: LexerError) -> Self {
        Self::Lexer(err)
    }
}

/// Iterator over the tokens of one input.
///
/// Iteration ends at end of input. An error item is yielded once and ends
/// iteration.
pub struct Scanner<'g, 'i> {
    lexer: &'g mut LexerGenerator,
    input: &'i [u8],
    pos: usize,
    done: bool,
}

impl<'g, 'i> Scanner<'g, 'i> {
    pub(super) fn new(lexer: &'g mut LexerGenerator, input: &'i [u8]) -> Self {
        Self {
            lexer,
            input,
            pos: 0,
            done: false,
        }
    }

    /// Switch state before the next token.
    pub fn set_state(&mut self, name: &str) -> Result<(), LexerError> {
        self.lexer.set_state(name)
    }

    pub fn current_state(&self) -> Option<&str> {
        self.lexer.current_state()
    }

    /// Where the next token starts.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'i> Iterator for Scanner<'_, 'i> {
    type Item = Result<Token<'i>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let outcome = match self.lexer.find(self.input, self.pos) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.done = true;
                return Some(Err(err.into()));
            }
        };
        match outcome {
            MatchOutcome::Matched(token) => {
                self.pos = token.end;
                Some(Ok(token))
            }
            MatchOutcome::Eof => {
                self.done = true;
                None
            }
            MatchOutcome::NoMatch => {
                self.done = true;
                Some(Err(ScanError::UnexpectedByte {
                    byte: self.input[self.pos],
                    pos: self.pos,
                }))
            }
        }
    }
}
