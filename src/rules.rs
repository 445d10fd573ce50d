//! Rule files.
//!
//! A rule file is line based:
//!
//! ```text
//! # comment
//! id=>[a-zA-Z_][a-zA-Z_0-9]*
//! num=>[0-9]+=>emit(NUM)
//! arrow=>"=>"
//! >COMMENT
//! close=>\*/
//! ```
//!
//! `name=>pattern` adds a rule to the current lexer state. A second `=>`
//! outside a class or `"..."` literal and not escaped ends the pattern, and the rest of the line
//! is the rule's action. `>NAME` starts a new lexer state. Rules before the
//! first header belong to `INITIAL`. Blank lines and lines starting with `#`
//! are skipped.

use anyhow::{Context, Result, bail};

use crate::lexer::{INITIAL, LexerGenerator};
use crate::matcher::Matcher;
use crate::regex::{ParseOptions, parse};

const SEPARATOR: &str = "=>";

/// Compile the rules in `text` into a lexer generator.
pub fn compile_rules(text: &str, options: &ParseOptions) -> Result<LexerGenerator> {
    let mut states: Vec<(String, Matcher)> = vec![(INITIAL.to_string(), Matcher::new())];
    let mut headers = 0;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            let name = header.trim();
            if name.is_empty() {
                bail!("line {line_no}: missing lexer state name after '>'");
            }
            let reopens_initial = name == INITIAL && headers == 0 && states[0].1.rules().is_empty();
            if !reopens_initial {
                if states.iter().any(|(state, _)| state == name) {
                    bail!("line {line_no}: lexer state {name} declared twice");
                }
                states.push((name.to_string(), Matcher::new()));
            }
            headers += 1;
            continue;
        }

        let Some((name, rest)) = line.split_once(SEPARATOR) else {
            bail!("line {line_no}: expected 'name=>pattern'");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("line {line_no}: rule has no name");
        }
        let (pattern, action) = match action_separator(rest) {
            Some(at) => {
                let action = rest[at + SEPARATOR.len()..].trim();
                (&rest[..at], (!action.is_empty()).then(|| action.to_string()))
            }
            None => (rest, None),
        };
        if pattern.is_empty() {
            bail!("line {line_no}: rule {name} has an empty pattern");
        }
        let node = parse(pattern, options)
            .with_context(|| format!("line {line_no}: invalid pattern for rule {name}"))?;

        let Some((_, matcher)) = states.last_mut() else {
            bail!("line {line_no}: no lexer state to add rule {name} to");
        };
        matcher.register_rule(name, node, action);
    }

    let mut lexer = LexerGenerator::new();
    for (name, matcher) in states {
        lexer.add_state_matcher(name, matcher)?;
    }
    Ok(lexer)
}

/// Byte offset of the first `=>` that is outside a class or quoted literal
/// and not escaped.
fn action_separator(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut in_class = false;
    let mut in_quote = false;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => idx += 1,
            b'"' if !in_class => in_quote = !in_quote,
            b'[' if !in_class && !in_quote => in_class = true,
            b']' if in_class => in_class = false,
            b'=' if !in_class && !in_quote && bytes.get(idx + 1) == Some(&b'>') => {
                return Some(idx);
            }
            _ => {}
        }
        idx += 1;
    }
    None
}
