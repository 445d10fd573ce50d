//! AST types for lexer rule patterns.

use std::fmt;

use super::byte_set::ByteSet;

/// A parsed rule pattern.
///
/// Nodes are immutable once built. The empty literal is the identity for
/// concatenation, which is how the parser seeds the start of the pattern, of
/// every group and of every alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexNode {
    /// An exact byte sequence.
    Literal(Vec<u8>),
    /// Concatenation.
    Sequence(Vec<RegexNode>),
    /// Union. Order is kept for display only.
    Alternation(Vec<RegexNode>),
    /// Zero or one.
    Optional(Box<RegexNode>),
    /// One or more.
    Repetition(Box<RegexNode>),
    /// Zero or more, built as `Optional(Repetition(child))`.
    ZeroOrMore(Box<RegexNode>),
    /// Any one byte from the set.
    Range(ByteSet),
}

impl RegexNode {
    pub fn empty() -> Self {
        RegexNode::Literal(Vec::new())
    }

    pub fn literal(bytes: impl AsRef<[u8]>) -> Self {
        RegexNode::Literal(bytes.as_ref().to_vec())
    }

    pub fn range(set: ByteSet) -> Self {
        RegexNode::Range(set)
    }

    pub fn optional(node: RegexNode) -> Self {
        RegexNode::Optional(Box::new(node))
    }

    pub fn repeat(node: RegexNode) -> Self {
        RegexNode::Repetition(Box::new(node))
    }

    pub fn zero_or_more(node: RegexNode) -> Self {
        RegexNode::ZeroOrMore(Box::new(node))
    }

    pub fn is_empty_literal(&self) -> bool {
        matches!(self, RegexNode::Literal(bytes) if bytes.is_empty())
    }

    /// Concatenate two nodes, dropping empty literals, merging adjacent
    /// literals and flattening nested sequences.
    pub fn concat(lhs: RegexNode, rhs: RegexNode) -> RegexNode {
        if lhs.is_empty_literal() {
            return rhs;
        }
        if rhs.is_empty_literal() {
            return lhs;
        }
        let mut children = match lhs {
            RegexNode::Sequence(children) => children,
            other => vec![other],
        };
        let tail = match rhs {
            RegexNode::Sequence(children) => children,
            other => vec![other],
        };
        for node in tail {
            match (children.last_mut(), node) {
                (Some(RegexNode::Literal(prev)), RegexNode::Literal(next)) => prev.extend(next),
                (_, node) => children.push(node),
            }
        }
        if children.len() == 1 {
            return children.pop().unwrap_or_else(RegexNode::empty);
        }
        RegexNode::Sequence(children)
    }

    /// Union of two nodes, flattening nested alternations.
    pub fn alternate(lhs: RegexNode, rhs: RegexNode) -> RegexNode {
        let mut children = match lhs {
            RegexNode::Alternation(children) => children,
            other => vec![other],
        };
        match rhs {
            RegexNode::Alternation(more) => children.extend(more),
            other => children.push(other),
        }
        RegexNode::Alternation(children)
    }
}

/// Prints the pattern in the syntax accepted by [`super::parse`].
impl fmt::Display for RegexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexNode::Literal(bytes) => {
                for &byte in bytes {
                    write_literal_byte(f, byte)?;
                }
                Ok(())
            }
            RegexNode::Sequence(children) => {
                f.write_str("(")?;
                for child in children {
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
            RegexNode::Alternation(children) => {
                f.write_str("(")?;
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
            RegexNode::Optional(child) => write!(f, "({child})?"),
            RegexNode::Repetition(child) => write!(f, "({child})+"),
            RegexNode::ZeroOrMore(child) => write!(f, "({child})*"),
            RegexNode::Range(set) => {
                f.write_str("[")?;
                for (lo, hi) in set.ranges() {
                    write_class_byte(f, lo)?;
                    if hi > lo {
                        if hi > lo + 1 {
                            f.write_str("-")?;
                        }
                        write_class_byte(f, hi)?;
                    }
                }
                f.write_str("]")
            }
        }
    }
}

fn write_literal_byte(f: &mut fmt::Formatter<'_>, byte: u8) -> fmt::Result {
    match byte {
        b'\\' | b'+' | b'?' | b'*' | b'(' | b')' | b'|' | b'[' | b']' | b'.' | b'"' => {
            write!(f, "\\{}", byte as char)
        }
        _ => write_plain_byte(f, byte),
    }
}

fn write_class_byte(f: &mut fmt::Formatter<'_>, byte: u8) -> fmt::Result {
    match byte {
        b'\\' | b'[' | b']' | b'-' | b'^' => write!(f, "\\{}", byte as char),
        _ => write_plain_byte(f, byte),
    }
}

fn write_plain_byte(f: &mut fmt::Formatter<'_>, byte: u8) -> fmt::Result {
    match byte {
        b'\n' => f.write_str("\\n"),
        b'\r' => f.write_str("\\r"),
        b'\t' => f.write_str("\\t"),
        0x20..=0x7e => write!(f, "{}", byte as char),
        _ => write!(f, "\\x{byte:02x}"),
    }
}
