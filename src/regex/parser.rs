//! Operator-precedence parser for rule patterns.
//!
//! The parser is split in two. [`RegexBuilder`] is the shunting-yard engine:
//! it is fed classified units (characters, escapes, classes, operators) one
//! at a time, which is how rule-file drivers use it. [`parse`] classifies
//! pattern text into those units and drives a builder.

use std::iter::Peekable;
use std::str::Chars;

use phf::{Map, phf_map};

use super::ast::RegexNode;
use super::byte_set::{ByteSet, Universe};

/// Errors that can occur while parsing a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// A `)` with no open group.
    ParenthesesMismatch,
    /// A `(` that is never closed.
    UnclosedGroup,
    UnknownOperator(char),
    /// An operator found too few operands on the stack.
    MissingOperand(char),
    UnclosedClass,
    InvalidClassRange(u8, u8),
    /// A multi-byte character used as a range bound or in a negated class.
    MultiByteClassMember(char),
    InvalidEscape(String),
    TrailingEscape,
    /// A `"` literal that is never closed.
    UnclosedQuote,
}

impl std::fmt::Display for RegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParenthesesMismatch => write!(f, "Parentheses mismatch in pattern"),
            Self::UnclosedGroup => write!(f, "Unclosed group '(' in pattern"),
            Self::UnknownOperator(c) => write!(f, "Unknown operator {c:?}"),
            Self::MissingOperand(c) => write!(f, "Operator {c:?} is missing an operand"),
            Self::UnclosedClass => write!(f, "Unclosed character class '['"),
            Self::InvalidClassRange(lo, hi) => write!(
                f,
                "Invalid class range {:?}-{:?}",
                lo.escape_ascii().to_string(),
                hi.escape_ascii().to_string()
            ),
            Self::MultiByteClassMember(c) => {
                write!(f, "Multi-byte character {c:?} not allowed here in a class")
            }
            Self::InvalidEscape(s) => write!(f, "Invalid escape sequence '\\{s}'"),
            Self::TrailingEscape => write!(f, "Pattern ends with a lone '\\'"),
            Self::UnclosedQuote => write!(f, "Unclosed quoted literal '\"'"),
        }
    }
}

impl std::error::Error for RegexError {}

/// Options that change how patterns are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Universe for `[^...]` and `.`.
    pub universe: Universe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Open,
    Optional,
    ZeroOrMore,
    OneOrMore,
    Concat,
    Alternate,
}

struct OpInfo {
    op: Operator,
    /// Lower binds tighter. `(` is a barrier that reduction never crosses.
    precedence: u8,
}

/// Operator table. `.` here is the implicit concatenation between atoms.
const OPERATORS: Map<char, OpInfo> = phf_map! {
    '(' => OpInfo { op: Operator::Open, precedence: 3 },
    '?' => OpInfo { op: Operator::Optional, precedence: 4 },
    '*' => OpInfo { op: Operator::ZeroOrMore, precedence: 4 },
    '+' => OpInfo { op: Operator::OneOrMore, precedence: 4 },
    '.' => OpInfo { op: Operator::Concat, precedence: 5 },
    '|' => OpInfo { op: Operator::Alternate, precedence: 7 },
};

impl Operator {
    fn symbol(self) -> char {
        match self {
            Operator::Open => '(',
            Operator::Optional => '?',
            Operator::ZeroOrMore => '*',
            Operator::OneOrMore => '+',
            Operator::Concat => '.',
            Operator::Alternate => '|',
        }
    }

    fn precedence(self) -> u8 {
        OPERATORS
            .get(&self.symbol())
            .map(|info| info.precedence)
            .unwrap_or(u8::MAX)
    }
}

/// Characters that act as operators in pattern text.
fn is_operator(c: char) -> bool {
    matches!(c, '.' | '?' | '*' | '+' | '|' | '(' | ')')
}

/// Shunting-yard pattern builder.
///
/// Atoms are pushed together with an implicit concatenation operator, so
/// the operand stack is seeded with an empty literal that the first atom
/// concatenates onto. Groups and alternatives are seeded the same way.
#[derive(Debug)]
pub struct RegexBuilder {
    options: ParseOptions,
    operands: Vec<RegexNode>,
    operators: Vec<Operator>,
}

impl RegexBuilder {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            operands: vec![RegexNode::empty()],
            operators: Vec::new(),
        }
    }

    /// An ordinary character. Multi-byte characters become multi-byte literals.
    pub fn push_char(&mut self, c: char) -> Result<(), RegexError> {
        let mut buf = [0u8; 4];
        self.push_node(RegexNode::literal(c.encode_utf8(&mut buf).as_bytes()))
    }

    pub fn push_byte(&mut self, byte: u8) -> Result<(), RegexError> {
        self.push_node(RegexNode::literal([byte]))
    }

    /// A whole literal string, e.g. a quoted literal in a rule file.
    pub fn push_literal(&mut self, bytes: &[u8]) -> Result<(), RegexError> {
        self.push_node(RegexNode::literal(bytes))
    }

    /// The character following a `\`: `n`, `r` and `t` are control bytes,
    /// anything else stands for itself.
    pub fn push_escaped(&mut self, c: char) -> Result<(), RegexError> {
        match c {
            'n' => self.push_byte(b'\n'),
            'r' => self.push_byte(b'\r'),
            't' => self.push_byte(b'\t'),
            other => self.push_char(other),
        }
    }

    /// A finished character class.
    pub fn push_class(&mut self, class: ClassBuilder) -> Result<(), RegexError> {
        let node = class.build(self.options.universe)?;
        self.push_node(node)
    }

    /// Any atom, concatenated onto what precedes it.
    pub fn push_node(&mut self, node: RegexNode) -> Result<(), RegexError> {
        self.reduce(Operator::Concat.precedence())?;
        self.operands.push(node);
        self.operators.push(Operator::Concat);
        Ok(())
    }

    /// One of `. ? * + | ( )`.
    pub fn push_operator(&mut self, c: char) -> Result<(), RegexError> {
        match c {
            '.' => {
                let wildcard = self.options.universe.wildcard();
                self.push_node(RegexNode::range(wildcard))?;
            }
            '(' => {
                self.reduce(Operator::Concat.precedence())?;
                self.operators.push(Operator::Concat);
                self.operators.push(Operator::Open);
                self.operands.push(RegexNode::empty());
            }
            ')' => self.close_group()?,
            '|' => {
                self.reduce(Operator::Alternate.precedence())?;
                self.operands.push(RegexNode::empty());
                self.operators.push(Operator::Alternate);
            }
            '?' | '*' | '+' => {
                let op = OPERATORS
                    .get(&c)
                    .map(|info| info.op)
                    .ok_or(RegexError::UnknownOperator(c))?;
                self.reduce(op.precedence())?;
                self.operators.push(op);
            }
            other => return Err(RegexError::UnknownOperator(other)),
        }
        Ok(())
    }

    /// Apply every remaining operator and return the single resulting node.
    pub fn finish(mut self) -> Result<RegexNode, RegexError> {
        while let Some(op) = self.operators.pop() {
            if op == Operator::Open {
                return Err(RegexError::UnclosedGroup);
            }
            self.apply(op)?;
        }
        match (self.operands.pop(), self.operands.is_empty()) {
            (Some(node), true) => Ok(node),
            _ => Err(RegexError::MissingOperand('.')),
        }
    }

    /// Pop and apply operators binding at least as tightly as `precedence`,
    /// stopping at an open group.
    fn reduce(&mut self, precedence: u8) -> Result<(), RegexError> {
        while let Some(&top) = self.operators.last() {
            if top == Operator::Open || top.precedence() > precedence {
                break;
            }
            self.operators.pop();
            self.apply(top)?;
        }
        Ok(())
    }

    fn close_group(&mut self) -> Result<(), RegexError> {
        loop {
            match self.operators.pop() {
                None => return Err(RegexError::ParenthesesMismatch),
                Some(Operator::Open) => return Ok(()),
                Some(op) => self.apply(op)?,
            }
        }
    }

    fn apply(&mut self, op: Operator) -> Result<(), RegexError> {
        let missing = || RegexError::MissingOperand(op.symbol());
        let node = match op {
            Operator::Concat | Operator::Alternate => {
                let rhs = self.operands.pop().ok_or_else(missing)?;
                let lhs = self.operands.pop().ok_or_else(missing)?;
                if op == Operator::Concat {
                    RegexNode::concat(lhs, rhs)
                } else {
                    RegexNode::alternate(lhs, rhs)
                }
            }
            Operator::Optional => RegexNode::optional(self.operands.pop().ok_or_else(missing)?),
            Operator::ZeroOrMore => {
                RegexNode::zero_or_more(self.operands.pop().ok_or_else(missing)?)
            }
            Operator::OneOrMore => RegexNode::repeat(self.operands.pop().ok_or_else(missing)?),
            Operator::Open => return Err(RegexError::ParenthesesMismatch),
        };
        self.operands.push(node);
        Ok(())
    }
}

/// Accumulates the members of a `[...]` class.
#[derive(Debug, Default)]
pub struct ClassBuilder {
    set: ByteSet,
    sequences: Vec<Vec<u8>>,
    negated: bool,
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn negate(&mut self) {
        self.negated = true;
    }

    pub fn add_byte(&mut self, byte: u8) {
        self.set.insert(byte);
    }

    pub fn add_range(&mut self, lo: u8, hi: u8) -> Result<(), RegexError> {
        if lo > hi {
            return Err(RegexError::InvalidClassRange(lo, hi));
        }
        self.set.insert_range(lo, hi);
        Ok(())
    }

    /// A character member. Multi-byte characters become byte-sequence
    /// alternatives of the class.
    pub fn add_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        match c.encode_utf8(&mut buf).as_bytes() {
            [byte] => self.add_byte(*byte),
            bytes => self.sequences.push(bytes.to_vec()),
        }
    }

    pub fn build(self, universe: Universe) -> Result<RegexNode, RegexError> {
        if self.negated {
            if let Some(seq) = self.sequences.first() {
                let c = std::str::from_utf8(seq)
                    .ok()
                    .and_then(|s| s.chars().next())
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(RegexError::MultiByteClassMember(c));
            }
            return Ok(RegexNode::range(self.set.complement_in(universe)));
        }
        if self.sequences.is_empty() {
            return Ok(RegexNode::range(self.set));
        }
        let mut alternatives = Vec::new();
        if !self.set.is_empty() {
            alternatives.push(RegexNode::range(self.set));
        }
        alternatives.extend(self.sequences.into_iter().map(RegexNode::Literal));
        if alternatives.len() == 1 {
            return Ok(alternatives.remove(0));
        }
        Ok(RegexNode::Alternation(alternatives))
    }
}

/// Parse pattern text into a [`RegexNode`].
pub fn parse(pattern: &str, options: &ParseOptions) -> Result<RegexNode, RegexError> {
    Parser {
        chars: pattern.chars().peekable(),
        builder: RegexBuilder::new(*options),
    }
    .parse_pattern()
}

/// One unit of pattern text following a `\` or inside a class.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Member {
    Byte(u8),
    Char(char),
}

impl Member {
    fn single_byte(self) -> Result<u8, RegexError> {
        match self {
            Member::Byte(byte) => Ok(byte),
            Member::Char(c) if c.is_ascii() => Ok(c as u8),
            Member::Char(c) => Err(RegexError::MultiByteClassMember(c)),
        }
    }
}

fn push_utf8(bytes: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    builder: RegexBuilder,
}

impl Parser<'_> {
    fn parse_pattern(mut self) -> Result<RegexNode, RegexError> {
        while let Some(c) = self.chars.next() {
            match c {
                '\\' => match self.parse_escape()? {
                    Member::Byte(byte) => self.builder.push_byte(byte)?,
                    Member::Char(c) => self.builder.push_char(c)?,
                },
                '[' => {
                    let class = self.parse_class()?;
                    self.builder.push_class(class)?;
                }
                '"' => {
                    let literal = self.parse_quoted()?;
                    self.builder.push_literal(&literal)?;
                }
                c if is_operator(c) => self.builder.push_operator(c)?,
                c => self.builder.push_char(c)?,
            }
        }
        self.builder.finish()
    }

    /// Parse the rest of an escape (the `\` has already been consumed).
    fn parse_escape(&mut self) -> Result<Member, RegexError> {
        match self.chars.next() {
            None => Err(RegexError::TrailingEscape),
            Some('n') => Ok(Member::Byte(b'\n')),
            Some('r') => Ok(Member::Byte(b'\r')),
            Some('t') => Ok(Member::Byte(b'\t')),
            Some('x') => {
                let digits: String = (0..2).filter_map(|_| self.chars.next()).collect();
                u8::from_str_radix(&digits, 16)
                    .ok()
                    .filter(|_| digits.len() == 2)
                    .map(Member::Byte)
                    .ok_or_else(|| RegexError::InvalidEscape(format!("x{digits}")))
            }
            Some(c) => Ok(Member::Char(c)),
        }
    }

    /// Parse the bytes of a quoted literal (the opening `"` has already been
    /// consumed). Only `\` is special inside the quotes.
    fn parse_quoted(&mut self) -> Result<Vec<u8>, RegexError> {
        let mut bytes = Vec::new();
        loop {
            match self.chars.next() {
                None => return Err(RegexError::UnclosedQuote),
                Some('"') => return Ok(bytes),
                Some('\\') => match self.parse_escape()? {
                    Member::Byte(byte) => bytes.push(byte),
                    Member::Char(c) => push_utf8(&mut bytes, c),
                },
                Some(c) => push_utf8(&mut bytes, c),
            }
        }
    }

    /// Parse a class body (the `[` has already been consumed).
    fn parse_class(&mut self) -> Result<ClassBuilder, RegexError> {
        let mut class = ClassBuilder::new();
        if self.chars.peek() == Some(&'^') {
            self.chars.next();
            class.negate();
        }
        loop {
            let lo = match self.chars.next() {
                None => return Err(RegexError::UnclosedClass),
                Some(']') => break,
                Some('\\') => self.parse_escape()?,
                Some(c) => Member::Char(c),
            };
            if self.chars.peek() != Some(&'-') {
                self.add_member(&mut class, lo);
                continue;
            }
            self.chars.next(); // consume '-'
            let hi = match self.chars.peek() {
                // Trailing '-' is literal.
                None | Some(']') => {
                    self.add_member(&mut class, lo);
                    class.add_byte(b'-');
                    continue;
                }
                Some('\\') => {
                    self.chars.next();
                    self.parse_escape()?
                }
                Some(&c) => {
                    self.chars.next();
                    Member::Char(c)
                }
            };
            class.add_range(lo.single_byte()?, hi.single_byte()?)?;
        }
        Ok(class)
    }

    fn add_member(&self, class: &mut ClassBuilder, member: Member) {
        match member {
            Member::Byte(byte) => class.add_byte(byte),
            Member::Char(c) => class.add_char(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(s: &str) -> RegexNode {
        parse(s, &ParseOptions::default()).expect("parse should succeed")
    }

    fn parse_err(s: &str) -> RegexError {
        parse(s, &ParseOptions::default()).expect_err("parse should fail")
    }

    fn lit(s: &str) -> RegexNode {
        RegexNode::literal(s)
    }

    fn class(bytes: &[u8]) -> RegexNode {
        RegexNode::range(bytes.iter().copied().collect())
    }

    // --- Literals and concatenation ---

    #[test]
    fn test_empty_pattern() {
        assert_eq!(parse_ok(""), RegexNode::empty());
    }

    #[test]
    fn test_plain_literal() {
        assert_eq!(parse_ok("while"), lit("while"));
    }

    #[test]
    fn test_multibyte_literal() {
        assert_eq!(parse_ok("é"), RegexNode::literal("é".as_bytes()));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(parse_ok(r"\n\r\t"), lit("\n\r\t"));
        assert_eq!(parse_ok(r"\.\*\\"), lit(".*\\"));
        assert_eq!(parse_ok(r"\x41\x7e"), lit("A~"));
    }

    #[test]
    fn test_quoted_literal() {
        assert_eq!(parse_ok("\"a+b\""), lit("a+b"));
        assert_eq!(parse_ok("if\"[.]\""), lit("if[.]"));
        assert_eq!(
            parse_ok(r#""\"\n"x*"#),
            RegexNode::Sequence(vec![lit("\"\n"), RegexNode::zero_or_more(lit("x"))])
        );
    }

    #[test]
    fn test_group_concatenates_with_prefix() {
        assert_eq!(parse_ok("x(ab)"), lit("xab"));
    }

    // --- Postfix operators ---

    #[test]
    fn test_postfix_binds_to_last_atom() {
        assert_eq!(
            parse_ok("ab*"),
            RegexNode::Sequence(vec![lit("a"), RegexNode::zero_or_more(lit("b"))])
        );
    }

    #[test]
    fn test_postfix_on_group() {
        assert_eq!(parse_ok("(ab)+"), RegexNode::repeat(lit("ab")));
    }

    #[test]
    fn test_stacked_postfix() {
        assert_eq!(
            parse_ok("a+?"),
            RegexNode::optional(RegexNode::repeat(lit("a")))
        );
    }

    // --- Alternation ---

    #[test]
    fn test_alternation_is_loosest() {
        assert_eq!(
            parse_ok("ab|cd"),
            RegexNode::Alternation(vec![lit("ab"), lit("cd")])
        );
    }

    #[test]
    fn test_alternation_flattens() {
        assert_eq!(
            parse_ok("a|b|c"),
            RegexNode::Alternation(vec![lit("a"), lit("b"), lit("c")])
        );
    }

    #[test]
    fn test_grouped_alternation_after_prefix() {
        assert_eq!(
            parse_ok("x(a|b)"),
            RegexNode::Sequence(vec![
                lit("x"),
                RegexNode::Alternation(vec![lit("a"), lit("b")])
            ])
        );
    }

    #[test]
    fn test_empty_alternative() {
        assert_eq!(
            parse_ok("a|"),
            RegexNode::Alternation(vec![lit("a"), RegexNode::empty()])
        );
    }

    // --- Wildcard and classes ---

    #[test]
    fn test_wildcard_follows_universe() {
        assert_eq!(parse_ok("."), RegexNode::range(Universe::Ascii.wildcard()));
        let options = ParseOptions {
            universe: Universe::Bytes,
        };
        assert_eq!(
            parse(".", &options).unwrap(),
            RegexNode::range(Universe::Bytes.wildcard())
        );
    }

    #[test]
    fn test_class_with_ranges() {
        let node = parse_ok("[a-c_0-1]");
        assert_eq!(node, class(b"abc_01"));
    }

    #[test]
    fn test_class_literal_dashes() {
        assert_eq!(parse_ok("[-a]"), class(b"-a"));
        assert_eq!(parse_ok("[a-]"), class(b"a-"));
    }

    #[test]
    fn test_class_escapes() {
        assert_eq!(parse_ok(r"[\]\-\n]"), class(b"]-\n"));
    }

    #[test]
    fn test_negated_class() {
        match parse_ok("[^a-z]") {
            RegexNode::Range(set) => {
                assert!(!set.contains(b'q'));
                assert!(set.contains(b'A'));
                assert!(!set.contains(0x80));
                assert_eq!(set.len(), 128 - 26);
            }
            other => panic!("expected Range, got {other:?}"),
        }
    }

    #[test]
    fn test_operators_are_literal_in_class() {
        assert_eq!(parse_ok("[.*(]"), class(b".*("));
    }

    #[test]
    fn test_multibyte_class_member() {
        assert_eq!(
            parse_ok("[aé]"),
            RegexNode::Alternation(vec![class(b"a"), RegexNode::literal("é".as_bytes())])
        );
    }

    // --- Builder interface ---

    #[test]
    fn test_builder_units() {
        let mut builder = RegexBuilder::new(ParseOptions::default());
        builder.push_char('a').unwrap();
        builder.push_operator('(').unwrap();
        builder.push_escaped('n').unwrap();
        builder.push_operator('|').unwrap();
        let mut digits = ClassBuilder::new();
        digits.add_range(b'0', b'9').unwrap();
        builder.push_class(digits).unwrap();
        builder.push_operator(')').unwrap();
        builder.push_operator('*').unwrap();
        let node = builder.finish().unwrap();
        assert_eq!(
            node,
            RegexNode::Sequence(vec![
                lit("a"),
                RegexNode::zero_or_more(RegexNode::Alternation(vec![
                    lit("\n"),
                    RegexNode::range(ByteSet::range(b'0', b'9')),
                ])),
            ])
        );
    }

    #[test]
    fn test_builder_rejects_unknown_operator() {
        let mut builder = RegexBuilder::new(ParseOptions::default());
        assert_eq!(builder.push_operator('{'), Err(RegexError::UnknownOperator('{')));
    }

    // --- Round trip ---

    #[test]
    fn test_print_then_parse_round_trips() {
        for pattern in [
            "[a-zA-Z_][a-zA-Z_0-9]*",
            "0x[0-9a-f]+",
            "(a|b)?c",
            r"\(\)\[\]\.",
            "if|else|while",
            r"\r?\n",
            "[^\"\\\\]*",
            "\"a|b\"*",
            "x\\\"y",
        ] {
            let ast = parse_ok(pattern);
            let printed = ast.to_string();
            assert_eq!(parse_ok(&printed), ast, "round trip of {pattern:?} via {printed:?}");
        }
    }

    // --- Errors ---

    #[test]
    fn test_unmatched_close() {
        assert_eq!(parse_err("a)"), RegexError::ParenthesesMismatch);
    }

    #[test]
    fn test_unclosed_group() {
        assert_eq!(parse_err("(a"), RegexError::UnclosedGroup);
    }

    #[test]
    fn test_unclosed_class() {
        assert_eq!(parse_err("[abc"), RegexError::UnclosedClass);
    }

    #[test]
    fn test_inverted_class_range() {
        assert_eq!(parse_err("[z-a]"), RegexError::InvalidClassRange(b'z', b'a'));
    }

    #[test]
    fn test_bad_hex_escape() {
        assert!(matches!(parse_err(r"\xg1"), RegexError::InvalidEscape(_)));
    }

    #[test]
    fn test_trailing_escape() {
        assert_eq!(parse_err("ab\\"), RegexError::TrailingEscape);
    }

    #[test]
    fn test_unclosed_quote() {
        assert_eq!(parse_err("\"abc"), RegexError::UnclosedQuote);
        assert_eq!(parse_err(r#""ab\""#), RegexError::UnclosedQuote);
    }

    #[test]
    fn test_multibyte_in_negated_class() {
        assert_eq!(parse_err("[^é]"), RegexError::MultiByteClassMember('é'));
    }
}
