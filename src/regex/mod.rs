//! Rule pattern syntax.
//!
//! Patterns match raw bytes. Literal text is matched as its UTF-8 encoding.
//!
//! # Pattern syntax
//!
//! | Token         | Meaning                                             |
//! |---------------|-----------------------------------------------------|
//! | `abc`         | Literal bytes                                       |
//! | `"a+b"`       | Quoted literal; only `\` escapes are special inside |
//! | `\n` `\r` `\t`| Line feed, carriage return, tab                     |
//! | `\xHH`        | The byte with hex value `HH`                        |
//! | `\c`          | The character `c` itself (escapes operators)        |
//! | `.`           | Any byte of the universe except CR and LF           |
//! | `[a-z_]`      | Any one byte in the class                           |
//! | `[^...]`      | Any byte of the universe not in the class           |
//! | `X?`          | Zero or one                                         |
//! | `X*`          | Zero or more                                        |
//! | `X+`          | One or more                                         |
//! | `XY`          | Concatenation                                       |
//! | `X\|Y`        | Alternation                                         |
//! | `(…)`         | Grouping                                            |
//!
//! The universe is chosen with [`ParseOptions::universe`].

pub mod ast;
pub mod byte_set;
pub mod parser;

pub use ast::RegexNode;
pub use byte_set::{ByteSet, Universe};
pub use parser::{ClassBuilder, ParseOptions, RegexBuilder, RegexError, parse};
