//! Route pattern compiler.
//!
//! A pattern string goes through three stages: the [`Lexer`] produces a flat
//! token stream, the [`Parser`] groups tokens into [`Segment`]s, and
//! [`compile`] emits an anchored regex plus the ordered capture keys.
//!
//! Pattern grammar:
//!
//! - literal characters, `\` escapes the next character
//! - `:name` named capture using the default pattern
//! - `(pattern)` unnamed capture with a custom regex (no capturing groups)
//! - `{...}` group with literal prefix and suffix
//! - `?`, `*`, `+` after a capture or group

mod compiler;
mod error;
mod lexer;
mod options;
mod parser;
mod segment;
mod token;

pub use compiler::{compile, to_regex_source};
pub use error::{CompileError, ParseError, PatternError};
pub use lexer::{lex, Lexer};
pub use options::PatternOptions;
pub use parser::{parse, Parser};
pub use segment::{Capture, Modifier, ParamName, Segment};
pub use token::{LexToken, TokenKind};
