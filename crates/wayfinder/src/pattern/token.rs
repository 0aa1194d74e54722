//! Token types for the pattern lexer.

use std::fmt;

/// The kind of a lexical token in a route pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `{`, opens an optional group.
    Open,
    /// `}`, closes an optional group.
    Close,
    /// A custom capture pattern, `(...)`.
    Pattern,
    /// A parameter name, `:name`.
    Name,
    /// Any other single character.
    Char,
    /// A character escaped with `\`.
    EscapedChar,
    /// One of `*`, `+` or `?`.
    Modifier,
    /// Synthetic end of input.
    End,
}

impl TokenKind {
    /// Returns the canonical upper-case name of the token kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::Pattern => "PATTERN",
            Self::Name => "NAME",
            Self::Char => "CHAR",
            Self::EscapedChar => "ESCAPED_CHAR",
            Self::Modifier => "MODIFIER",
            Self::End => "END",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexToken {
    /// The token kind.
    pub kind: TokenKind,
    /// Byte offset of the token in the source pattern.
    pub index: usize,
    /// The token value: the name for `NAME`, the inner text for `PATTERN`,
    /// the escaped character for `ESCAPED_CHAR`, otherwise the raw character.
    pub value: String,
}

impl LexToken {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, index: usize, value: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            value: value.into(),
        }
    }

    /// Returns true if this is the end-of-input token.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::End
    }
}
