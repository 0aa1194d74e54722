//! Parsed pattern segments.

use std::fmt;

use serde::{Serialize, Serializer};

/// The name of a capture.
///
/// Explicit `:name` captures are `Named`; captures introduced by a bare
/// `(pattern)` are numbered left to right from zero.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum ParamName {
    /// An explicit name.
    Named(String),
    /// An auto-assigned index.
    Index(usize),
}

impl ParamName {
    /// Returns true for the empty name of a purely literal optional group.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Named(name) if name.is_empty())
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for ParamName {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for ParamName {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<usize> for ParamName {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Repetition modifier applied to a capture or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifier {
    /// Exactly once.
    #[default]
    None,
    /// `?`, zero or one time.
    Optional,
    /// `*`, zero or more times.
    ZeroOrMore,
    /// `+`, one or more times.
    OneOrMore,
}

impl Modifier {
    /// Parses a modifier token value.
    pub fn from_token(value: &str) -> Self {
        match value {
            "?" => Self::Optional,
            "*" => Self::ZeroOrMore,
            "+" => Self::OneOrMore,
            _ => Self::None,
        }
    }

    /// Returns the modifier as it appears in pattern and regex syntax.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }

    /// Returns true for `*` and `+`.
    pub const fn is_repeating(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }

    /// Returns true when the capture may be absent from a match.
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Modifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A parameter capture descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capture {
    /// Explicit or auto-numbered name. Empty for a literal optional group.
    pub name: ParamName,
    /// Literal text matched before the captured value.
    pub prefix: String,
    /// Literal text matched after the captured value.
    pub suffix: String,
    /// Regex source for the captured value. Empty for a literal optional group.
    pub pattern: String,
    /// Repetition modifier.
    pub modifier: Modifier,
}

impl Capture {
    /// Returns true if this capture binds a value when matched.
    pub fn is_capturing(&self) -> bool {
        !self.pattern.is_empty()
    }
}

/// A parsed segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    /// Text matched verbatim.
    Literal { text: String },
    /// A parameter capture or optional group.
    Capture(Capture),
}

impl Segment {
    /// Creates a literal segment.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal { text: text.into() }
    }
}
