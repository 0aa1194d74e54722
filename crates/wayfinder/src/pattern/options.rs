//! Pattern compile options.

use serde::{Deserialize, Serialize};

/// Options controlling how a pattern is parsed and compiled.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// configuration file only needs the settings it changes:
///
/// ```
/// use wayfinder::PatternOptions;
///
/// let options: PatternOptions = serde_json::from_str(r#"{"strict": true}"#).unwrap();
/// assert!(options.strict);
/// assert_eq!(options.delimiter, "/#?");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternOptions {
    /// Disallow an optional trailing delimiter.
    pub strict: bool,
    /// Characters that become a capture's prefix when they precede it.
    pub prefixes: String,
    /// Characters excluded from the default capture pattern.
    pub delimiter: String,
    /// Characters that may also terminate a match.
    pub ends_with: String,
    /// Anchor the automaton at the start of the path.
    pub start: bool,
    /// Anchor the automaton at the end of the path.
    pub end: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            strict: false,
            prefixes: "./".to_string(),
            delimiter: "/#?".to_string(),
            ends_with: String::new(),
            start: true,
            end: true,
        }
    }
}

impl PatternOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets strict trailing-delimiter handling.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the prefix character set.
    #[must_use]
    pub fn prefixes(mut self, prefixes: impl Into<String>) -> Self {
        self.prefixes = prefixes.into();
        self
    }

    /// Sets the delimiter character set.
    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Sets the characters that may terminate a match.
    #[must_use]
    pub fn ends_with(mut self, ends_with: impl Into<String>) -> Self {
        self.ends_with = ends_with.into();
        self
    }

    /// Sets start anchoring.
    #[must_use]
    pub fn start(mut self, start: bool) -> Self {
        self.start = start;
        self
    }

    /// Sets end anchoring. `false` selects partial (prefix) matching.
    #[must_use]
    pub fn end(mut self, end: bool) -> Self {
        self.end = end;
        self
    }

    /// Returns the regex used for captures without a custom pattern.
    pub fn default_pattern(&self) -> String {
        match char_class(&self.delimiter, true) {
            Some(class) => format!("{class}+?"),
            None => ".+?".to_string(),
        }
    }
}

/// Builds a regex character class from a set of characters.
///
/// Returns `None` for an empty set, which has no valid class form.
pub(crate) fn char_class(chars: &str, negated: bool) -> Option<String> {
    if chars.is_empty() {
        return None;
    }
    let negation = if negated { "^" } else { "" };
    Some(format!("[{negation}{}]", regex::escape(chars)))
}
