//! Pattern error types.

use thiserror::Error;

use super::token::TokenKind;

/// An error raised while lexing or parsing a route pattern.
///
/// Every variant carries the byte offset in the source pattern where the
/// problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `:` was not followed by any of `[0-9A-Za-z_]`.
    #[error("missing parameter name at {index}")]
    MissingParameterName { index: usize },

    /// A custom pattern contains a nested capturing group.
    #[error("capturing groups are not allowed at {index}")]
    CapturingGroupNotAllowed { index: usize },

    /// A custom pattern starts with `?`.
    #[error("pattern cannot start with \"?\" at {index}")]
    PatternStartsWithQuestionMark { index: usize },

    /// A custom pattern is missing its closing `)`.
    #[error("unbalanced pattern at {index}")]
    UnbalancedPattern { index: usize },

    /// A custom pattern is empty, `()`.
    #[error("missing pattern at {index}")]
    MissingPattern { index: usize },

    /// A capture name appears more than once in the pattern.
    #[error("duplicate parameter name \"{name}\" at {index}")]
    DuplicateParameterName { name: String, index: usize },

    /// The parser found a token it cannot use at this position.
    #[error("unexpected {found} at {index}, expected {expected}")]
    UnexpectedToken {
        found: TokenKind,
        expected: TokenKind,
        index: usize,
    },
}

impl ParseError {
    /// Returns the byte offset where the error was detected.
    pub const fn index(&self) -> usize {
        match self {
            Self::MissingParameterName { index }
            | Self::CapturingGroupNotAllowed { index }
            | Self::PatternStartsWithQuestionMark { index }
            | Self::UnbalancedPattern { index }
            | Self::MissingPattern { index }
            | Self::DuplicateParameterName { index, .. }
            | Self::UnexpectedToken { index, .. } => *index,
        }
    }
}

/// An error raised while building the matching automaton.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The regex backend rejected the emitted expression.
    #[error("invalid automaton `{regex}`: {error}")]
    InvalidAutomaton {
        regex: String,
        #[source]
        error: regex::Error,
    },
}

/// Any error produced while turning a pattern string into a matcher.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ParseError::UnexpectedToken {
            found: TokenKind::Modifier,
            expected: TokenKind::End,
            index: 2,
        };
        assert_eq!(err.to_string(), "unexpected MODIFIER at 2, expected END");
        assert_eq!(err.index(), 2);
    }

    #[test]
    fn test_pattern_error_is_transparent() {
        let err: PatternError = ParseError::MissingPattern { index: 3 }.into();
        assert_eq!(err.to_string(), "missing pattern at 3");
    }
}
