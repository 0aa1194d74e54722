//! Route pattern lexer.

use super::error::ParseError;
use super::token::{LexToken, TokenKind};

/// A lexer that tokenizes a route pattern.
pub struct Lexer<'a> {
    /// The pattern source.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given pattern.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Creates a token starting at the current token start.
    fn make_token(&self, kind: TokenKind, value: impl Into<String>) -> LexToken {
        LexToken::new(kind, self.start, value)
    }

    /// Scans a `:name` parameter. The colon has been consumed.
    fn scan_name(&mut self) -> Result<LexToken, ParseError> {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let name = &self.input[self.start + 1..self.pos];
        if name.is_empty() {
            return Err(ParseError::MissingParameterName { index: self.start });
        }
        Ok(self.make_token(TokenKind::Name, name))
    }

    /// Scans a `(...)` custom pattern. The opening parenthesis has been consumed.
    fn scan_pattern(&mut self) -> Result<LexToken, ParseError> {
        if self.peek() == Some('?') {
            return Err(ParseError::PatternStartsWithQuestionMark { index: self.pos });
        }

        let mut depth = 1usize;
        let mut pattern = String::new();

        while let Some(c) = self.advance() {
            match c {
                '\\' => {
                    // Escapes are kept verbatim for the regex backend.
                    pattern.push(c);
                    if let Some(escaped) = self.advance() {
                        pattern.push(escaped);
                    }
                    continue;
                }
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                '(' => {
                    depth += 1;
                    if !self.opens_non_capturing_group() {
                        return Err(ParseError::CapturingGroupNotAllowed {
                            index: self.pos - 1,
                        });
                    }
                }
                _ => {}
            }
            pattern.push(c);
        }

        if depth != 0 {
            return Err(ParseError::UnbalancedPattern { index: self.start });
        }
        if pattern.is_empty() {
            return Err(ParseError::MissingPattern { index: self.start });
        }
        Ok(self.make_token(TokenKind::Pattern, pattern))
    }

    /// Checks that a nested group just opened does not capture.
    ///
    /// Named groups start with `?` as well, so they are ruled out explicitly.
    fn opens_non_capturing_group(&self) -> bool {
        let rest = &self.input[self.pos..];
        rest.starts_with('?') && !rest.starts_with("?<") && !rest.starts_with("?P<")
    }

    /// Scans the next token.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` for a malformed name or custom pattern.
    pub fn next_token(&mut self) -> Result<LexToken, ParseError> {
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return Ok(self.make_token(TokenKind::End, ""));
        };

        match c {
            '*' | '+' | '?' => Ok(self.make_token(TokenKind::Modifier, c)),
            '\\' => {
                let escaped = self.advance().unwrap_or('\\');
                Ok(self.make_token(TokenKind::EscapedChar, escaped))
            }
            '{' => Ok(self.make_token(TokenKind::Open, c)),
            '}' => Ok(self.make_token(TokenKind::Close, c)),
            ':' => self.scan_name(),
            '(' => self.scan_pattern(),
            _ => Ok(self.make_token(TokenKind::Char, c)),
        }
    }

    /// Tokenizes the entire pattern. The last token is always `END`.
    ///
    /// # Errors
    ///
    /// Returns the first `ParseError` encountered.
    pub fn tokenize(mut self) -> Result<Vec<LexToken>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_end = token.is_end();
            tokens.push(token);
            if is_end {
                break;
            }
        }
        Ok(tokens)
    }
}

/// Tokenizes a route pattern.
///
/// # Errors
///
/// Returns a `ParseError` if the pattern contains a malformed name or custom pattern.
pub fn lex(pattern: &str) -> Result<Vec<LexToken>, ParseError> {
    Lexer::new(pattern).tokenize()
}
