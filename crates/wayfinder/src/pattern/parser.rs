//! Route pattern parser.

use std::collections::HashSet;

use super::error::ParseError;
use super::lexer::lex;
use super::options::PatternOptions;
use super::segment::{Capture, Modifier, ParamName, Segment};
use super::token::{LexToken, TokenKind};

/// Pattern parser.
///
/// Consumes the lexer's token stream and produces literal and capture
/// segments in source order.
pub struct Parser<'a> {
    tokens: Vec<LexToken>,
    pos: usize,
    /// Next index for captures without an explicit name.
    next_index: usize,
    /// Explicit capture names seen so far.
    names: HashSet<String>,
    options: &'a PatternOptions,
    default_pattern: String,
}

impl<'a> Parser<'a> {
    /// Creates a parser over a token stream ending with `END`.
    #[must_use]
    pub fn new(tokens: Vec<LexToken>, options: &'a PatternOptions) -> Self {
        Self {
            tokens,
            pos: 0,
            next_index: 0,
            names: HashSet::new(),
            default_pattern: options.default_pattern(),
            options,
        }
    }

    /// Consumes the current token if it has the given kind.
    fn try_consume(&mut self, kind: TokenKind) -> Option<String> {
        let token = self.tokens.get(self.pos).filter(|t| t.kind == kind)?;
        let value = token.value.clone();
        self.pos += 1;
        Some(value)
    }

    /// Consumes the current token or fails if it has another kind.
    fn must_consume(&mut self, kind: TokenKind) -> Result<String, ParseError> {
        if let Some(value) = self.try_consume(kind) {
            return Ok(value);
        }
        let (found, index) = self
            .tokens
            .get(self.pos)
            .map_or((TokenKind::End, 0), |t| (t.kind, t.index));
        Err(ParseError::UnexpectedToken {
            found,
            expected: kind,
            index,
        })
    }

    /// Consumes a run of plain and escaped characters.
    fn consume_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(value) = self.consume_char() {
            text.push_str(&value);
        }
        text
    }

    fn consume_char(&mut self) -> Option<String> {
        self.try_consume(TokenKind::Char)
            .or_else(|| self.try_consume(TokenKind::EscapedChar))
    }

    fn consume_modifier(&mut self) -> Modifier {
        self.try_consume(TokenKind::Modifier)
            .map_or(Modifier::None, |m| Modifier::from_token(&m))
    }

    /// Returns the source offset of the current token.
    fn current_index(&self) -> usize {
        self.tokens.get(self.pos).map_or(0, |t| t.index)
    }

    /// Claims an explicit capture name, rejecting one already used.
    fn claim_name(&mut self, name: String, index: usize) -> Result<ParamName, ParseError> {
        if !self.names.insert(name.clone()) {
            return Err(ParseError::DuplicateParameterName { name, index });
        }
        Ok(ParamName::Named(name))
    }

    fn next_unnamed(&mut self) -> ParamName {
        let index = self.next_index;
        self.next_index += 1;
        ParamName::Index(index)
    }

    /// Parses the whole token stream.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedToken` when a token cannot start or
    /// continue a segment, e.g. an unclosed `{` or a stray modifier, and
    /// `ParseError::DuplicateParameterName` when a name is used twice.
    pub fn parse(mut self) -> Result<Vec<Segment>, ParseError> {
        let mut segments = Vec::new();
        let mut path = String::new();

        while self.pos < self.tokens.len() {
            let ch = self.consume_char();
            let name_index = self.current_index();
            let name = self.try_consume(TokenKind::Name);
            let pattern = self.try_consume(TokenKind::Pattern);

            if name.is_some() || pattern.is_some() {
                let mut prefix = ch.unwrap_or_default();
                if !self.options.prefixes.contains(prefix.as_str()) {
                    path.push_str(&prefix);
                    prefix.clear();
                }
                flush_literal(&mut segments, &mut path);

                let name = match name {
                    Some(name) => self.claim_name(name, name_index)?,
                    None => self.next_unnamed(),
                };
                let pattern = pattern.unwrap_or_else(|| self.default_pattern.clone());
                segments.push(Segment::Capture(Capture {
                    name,
                    prefix,
                    suffix: String::new(),
                    pattern,
                    modifier: self.consume_modifier(),
                }));
                continue;
            }

            if let Some(ch) = ch {
                path.push_str(&ch);
                continue;
            }

            flush_literal(&mut segments, &mut path);

            if self.try_consume(TokenKind::Open).is_some() {
                let group = self.parse_group()?;
                segments.push(Segment::Capture(group));
                continue;
            }

            self.must_consume(TokenKind::End)?;
        }

        flush_literal(&mut segments, &mut path);
        Ok(segments)
    }

    /// Parses the body of a `{...}` group. The `{` has been consumed.
    fn parse_group(&mut self) -> Result<Capture, ParseError> {
        let prefix = self.consume_text();
        let name_index = self.current_index();
        let name = self.try_consume(TokenKind::Name);
        let pattern = self.try_consume(TokenKind::Pattern);
        let suffix = self.consume_text();
        self.must_consume(TokenKind::Close)?;

        let (name, pattern) = match (name, pattern) {
            (Some(name), Some(pattern)) => (self.claim_name(name, name_index)?, pattern),
            (Some(name), None) => {
                let pattern = self.default_pattern.clone();
                (self.claim_name(name, name_index)?, pattern)
            }
            (None, Some(pattern)) => (self.next_unnamed(), pattern),
            // Literal-only group, e.g. `{.html}?`.
            (None, None) => (ParamName::Named(String::new()), String::new()),
        };

        Ok(Capture {
            name,
            prefix,
            suffix,
            pattern,
            modifier: self.consume_modifier(),
        })
    }
}

fn flush_literal(segments: &mut Vec<Segment>, path: &mut String) {
    if !path.is_empty() {
        segments.push(Segment::literal(std::mem::take(path)));
    }
}

/// Parses a route pattern into segments.
///
/// # Errors
///
/// Returns a `ParseError` if the pattern is malformed.
///
/// # Example
///
/// ```
/// use wayfinder::pattern::{parse, ParamName, Segment};
/// use wayfinder::PatternOptions;
///
/// let segments = parse("/users/:id", &PatternOptions::default()).unwrap();
/// assert_eq!(segments[0], Segment::literal("/users"));
/// assert!(matches!(&segments[1], Segment::Capture(c) if c.name == ParamName::from("id")));
/// ```
pub fn parse(pattern: &str, options: &PatternOptions) -> Result<Vec<Segment>, ParseError> {
    Parser::new(lex(pattern)?, options).parse()
}
