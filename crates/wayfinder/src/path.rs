//! Path pattern matching.

use regex::Regex;

use crate::pattern::{compile, parse, Capture, PatternError, PatternOptions, Segment};
use crate::request::PathParams;

/// A compiled path pattern for matching URLs.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The original pattern string.
    pattern: String,
    /// Parsed segments.
    segments: Vec<Segment>,
    /// Compiled regex for matching.
    regex: Regex,
    /// Capture keys, in regex group order.
    keys: Vec<Capture>,
}

impl PathPattern {
    /// Compiles a path pattern with the default options.
    ///
    /// # Errors
    ///
    /// Returns a `PatternError` if the pattern is malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use wayfinder::PathPattern;
    ///
    /// let pattern = PathPattern::new("/posts/:id/comments/:comment_id").unwrap();
    /// let params = pattern.match_path("/posts/123/comments/456").unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// assert_eq!(params.get("comment_id"), Some("456"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Self::with_options(pattern, &PatternOptions::default())
    }

    /// Compiles a path pattern with the given options.
    ///
    /// # Errors
    ///
    /// Returns a `PatternError` if the pattern is malformed.
    pub fn with_options(pattern: &str, options: &PatternOptions) -> Result<Self, PatternError> {
        let segments = parse(pattern, options)?;
        let (regex, keys) = compile(&segments, options)?;

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            regex,
            keys,
        })
    }

    /// Attempts to match a path against this pattern.
    ///
    /// Returns the bound parameters if the path matches. Captures that did
    /// not participate in the match, or matched the empty string, are left
    /// out.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;

        let mut params = PathParams::new();

        for (key, group) in self.keys.iter().zip(caps.iter().skip(1)) {
            match group {
                Some(value) if !value.as_str().is_empty() => {
                    params.insert(key.name.clone(), value.as_str());
                }
                _ => continue,
            }
        }

        Some(params)
    }

    /// Returns true if the path matches this pattern.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the compiled regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the capture keys in group order.
    pub fn keys(&self) -> &[Capture] {
        &self.keys
    }

    /// Returns the parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Generates a path from parameters.
    ///
    /// Optional captures (`?` and `*`) may be missing from `params`; a
    /// missing required capture yields `None`. Values are inserted as given.
    ///
    /// # Example
    ///
    /// ```
    /// use wayfinder::{PathParams, PathPattern};
    ///
    /// let pattern = PathPattern::new("/posts/:id{.:format}?").unwrap();
    /// let params: PathParams = [("id", "123")].into_iter().collect();
    /// assert_eq!(pattern.reverse(&params), Some("/posts/123".to_string()));
    /// ```
    pub fn reverse(&self, params: &PathParams) -> Option<String> {
        let mut path = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal { text } => path.push_str(text),
                Segment::Capture(capture) if !capture.is_capturing() => {
                    if !capture.modifier.is_optional() {
                        path.push_str(&capture.prefix);
                        path.push_str(&capture.suffix);
                    }
                }
                Segment::Capture(capture) => match params.get_param(&capture.name) {
                    Some(value) => {
                        path.push_str(&capture.prefix);
                        path.push_str(value);
                        path.push_str(&capture.suffix);
                    }
                    None if capture.modifier.is_optional() => {}
                    None => return None,
                },
            }
        }

        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_path() {
        let pattern = PathPattern::new("/users").unwrap();
        assert!(pattern.match_path("/users").is_some());
        assert!(pattern.match_path("/users/").is_some());
        assert!(pattern.match_path("/posts").is_none());
        assert!(pattern.match_path("/users/1").is_none());
    }

    #[test]
    fn test_single_param() {
        let pattern = PathPattern::new("/users/:id").unwrap();
        let params = pattern.match_path("/users/123").unwrap();
        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_multiple_params() {
        let pattern = PathPattern::new("/posts/:post_id/comments/:comment_id").unwrap();
        let params = pattern.match_path("/posts/42/comments/7").unwrap();
        assert_eq!(params.get("post_id"), Some("42"));
        assert_eq!(params.get("comment_id"), Some("7"));
    }

    #[test]
    fn test_optional_param() {
        let pattern = PathPattern::new("/users/:id?").unwrap();
        assert!(pattern.match_path("/users").unwrap().is_empty());
        assert_eq!(pattern.match_path("/users/9").unwrap().get("id"), Some("9"));
    }

    #[test]
    fn test_one_or_more() {
        let pattern = PathPattern::new("/tags/:tag+").unwrap();
        assert!(pattern.match_path("/tags").is_none());
        let params = pattern.match_path("/tags/a/b").unwrap();
        assert_eq!(params.get("tag"), Some("a/b"));
    }

    #[test]
    fn test_custom_pattern() {
        let pattern = PathPattern::new(r"/orders/:id(\d+)").unwrap();
        assert_eq!(pattern.match_path("/orders/17").unwrap().get("id"), Some("17"));
        assert!(pattern.match_path("/orders/abc").is_none());
    }

    #[test]
    fn test_suffix_group() {
        let pattern = PathPattern::new("/report{-:year}.pdf").unwrap();
        let params = pattern.match_path("/report-2024.pdf").unwrap();
        assert_eq!(params.get("year"), Some("2024"));
        assert!(pattern.match_path("/report.pdf").is_none());
    }

    #[test]
    fn test_literal_group() {
        let pattern = PathPattern::new("/index{.html}?").unwrap();
        assert!(pattern.match_path("/index").unwrap().is_empty());
        assert!(pattern.match_path("/index.html").unwrap().is_empty());
        assert!(pattern.match_path("/index.htm").is_none());
    }

    #[test]
    fn test_empty_capture_is_skipped() {
        let pattern = PathPattern::new("/raw/(.*)").unwrap();
        let params = pattern.match_path("/raw/").unwrap();
        assert_eq!(params.index(0), None);
    }

    #[test]
    fn test_strict() {
        let options = PatternOptions::new().strict(true);
        let pattern = PathPattern::with_options("/users", &options).unwrap();
        assert!(pattern.is_match("/users"));
        assert!(!pattern.is_match("/users/"));
    }

    #[test]
    fn test_partial_match() {
        let options = PatternOptions::new().end(false);
        let pattern = PathPattern::with_options("/api/:version", &options).unwrap();
        let params = pattern.match_path("/api/v1/users").unwrap();
        assert_eq!(params.get("version"), Some("v1"));
        assert!(!pattern.is_match("/apix"));
    }

    #[test]
    fn test_ends_with() {
        let options = PatternOptions::new().ends_with("?");
        let pattern = PathPattern::with_options("/search/:term", &options).unwrap();
        assert_eq!(
            pattern.match_path("/search/rust?page=2").unwrap().get("term"),
            Some("rust")
        );
    }

    #[test]
    fn test_keys_and_accessors() {
        let pattern = PathPattern::new("/a/:b/(.*)").unwrap();
        assert_eq!(pattern.pattern(), "/a/:b/(.*)");
        assert_eq!(pattern.keys().len(), 2);
        assert_eq!(pattern.segments().len(), 3);
        assert_eq!(pattern.regex().captures_len(), 3);
    }

    #[test]
    fn test_reverse() {
        let pattern = PathPattern::new("/posts/:id").unwrap();
        let params: PathParams = [("id", "123")].into_iter().collect();
        assert_eq!(pattern.reverse(&params), Some("/posts/123".to_string()));
    }

    #[test]
    fn test_reverse_missing_param() {
        let pattern = PathPattern::new("/posts/:id").unwrap();
        assert!(pattern.reverse(&PathParams::new()).is_none());
    }

    #[test]
    fn test_reverse_unnamed_and_groups() {
        let pattern = PathPattern::new("/files{/:path}*/(.*){.bak}").unwrap();
        let params: PathParams = [
            (crate::pattern::ParamName::from("path"), "a/b"),
            (crate::pattern::ParamName::from(0), "c"),
        ]
        .into_iter()
        .collect();
        assert_eq!(pattern.reverse(&params), Some("/files/a/b/c.bak".to_string()));
    }
}
