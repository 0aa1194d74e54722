//! Segment to regex compilation.
//!
//! Each capture with a pattern becomes exactly one capturing group, so the
//! returned keys line up with the regex groups: group `i` binds `keys[i - 1]`.

use regex::Regex;

use super::error::CompileError;
use super::options::{char_class, PatternOptions};
use super::segment::{Capture, Modifier, Segment};

/// Emits the regex source for a segment list along with its capture keys.
///
/// # Example
///
/// ```
/// use wayfinder::pattern::{parse, to_regex_source};
/// use wayfinder::PatternOptions;
///
/// let options = PatternOptions::default();
/// let segments = parse("/users/:id", &options).unwrap();
/// let (source, keys) = to_regex_source(&segments, &options);
/// assert_eq!(source, r"^/users(?:/([^/\#\?]+?))[/\#\?]?$");
/// assert_eq!(keys.len(), 1);
/// ```
pub fn to_regex_source(segments: &[Segment], options: &PatternOptions) -> (String, Vec<Capture>) {
    let mut route = String::new();
    let mut keys = Vec::new();

    if options.start {
        route.push('^');
    }

    for segment in segments {
        match segment {
            Segment::Literal { text } => route.push_str(&regex::escape(text)),
            Segment::Capture(capture) => {
                emit_capture(&mut route, capture);
                if capture.is_capturing() {
                    keys.push(capture.clone());
                }
            }
        }
    }

    let delimiter = char_class(&options.delimiter, false);
    // The backend has no lookahead, so the end boundary is matched rather
    // than asserted. Only match existence and group values are observed.
    let ends_with = char_class(&options.ends_with, false).map(|class| format!("{class}|$"));

    if options.end {
        if !options.strict {
            if let Some(delimiter) = &delimiter {
                route.push_str(delimiter);
                route.push('?');
            }
        }
        match &ends_with {
            Some(ends_with) => route.push_str(&format!("(?:{ends_with})")),
            None => route.push('$'),
        }
    } else if !ends_on_delimiter(segments, options) {
        let boundary = match (delimiter, ends_with) {
            (Some(delimiter), Some(ends_with)) => format!("(?:{delimiter}|{ends_with})"),
            (Some(delimiter), None) => format!("(?:{delimiter}|$)"),
            (None, Some(ends_with)) => format!("(?:{ends_with})"),
            (None, None) => "$".to_string(),
        };
        route.push_str(&boundary);
    }

    (route, keys)
}

/// Compiles segments into an anchored regex and its ordered capture keys.
///
/// # Errors
///
/// Returns `CompileError::InvalidAutomaton` if the regex backend rejects the
/// emitted expression, e.g. because a custom pattern is not valid regex.
pub fn compile(
    segments: &[Segment],
    options: &PatternOptions,
) -> Result<(Regex, Vec<Capture>), CompileError> {
    let (source, keys) = to_regex_source(segments, options);
    let regex = Regex::new(&source).map_err(|error| CompileError::InvalidAutomaton {
        regex: source.clone(),
        error,
    })?;
    Ok((regex, keys))
}

fn emit_capture(route: &mut String, capture: &Capture) {
    let prefix = regex::escape(&capture.prefix);
    let suffix = regex::escape(&capture.suffix);
    let pattern = &capture.pattern;
    let modifier = capture.modifier.as_str();

    if !capture.is_capturing() {
        route.push_str(&format!("(?:{prefix}{suffix}){modifier}"));
        return;
    }

    if prefix.is_empty() && suffix.is_empty() {
        if capture.modifier.is_repeating() {
            route.push_str(&format!("((?:{pattern}){modifier})"));
        } else {
            route.push_str(&format!("({pattern}){modifier}"));
        }
        return;
    }

    if capture.modifier.is_repeating() {
        // One group for the whole repetition, joined by suffix and prefix.
        let repeat = if capture.modifier == Modifier::ZeroOrMore {
            "?"
        } else {
            ""
        };
        route.push_str(&format!(
            "(?:{prefix}((?:{pattern})(?:{suffix}{prefix}(?:{pattern}))*){suffix}){repeat}"
        ));
    } else {
        route.push_str(&format!("(?:{prefix}({pattern}){suffix}){modifier}"));
    }
}

/// Returns true if the pattern already ends on a delimiter character.
fn ends_on_delimiter(segments: &[Segment], options: &PatternOptions) -> bool {
    match segments.last() {
        None => true,
        Some(Segment::Literal { text }) => text
            .chars()
            .last()
            .is_some_and(|c| options.delimiter.contains(c)),
        Some(Segment::Capture(_)) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse;
    use crate::pattern::segment::ParamName;

    fn source(pattern: &str, options: &PatternOptions) -> String {
        let segments = parse(pattern, options).unwrap();
        to_regex_source(&segments, options).0
    }

    fn source_default(pattern: &str) -> String {
        source(pattern, &PatternOptions::default())
    }

    #[test]
    fn test_literal() {
        assert_eq!(source_default("/a.b"), r"^/a\.b[/\#\?]?$");
    }

    #[test]
    fn test_named_capture() {
        assert_eq!(
            source_default("/users/:id"),
            r"^/users(?:/([^/\#\?]+?))[/\#\?]?$"
        );
    }

    #[test]
    fn test_optional_capture() {
        assert_eq!(
            source_default("/users/:id?"),
            r"^/users(?:/([^/\#\?]+?))?[/\#\?]?$"
        );
    }

    #[test]
    fn test_repeating_capture_with_prefix() {
        assert_eq!(
            source_default("/files{/:path}*"),
            r"^/files(?:/((?:[^/\#\?]+?)(?:/(?:[^/\#\?]+?))*))?[/\#\?]?$"
        );
        assert_eq!(
            source_default("/files{/:path}+"),
            r"^/files(?:/((?:[^/\#\?]+?)(?:/(?:[^/\#\?]+?))*))[/\#\?]?$"
        );
    }

    #[test]
    fn test_repeating_capture_without_prefix() {
        assert_eq!(source_default(r"-(\d)+"), r"^\-((?:\d)+)[/\#\?]?$");
    }

    #[test]
    fn test_custom_pattern_without_prefix() {
        assert_eq!(source_default("a(.*)"), r"^a(.*)[/\#\?]?$");
    }

    #[test]
    fn test_literal_group() {
        assert_eq!(
            source_default("/index{.html}?"),
            r"^/index(?:\.html)?[/\#\?]?$"
        );
    }

    #[test]
    fn test_keys_follow_group_order() {
        let options = PatternOptions::default();
        let segments = parse("/:a{.b}?/(.*)", &options).unwrap();
        let (_, keys) = to_regex_source(&segments, &options);
        let names: Vec<ParamName> = keys.into_iter().map(|k| k.name).collect();
        assert_eq!(names, vec![ParamName::from("a"), ParamName::from(0)]);
    }

    #[test]
    fn test_strict() {
        let options = PatternOptions::new().strict(true);
        assert_eq!(source("/a", &options), r"^/a$");
    }

    #[test]
    fn test_ends_with() {
        let options = PatternOptions::new().ends_with("?");
        assert_eq!(source("/a", &options), r"^/a[/\#\?]?(?:[\?]|$)");
    }

    #[test]
    fn test_partial_match() {
        let options = PatternOptions::new().end(false);
        assert_eq!(source("/a", &options), r"^/a(?:[/\#\?]|$)");
        assert_eq!(source("/a/", &options), r"^/a/");
    }

    #[test]
    fn test_unanchored_start() {
        let options = PatternOptions::new().start(false);
        assert_eq!(source("/a", &options), r"/a[/\#\?]?$");
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let options = PatternOptions::default();
        let segments = parse("/([a-)", &options).unwrap();
        let err = compile(&segments, &options).unwrap_err();
        assert!(matches!(err, CompileError::InvalidAutomaton { .. }));
    }
}
