#![allow(dead_code)]

use wayfinder::pattern::ParseError;
use wayfinder::{Outcome, PathParams, PathPattern, PatternError, Request, Response, Router};

pub fn pattern(source: &str) -> PathPattern {
    PathPattern::new(source).unwrap_or_else(|e| panic!("Failed to compile: {source}\nError: {e:?}"))
}

pub fn match_ok(source: &str, path: &str) -> PathParams {
    pattern(source)
        .match_path(path)
        .unwrap_or_else(|| panic!("Expected {source} to match {path}"))
}

pub fn assert_no_match(source: &str, path: &str) {
    assert!(
        pattern(source).match_path(path).is_none(),
        "Expected {source} not to match {path}"
    );
}

pub fn parse_err(source: &str) -> ParseError {
    match PathPattern::new(source) {
        Err(PatternError::Parse(e)) => e,
        Err(other) => panic!("Expected parse error for: {source}, got {other:?}"),
        Ok(_) => panic!("Expected parse error for: {source}"),
    }
}

/// Dispatches a request and returns the outcome with the request and
/// response as they were left.
pub async fn dispatch(router: &Router, mut req: Request) -> (Outcome, Request, Response) {
    let mut res = Response::default();
    let outcome = router.dispatch(&mut req, &mut res).await;
    (outcome, req, res)
}

pub fn body(res: &Response) -> String {
    res.body_string().unwrap_or_default()
}
