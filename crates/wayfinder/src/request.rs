//! HTTP request type.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::context::{CancellationKey, Context, PathParamsKey, Recovered, RecoveredKey};
use crate::error::RouterError;
use crate::pattern::ParamName;

/// HTTP request methods.
///
/// Methods outside the common set, e.g. `PROPFIND`, are kept as
/// [`Method::Other`] and compared by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
    /// Any other method token, upper-cased.
    Other(String),
}

impl Method {
    /// Returns the method as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Other(name) => name,
        }
    }
}

/// Characters allowed in a method token.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

impl FromStr for Method {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            other if !other.is_empty() && other.chars().all(is_token_char) => {
                Ok(Self::Other(other.to_string()))
            }
            _ => Err(RouterError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Path parameters bound by a matched route.
///
/// Named captures are looked up with [`get`](Self::get), unnamed ones with
/// [`index`](Self::index). Repeated captures hold the whole matched text,
/// delimiters included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: BTreeMap<ParamName, String>,
}

static EMPTY_PARAMS: PathParams = PathParams::new();

impl PathParams {
    /// Creates new empty path params.
    pub const fn new() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    /// Inserts a parameter.
    pub fn insert(&mut self, key: impl Into<ParamName>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Gets a named parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(&ParamName::Named(key.to_string()))
            .map(String::as_str)
    }

    /// Gets an unnamed parameter value by its capture index.
    pub fn index(&self, index: usize) -> Option<&str> {
        self.params.get(&ParamName::Index(index)).map(String::as_str)
    }

    /// Gets a parameter value by name or index.
    pub fn get_param(&self, name: &ParamName) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Gets a named parameter value or returns an error.
    pub fn require(&self, key: &str) -> Result<&str, RouterError> {
        self.get(key)
            .ok_or_else(|| RouterError::MissingParam(key.to_string()))
    }

    /// Parses a named parameter as a specific type.
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns the number of bound parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&ParamName, &str)> {
        self.params.iter().map(|(k, v)| (k, v.as_str()))
    }
}

impl Serialize for PathParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.params.iter().map(|(k, v)| (k.to_string(), v)))
    }
}

impl<K: Into<ParamName>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// An HTTP request.
///
/// Besides the transport-supplied fields, a request owns a [`Context`] that
/// lives exactly as long as the request and carries values derived while
/// dispatching it.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Vec<u8>,
    /// Per-request context store.
    pub context: Context,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
            context: Context::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the path parameters bound by the router.
    ///
    /// Empty before dispatch and for requests that matched no route.
    pub fn path_params(&self) -> &PathParams {
        self.context
            .get::<PathParamsKey>()
            .unwrap_or(&EMPTY_PARAMS)
    }

    /// Returns the failure recovered by the router, if any.
    pub fn recovered(&self) -> Option<&Recovered> {
        self.context.get::<RecoveredKey>()
    }

    /// Returns true if the transport signalled cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.context
            .get::<CancellationKey>()
            .is_some_and(|signal| signal.is_cancelled())
    }
}
