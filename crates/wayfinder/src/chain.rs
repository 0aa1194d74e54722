//! Short-circuiting stage chains.
//!
//! A [`Chain`] runs its stages in order against a request and the response
//! sink. A [`Stage::Predicate`] returns `false` to stop the chain, after
//! writing whatever response it wants the client to see. The first
//! [`Stage::Terminal`] reached ends the chain as the route's handler.
//!
//! ```
//! use wayfinder::{chain, Chain, Method, Request, Response, Stage};
//!
//! # futures::executor::block_on(async {
//! let chain = Chain::new()
//!     .stage(chain::method(Method::Get))
//!     .handler(Stage::handler(|_req| async { Response::text("hello") }));
//!
//! let mut req = Request::post("/");
//! let mut res = Response::default();
//! assert!(!chain.run(&mut req, &mut res).await);
//! assert_eq!(res.status, 400);
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::info;

use crate::context::AuthUserKey;
use crate::request::{Method, Request};
use crate::response::Response;

/// A boxed future for async stage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A stage that decides whether the chain continues.
pub type PredicateFn =
    Arc<dyn for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, bool> + Send + Sync>;

/// A stage that handles the request and ends the chain.
pub type TerminalFn =
    Arc<dyn for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, ()> + Send + Sync>;

/// One step of a [`Chain`].
#[derive(Clone)]
pub enum Stage {
    /// Continues the chain when it resolves to `true`.
    Predicate(PredicateFn),
    /// Handles the request; no later stage runs.
    Terminal(TerminalFn),
}

impl Stage {
    /// Creates an async predicate stage.
    pub fn predicate<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, bool>
            + Send
            + Sync
            + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Creates an async terminal stage that writes into the sink.
    pub fn terminal<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, ()>
            + Send
            + Sync
            + 'static,
    {
        Self::Terminal(Arc::new(f))
    }

    /// Creates a predicate stage from a synchronous check.
    ///
    /// # Example
    ///
    /// ```
    /// use wayfinder::Stage;
    ///
    /// let has_token = Stage::check(|req, res| {
    ///     if req.get_header("X-Token").is_some() {
    ///         return true;
    ///     }
    ///     res.set_status(403);
    ///     false
    /// });
    /// assert!(has_token.is_predicate());
    /// ```
    pub fn check<F>(f: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) -> bool + Send + Sync + 'static,
    {
        Self::predicate(move |req, res| {
            let keep_going = f(req, res);
            Box::pin(async move { keep_going })
        })
    }

    /// Creates a terminal stage from an async handler returning a response.
    ///
    /// The handler receives a copy of the request, context included. Its
    /// response replaces the status and body of the sink and adds its
    /// headers to those written by earlier stages.
    pub fn handler<F, Fut>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self::terminal(move |req, res| {
            let response = f(req.clone());
            Box::pin(async move {
                res.merge(response.await);
            })
        })
    }

    /// Returns true for predicate stages.
    pub fn is_predicate(&self) -> bool {
        matches!(self, Self::Predicate(_))
    }

    /// Returns true for terminal stages.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Predicate"),
            Self::Terminal(_) => f.write_str("Terminal"),
        }
    }
}

/// An ordered list of stages.
#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<Stage>,
}

impl Chain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Appends the terminal stage.
    ///
    /// A chain is only accepted by the router when this is its last stage
    /// and no other stage is terminal; see [`Chain::is_complete`].
    #[must_use]
    pub fn handler(self, stage: Stage) -> Self {
        self.stage(stage)
    }

    /// Inserts stages ahead of the existing ones, keeping their order.
    #[must_use]
    pub fn prepend(mut self, stages: &[Stage]) -> Self {
        self.stages.splice(0..0, stages.iter().cloned());
        self
    }

    /// Returns the stages in run order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns true if the chain is a run of predicates ending in exactly
    /// one terminal stage.
    pub fn is_complete(&self) -> bool {
        match self.stages.split_last() {
            Some((last, rest)) => last.is_terminal() && rest.iter().all(Stage::is_predicate),
            None => false,
        }
    }

    /// Runs the chain.
    ///
    /// Returns true if a terminal stage ran. A predicate returning false
    /// stops the chain, as does running out of stages.
    pub async fn run(&self, req: &mut Request, res: &mut Response) -> bool {
        for stage in &self.stages {
            match stage {
                Stage::Predicate(predicate) => {
                    if !predicate(&mut *req, &mut *res).await {
                        return false;
                    }
                }
                Stage::Terminal(terminal) => {
                    terminal(&mut *req, &mut *res).await;
                    return true;
                }
            }
        }
        false
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.stages).finish()
    }
}

impl From<Stage> for Chain {
    fn from(stage: Stage) -> Self {
        Self {
            stages: vec![stage],
        }
    }
}

impl From<Vec<Stage>> for Chain {
    fn from(stages: Vec<Stage>) -> Self {
        Self { stages }
    }
}

/// Continues only for requests with the given method.
///
/// Other methods get a `400` with the body "unsupported method".
pub fn method(method: Method) -> Stage {
    Stage::check(move |req, res| {
        if req.method == method {
            return true;
        }
        res.set_status(400);
        res.set_header("Content-Type", "text/plain; charset=utf-8");
        res.write("unsupported method");
        false
    })
}

/// Requires HTTP basic credentials matching `user` and `pass`.
///
/// On success the user name is stored under [`AuthUserKey`]. Otherwise the
/// sink gets a `401` challenge and the chain stops.
pub fn basic_auth(user: impl Into<String>, pass: impl Into<String>) -> Stage {
    let user = user.into();
    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!("{user}:{}", pass.into()))
    );

    Stage::check(move |req, res| {
        if req.get_header("Authorization") == Some(expected.as_str()) {
            req.context.insert::<AuthUserKey>(user.clone());
            return true;
        }
        res.set_status(401);
        res.set_header("Content-Type", "text/plain; charset=utf-8");
        res.set_header("WWW-Authenticate", r#"Basic realm="Realm""#);
        res.write("unauthorized");
        false
    })
}

/// Always continues.
pub fn nop() -> Stage {
    Stage::check(|_, _| true)
}

/// Logs each request and continues.
pub fn logging() -> Stage {
    Stage::check(|req, _| {
        info!(method = %req.method, path = %req.path, "request");
        true
    })
}

/// Terminal stage serving a fixed HTML page.
pub fn html(body: impl Into<String>) -> Stage {
    let body = body.into();
    Stage::terminal(move |_, res| {
        let page = Response::html(body.clone());
        Box::pin(async move {
            res.merge(page);
        })
    })
}

/// Terminal stage serving fixed bytes with the given content type.
pub fn file(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Stage {
    let content_type = content_type.into();
    let bytes: Vec<u8> = bytes.into();
    let bytes: Arc<[u8]> = Arc::from(bytes);
    Stage::terminal(move |_, res| {
        let file = Response::with_content(&content_type, bytes.to_vec());
        Box::pin(async move {
            res.merge(file);
        })
    })
}
