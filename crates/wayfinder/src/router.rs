//! Main router implementation.
//!
//! Routes are collected by a [`RouterBuilder`] and compiled once in
//! [`RouterBuilder::build`]. The resulting [`Router`] is immutable and can
//! be shared between concurrently handled requests.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, error};

use crate::chain::{BoxFuture, Chain, Stage};
use crate::context::{PathParamsKey, Recovered, RecoveredKey};
use crate::error::{Result, RouterError};
use crate::path::PathPattern;
use crate::pattern::PatternOptions;
use crate::request::{Method, PathParams, Request};
use crate::response::Response;

/// Terminal state reached by [`Router::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A route matched and its chain ran.
    Dispatched,
    /// No route matched; the not-found handler ran.
    NotFound,
    /// The route failed; the error handler ran.
    Recovered,
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    name: Option<String>,
    method: Method,
    pattern: PathPattern,
    chain: Chain,
}

impl Route {
    /// Returns the route name, if it was registered with one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the compiled path pattern.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the chain run for matching requests.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }
}

/// A route as registered, before its pattern is compiled.
struct RouteEntry {
    name: Option<String>,
    method: Method,
    pattern: String,
    chain: Chain,
}

/// A group of routes with a common prefix and shared stages.
///
/// # Example
///
/// ```
/// use wayfinder::{chain, Router, RouteGroup};
///
/// let api = RouteGroup::new("/api/v1")
///     .stage(chain::basic_auth("admin", "secret"))
///     .get("/users", chain::html("users"))
///     .get("/users/:id", chain::html("user"));
///
/// let router = Router::builder().group(api).build().unwrap();
/// assert_eq!(router.routes()[1].pattern().pattern(), "/api/v1/users/:id");
/// ```
pub struct RouteGroup {
    /// Pattern prefix for all routes in this group.
    prefix: String,
    /// Routes in this group.
    entries: Vec<RouteEntry>,
    /// Stages run before each route's own chain.
    stages: Vec<Stage>,
}

impl RouteGroup {
    /// Creates a new route group with the given prefix.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            entries: Vec::new(),
            stages: Vec::new(),
        }
    }

    /// Adds a stage to every route of the group.
    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Adds a GET route.
    #[must_use]
    pub fn get(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Get, path, chain)
    }

    /// Adds a POST route.
    #[must_use]
    pub fn post(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Post, path, chain)
    }

    /// Adds a PUT route.
    #[must_use]
    pub fn put(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Put, path, chain)
    }

    /// Adds a PATCH route.
    #[must_use]
    pub fn patch(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Patch, path, chain)
    }

    /// Adds a DELETE route.
    #[must_use]
    pub fn delete(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Delete, path, chain)
    }

    /// Adds a route with any method.
    #[must_use]
    pub fn route(mut self, method: Method, path: &str, chain: impl Into<Chain>) -> Self {
        self.entries.push(RouteEntry {
            name: None,
            method,
            pattern: format!("{}{}", self.prefix, path),
            chain: chain.into(),
        });
        self
    }

    /// Adds a named route.
    #[must_use]
    pub fn named(mut self, name: &str, method: Method, path: &str, chain: impl Into<Chain>) -> Self {
        self = self.route(method, path, chain);
        if let Some(entry) = self.entries.last_mut() {
            entry.name = Some(name.to_string());
        }
        self
    }

    fn into_entries(self) -> Vec<RouteEntry> {
        let stages = self.stages;
        self.entries
            .into_iter()
            .map(|entry| RouteEntry {
                chain: entry.chain.prepend(&stages),
                ..entry
            })
            .collect()
    }
}

/// Collects routes, stages and fallbacks for a [`Router`].
pub struct RouterBuilder {
    entries: Vec<RouteEntry>,
    stages: Vec<Stage>,
    options: PatternOptions,
    not_found: Option<Chain>,
    internal_error: Option<Chain>,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterBuilder {
    /// Creates an empty builder with default pattern options.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            stages: Vec::new(),
            options: PatternOptions::default(),
            not_found: None,
            internal_error: None,
        }
    }

    /// Adds a GET route.
    #[must_use]
    pub fn get(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Get, path, chain)
    }

    /// Adds a POST route.
    #[must_use]
    pub fn post(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Post, path, chain)
    }

    /// Adds a PUT route.
    #[must_use]
    pub fn put(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Put, path, chain)
    }

    /// Adds a PATCH route.
    #[must_use]
    pub fn patch(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Patch, path, chain)
    }

    /// Adds a DELETE route.
    #[must_use]
    pub fn delete(self, path: &str, chain: impl Into<Chain>) -> Self {
        self.route(Method::Delete, path, chain)
    }

    /// Adds a route with any method.
    #[must_use]
    pub fn route(mut self, method: Method, path: &str, chain: impl Into<Chain>) -> Self {
        self.entries.push(RouteEntry {
            name: None,
            method,
            pattern: path.to_string(),
            chain: chain.into(),
        });
        self
    }

    /// Adds a named route for [`Router::url_for`].
    #[must_use]
    pub fn named(mut self, name: &str, method: Method, path: &str, chain: impl Into<Chain>) -> Self {
        self.entries.push(RouteEntry {
            name: Some(name.to_string()),
            method,
            pattern: path.to_string(),
            chain: chain.into(),
        });
        self
    }

    /// Adds a stage run before every route's chain.
    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Adds a route group.
    #[must_use]
    pub fn group(mut self, group: RouteGroup) -> Self {
        self.entries.extend(group.into_entries());
        self
    }

    /// Sets the options every pattern is compiled with.
    #[must_use]
    pub fn options(mut self, options: PatternOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the handler for requests no route matches.
    #[must_use]
    pub fn not_found(mut self, chain: impl Into<Chain>) -> Self {
        self.not_found = Some(chain.into());
        self
    }

    /// Replaces the handler for requests whose route failed.
    ///
    /// The failure is available through [`Request::recovered`].
    #[must_use]
    pub fn internal_error(mut self, chain: impl Into<Chain>) -> Self {
        self.internal_error = Some(chain.into());
        self
    }

    /// Compiles every route.
    ///
    /// # Errors
    ///
    /// Fails on the first pattern that does not compile, on a route name
    /// registered twice, or on a route or fallback whose chain is not a run
    /// of predicates ending in one terminal stage. No router is built in
    /// any of these cases.
    pub fn build(self) -> Result<Router> {
        let mut routes = Vec::with_capacity(self.entries.len());
        let mut named = HashMap::new();

        for entry in self.entries {
            let chain = entry.chain.prepend(&self.stages);
            if !chain.is_complete() {
                return Err(RouterError::IncompleteChain {
                    target: format!("{} {}", entry.method, entry.pattern),
                });
            }

            let pattern = PathPattern::with_options(&entry.pattern, &self.options).map_err(
                |source| RouterError::InvalidPattern {
                    method: entry.method.to_string(),
                    pattern: entry.pattern.clone(),
                    source,
                },
            )?;

            debug!(
                method = %entry.method,
                pattern = %entry.pattern,
                regex = pattern.regex().as_str(),
                "compiled route"
            );

            if let Some(name) = &entry.name {
                match named.entry(name.clone()) {
                    Entry::Occupied(_) => return Err(RouterError::DuplicateRouteName(name.clone())),
                    Entry::Vacant(slot) => {
                        slot.insert(routes.len());
                    }
                }
            }

            routes.push(Route {
                name: entry.name,
                method: entry.method,
                pattern,
                chain,
            });
        }

        let not_found = self.not_found.unwrap_or_else(default_not_found);
        let internal_error = self.internal_error.unwrap_or_else(default_internal_error);
        for (target, chain) in [("not_found", &not_found), ("internal_error", &internal_error)] {
            if !chain.is_complete() {
                return Err(RouterError::IncompleteChain {
                    target: target.to_string(),
                });
            }
        }

        Ok(Router {
            routes,
            named,
            not_found,
            internal_error,
        })
    }
}

/// Dispatches requests to the first matching route.
///
/// # Example
///
/// ```
/// use wayfinder::{Request, Response, Router, Stage};
///
/// let router = Router::builder()
///     .get("/users/:id", Stage::handler(|req| async move {
///         let id = req.path_params().get("id").unwrap_or_default().to_string();
///         Response::text(format!("user {id}"))
///     }))
///     .build()
///     .unwrap();
///
/// let res = futures::executor::block_on(router.handle(Request::get("/users/42")));
/// assert_eq!(res.body_string(), Some("user 42".to_string()));
/// ```
#[derive(Debug)]
pub struct Router {
    /// Routes in registration order.
    routes: Vec<Route>,
    /// Route indices by name.
    named: HashMap<String, usize>,
    not_found: Chain,
    internal_error: Chain,
}

impl Router {
    /// Returns a builder for a new router.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Returns the routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Generates a URL for a named route.
    pub fn url_for(&self, name: &str, params: &PathParams) -> Option<String> {
        self.named
            .get(name)
            .and_then(|&index| self.routes.get(index))
            .and_then(|route| route.pattern.reverse(params))
    }

    /// Finds the first route, in registration order, matching the method
    /// and path.
    pub fn find_route(&self, method: &Method, path: &str) -> Option<(&Route, PathParams)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| route.pattern.match_path(path).map(|params| (route, params)))
    }

    /// Dispatches a request, writing the result into `res`.
    ///
    /// A panic raised by the route's chain is caught here. The response is
    /// reset, the failure is stored in the request context and the error
    /// handler runs in its place.
    pub async fn dispatch(&self, req: &mut Request, res: &mut Response) -> Outcome {
        let routed = AssertUnwindSafe(self.route_request(&mut *req, &mut *res))
            .catch_unwind()
            .await;

        match routed {
            Ok(outcome) => outcome,
            Err(payload) => {
                let failure = Recovered::from_panic(payload.as_ref());
                self.recover(req, res, failure).await;
                Outcome::Recovered
            }
        }
    }

    /// Handles a request and returns its response.
    pub fn handle(&self, mut req: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            let mut res = Response::default();
            self.dispatch(&mut req, &mut res).await;
            res
        })
    }

    async fn route_request(&self, req: &mut Request, res: &mut Response) -> Outcome {
        let Some((route, params)) = self.find_route(&req.method, &req.path) else {
            debug!(method = %req.method, path = %req.path, "no route matched");
            self.not_found.run(req, res).await;
            return Outcome::NotFound;
        };

        debug!(
            method = %req.method,
            path = %req.path,
            pattern = route.pattern.pattern(),
            "dispatching"
        );
        req.context.insert::<PathParamsKey>(params);
        route.chain.run(req, res).await;
        Outcome::Dispatched
    }

    async fn recover(&self, req: &mut Request, res: &mut Response, failure: Recovered) {
        error!(
            method = %req.method,
            path = %req.path,
            failure = %failure,
            "recovered from handler failure"
        );
        req.context.insert::<RecoveredKey>(failure);
        *res = Response::default();

        let handled = AssertUnwindSafe(self.internal_error.run(&mut *req, &mut *res))
            .catch_unwind()
            .await;

        if let Err(payload) = handled {
            let failure = Recovered::from_panic(payload.as_ref());
            error!(
                method = %req.method,
                path = %req.path,
                failure = %failure,
                "error handler failed"
            );
            *res = Response::internal_server_error();
        }
    }
}

fn default_not_found() -> Chain {
    Chain::from(Stage::terminal(|req, res| {
        let body = format!("{} {} not found", req.method, req.path);
        Box::pin(async move {
            res.merge(Response::text(body).status(404));
        })
    }))
}

fn default_internal_error() -> Chain {
    Chain::from(Stage::terminal(|req, res| {
        let failure = req
            .recovered()
            .map_or_else(|| "unknown failure".to_string(), ToString::to_string);
        Box::pin(async move {
            res.merge(Response::text(format!("internal server error: {failure}")).status(500));
        })
    }))
}
