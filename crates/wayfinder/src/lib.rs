//! # wayfinder
//!
//! Route pattern compilation and request dispatch.
//!
//! This crate provides:
//! - A pattern compiler turning `/users/:id`-style patterns into anchored
//!   regexes with ordered capture keys
//! - A router matching routes in registration order
//! - Short-circuiting stage chains in front of every handler
//! - A typed per-request context store
//! - Panic recovery with a configurable error handler
//! - Route groups and named routes for reverse URL generation
//!
//! ## Quick Start
//!
//! ```
//! use wayfinder::{Request, Response, Router, Stage};
//!
//! async fn user_handler(req: Request) -> Response {
//!     let id = req.path_params().get("id").unwrap_or("unknown");
//!     Response::json(&serde_json::json!({"id": id}))
//! }
//!
//! let router = Router::builder()
//!     .get("/", wayfinder::chain::html("<h1>Hello</h1>"))
//!     .get("/users/:id", Stage::handler(user_handler))
//!     .build()
//!     .unwrap();
//!
//! let response = futures::executor::block_on(router.handle(Request::get("/users/123")));
//! assert_eq!(response.body_string(), Some(r#"{"id":"123"}"#.to_string()));
//! ```
//!
//! ## Patterns
//!
//! ```text
//! /users/:id              named capture
//! /files{/:path}*         repeated group, bound as "a/b/c"
//! /orders/:id(\d+)        custom capture pattern
//! /(.*)/hola/:named/(.*)  unnamed captures, bound as 0 and 1
//! /index{.html}?          optional literal
//! ```
//!
//! Patterns are compiled when the router is built; a malformed pattern
//! fails [`RouterBuilder::build`] instead of surfacing at request time.
//!
//! ## Stages
//!
//! ```
//! use wayfinder::{chain, Chain, Method, Router};
//!
//! let router = Router::builder()
//!     .stage(chain::logging())
//!     .get(
//!         "/admin",
//!         Chain::new()
//!             .stage(chain::basic_auth("admin", "secret"))
//!             .handler(chain::html("welcome")),
//!     )
//!     .build()
//!     .unwrap();
//! # assert_eq!(router.routes().len(), 1);
//! ```

pub mod chain;
pub mod context;
mod error;
mod path;
pub mod pattern;
mod request;
mod response;
mod router;

pub use chain::{BoxFuture, Chain, Stage};
pub use context::{CancelSignal, Context, ContextKey, Recovered};
pub use error::{Result, RouterError};
pub use path::PathPattern;
pub use pattern::{ParamName, PatternError, PatternOptions};
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::{Outcome, Route, RouteGroup, Router, RouterBuilder};
