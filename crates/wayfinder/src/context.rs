//! Per-request context store.
//!
//! Values are keyed by marker types implementing [`ContextKey`]. Each key
//! fixes the type of its value, so lookups never fail on a type mismatch:
//!
//! ```
//! use wayfinder::context::{Context, ContextKey};
//!
//! struct RequestId;
//!
//! impl ContextKey for RequestId {
//!     type Value = u64;
//! }
//!
//! let mut ctx = Context::new();
//! ctx.insert::<RequestId>(42);
//! assert_eq!(ctx.get::<RequestId>(), Some(&42));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::request::PathParams;

/// A typed key into the [`Context`] store.
pub trait ContextKey: 'static {
    /// The type of value stored under this key.
    type Value: Any + Send + Sync;
}

/// Typed key/value store scoped to a single request.
///
/// Values are reference counted, so cloning a request shares them with the
/// clone instead of copying.
#[derive(Clone, Default)]
pub struct Context {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, replacing any previous value for the key.
    pub fn insert<K: ContextKey>(&mut self, value: K::Value) {
        self.values.insert(TypeId::of::<K>(), Arc::new(value));
    }

    /// Returns the value stored for the key.
    pub fn get<K: ContextKey>(&self) -> Option<&K::Value> {
        self.values
            .get(&TypeId::of::<K>())
            .and_then(|value| value.downcast_ref::<K::Value>())
    }

    /// Returns true if a value is stored for the key.
    pub fn contains<K: ContextKey>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<K>())
    }

    /// Removes the value for the key. Returns true if one was present.
    pub fn remove<K: ContextKey>(&mut self) -> bool {
        self.values.remove(&TypeId::of::<K>()).is_some()
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes all values.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Key for the path parameters bound by the router.
pub struct PathParamsKey;

impl ContextKey for PathParamsKey {
    type Value = PathParams;
}

/// A failure caught by the router while running a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    message: String,
}

impl Recovered {
    /// Creates a recovered failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Builds the failure value from a panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(message) = payload.downcast_ref::<&str>() {
            Self::new(*message)
        } else if let Some(message) = payload.downcast_ref::<String>() {
            Self::new(message.clone())
        } else {
            Self::new("unknown failure")
        }
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Key for the failure recovered by the router.
pub struct RecoveredKey;

impl ContextKey for RecoveredKey {
    type Value = Recovered;
}

/// A cancellation flag shared between a transport and a request.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancelSignal {
    /// Creates a signal that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the request as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Key for a transport-provided cancellation signal.
pub struct CancellationKey;

impl ContextKey for CancellationKey {
    type Value = CancelSignal;
}

/// Key for the user name authenticated by the basic auth stage.
pub struct AuthUserKey;

impl ContextKey for AuthUserKey {
    type Value = String;
}
