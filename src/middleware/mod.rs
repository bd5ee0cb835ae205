//! Middleware and middleware chains.
//!
//! A middleware is any `Fn(Next) -> impl Handler`: it receives the rest of
//! the chain and returns a handler that does its work before and/or after
//! delegating to it. [`Chain`] collects middleware once and wraps any number
//! of routes with the same stack:
//!
//! ```rust
//! use layered::middleware::{self, Chain};
//! use layered::{Request, Router};
//!
//! async fn index(_req: Request) -> &'static str { "Welcome!" }
//! async fn about(_req: Request) -> &'static str { "About!" }
//!
//! let common = Chain::new()
//!     .append(middleware::logging)
//!     .append(middleware::recover);
//!
//! let app = Router::new()
//!     .any("/", common.then(index))
//!     .any("/about", common.then(about));
//! ```
//!
//! Order matters. The first middleware appended is the outermost: it sees the
//! request first and the response last. With `[logging, recover]`, a handler
//! panic is turned into a `500` by `recover` before `logging` writes its line,
//! so every request is logged whatever the outcome.

mod logging;
mod recover;

use std::fmt;
use std::sync::Arc;

use crate::handler::{Handler, Next};

pub use logging::logging;
pub use recover::{install_panic_hook, recover};

// ── Middleware trait ──────────────────────────────────────────────────────────

/// A handler decorator.
///
/// Implemented for every `Fn(Next) -> H` where `H` is a [`Handler`], so plain
/// functions like [`logging`] and [`recover`] are middleware as-is.
pub trait Middleware: Send + Sync + 'static {
    /// Wraps `next`, returning the new entry point of the chain.
    fn wrap(&self, next: Next) -> Next;
}

impl<F, H> Middleware for F
where
    F: Fn(Next) -> H + Send + Sync + 'static,
    H: Handler,
{
    fn wrap(&self, next: Next) -> Next {
        Next::new(self(next))
    }
}

// ── Chain ─────────────────────────────────────────────────────────────────────

/// An ordered, immutable list of middleware.
///
/// `append` and `extend` return a new chain and leave the receiver alone, so
/// a shared base chain can be branched per route group without the branches
/// seeing each other's additions.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// A new chain with `middleware` added innermost.
    pub fn append(&self, middleware: impl Middleware) -> Self {
        let mut layers = self.layers.clone();
        layers.push(Arc::new(middleware));
        Self { layers }
    }

    /// A new chain with every layer of `other` added after this chain's layers.
    pub fn extend(&self, other: &Chain) -> Self {
        let mut layers = self.layers.clone();
        layers.extend(other.layers.iter().cloned());
        Self { layers }
    }

    /// Wraps `handler` in every layer, the first appended outermost.
    ///
    /// The chain is not consumed; call it once per route.
    pub fn then(&self, handler: impl Handler) -> Next {
        self.layers
            .iter()
            .rev()
            .fold(Next::new(handler), |next, layer| layer.wrap(next))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("layers", &self.layers.len()).finish()
    }
}
