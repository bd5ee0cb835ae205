//! Radix-tree request router.
//!
//! One tree per HTTP method plus one tree for routes that answer any method.
//! Method-specific routes win over any-method routes; a request that matches
//! neither goes to the fallback, or gets `404` when there is none.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Every registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    any: MatchitRouter<BoxedHandler>,
    fallback: Option<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), any: MatchitRouter::new(), fallback: None }
    }

    /// Register a handler for a method + exact path pair.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or is already registered for
    /// `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        let tree = self.routes.entry(method).or_default();
        insert(tree, path, handler.into_boxed_handler());
        self
    }

    /// Register a handler that answers every method on `path`.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Router::on`].
    pub fn any(mut self, path: &str, handler: impl Handler) -> Self {
        insert(&mut self.any, path, handler.into_boxed_handler());
        self
    }

    /// Handler for requests no route matches. Replaces any earlier fallback.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    /// Routes `req` and awaits the matched handler.
    pub async fn handle(&self, req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Some(handler) => handler.call(req).await,
            None => match &self.fallback {
                Some(handler) => handler.call(req).await,
                None => Response::status(StatusCode::NOT_FOUND),
            },
        }
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<BoxedHandler> {
        let matched = self.routes.get(method)
            .and_then(|tree| tree.at(path).ok())
            .or_else(|| self.any.at(path).ok())?;
        Some(Arc::clone(matched.value))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn insert(tree: &mut MatchitRouter<BoxedHandler>, path: &str, handler: BoxedHandler) {
    tree.insert(path, handler)
        .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
}
