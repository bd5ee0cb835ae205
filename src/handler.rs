//! Handler trait, type erasure, and the [`Next`] handle middleware delegates to.
//!
//! # How handlers are stored
//!
//! A route, a middleware-wrapped route, and the remainder of a chain are all
//! handlers of *different* concrete types. They are hidden behind one trait
//! object (`dyn ErasedHandler`) so the router and the chain can hold them
//! uniformly:
//!
//! ```text
//! async fn index(req: Request) -> Response { … }    ← user writes this
//!        ↓ chain.then(index)
//! index.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(index))                       ← BoxedHandler
//!        ↓ each middleware receives it as `Next` and returns a new Handler
//! recover(Next(..)) → logging(Next(..))            ← one Arc per layer
//!        ↓
//! handler.call(req)  at request time               ← one vtable dispatch per layer
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any `async fn` (or closure returning a future)
/// with the shape
///
/// ```text
/// fn name(req: Request) -> impl Future<Output = impl IntoResponse>
/// ```
///
/// and by [`Next`], so a composed chain can be registered like any other
/// handler. The trait is sealed.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of a middleware chain, as seen from one middleware.
///
/// Cloning is one atomic increment. A middleware usually moves a clone into
/// the future it returns and calls [`Next::run`] from inside it:
///
/// ```rust
/// use layered::{Handler, Next, Request};
///
/// fn tag(next: Next) -> impl Handler {
///     move |req: Request| {
///         let next = next.clone();
///         async move {
///             let res = next.run(req).await;
///             layered::Response::builder()
///                 .status(res.status_code())
///                 .header("x-tag", "1")
///                 .bytes("text/plain; charset=utf-8", res.body().to_vec())
///         }
///     }
/// }
/// ```
#[derive(Clone)]
pub struct Next(BoxedHandler);

impl Next {
    pub(crate) fn new(handler: impl Handler) -> Self {
        Self(handler.into_boxed_handler())
    }

    /// Delegates `req` to the wrapped handler.
    ///
    /// The returned future does not borrow `self`.
    pub fn run(&self, req: Request) -> impl Future<Output = Response> + Send + use<> {
        self.0.call(req)
    }
}

impl private::Sealed for Next {}

impl Handler for Next {
    fn into_boxed_handler(self) -> BoxedHandler {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::testing::get;

    async fn hello(_req: Request) -> &'static str {
        "hello"
    }

    async fn teapot(_req: Request) -> StatusCode {
        StatusCode::IM_A_TEAPOT
    }

    #[tokio::test]
    async fn async_fns_are_handlers() {
        let res = Next::new(hello).run(get("/")).await;
        assert_eq!(res.body(), b"hello");

        let res = Next::new(teapot).run(get("/")).await;
        assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn closures_are_handlers() {
        let greeting = String::from("hi there");
        let next = Next::new(move |_req: Request| {
            let greeting = greeting.clone();
            async move { greeting }
        });
        assert_eq!(next.run(get("/")).await.body(), b"hi there");
    }

    #[tokio::test]
    async fn next_boxes_without_rewrapping() {
        let next = Next::new(hello);
        let boxed = next.clone().into_boxed_handler();
        assert!(Arc::ptr_eq(&next.0, &boxed));
    }
}
