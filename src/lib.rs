//! # layered
//!
//! Reusable middleware chains for hyper services.
//!
//! Cross-cutting request handling (logging, panic recovery, anything else)
//! is written once as middleware, collected into a [`Chain`], and applied to
//! every route with [`Chain::then`]. A request enters the first middleware of
//! the chain, travels inward to the route handler, and the response travels
//! back out through the same layers in reverse.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use layered::middleware::{self, Chain};
//! use layered::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let common = Chain::new()
//!         .append(middleware::logging)
//!         .append(middleware::recover);
//!
//!     let app = Router::new()
//!         .any("/", common.then(index))
//!         .any("/about", common.then(about));
//!
//!     Server::bind(([0, 0, 0, 0], 8085)).serve(app).await.unwrap();
//! }
//!
//! async fn index(_req: Request) -> Response {
//!     Response::text("Welcome!")
//! }
//!
//! async fn about(_req: Request) -> Response {
//!     Response::text("About!")
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod middleware;

#[cfg(test)]
mod testing;

pub use error::Error;
pub use handler::{Handler, Next};
pub use middleware::{Chain, Middleware};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
