//! HTTP server.
//!
//! One tokio task per accepted connection; hyper-util's `auto` builder speaks
//! HTTP/1.1 or HTTP/2, whichever the client negotiates. Requests share
//! nothing but the read-only [`Router`]. The server runs until the process
//! is stopped.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// use layered::Server;
    /// let server = Server::bind(([0, 0, 0, 0], 8085));
    /// ```
    pub fn bind(addr: impl Into<SocketAddr>) -> Self {
        Self { addr: addr.into() }
    }

    /// Binds the listener and serves `router` on it.
    ///
    /// Only returns early, with an error, if the address cannot be bound.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        Self::serve_listener(listener, router).await
    }

    /// Serves `router` on an already-bound listener.
    pub async fn serve_listener(listener: TcpListener, router: Router) -> Result<(), Error> {
        let router = Arc::new(router);
        let addr = listener.local_addr()?;

        info!(%addr, "listening");

        loop {
            let (stream, remote_addr) = match listener.accept().await {
                Ok(v) => v,
                Err(e) => {
                    error!("accept error: {e}");
                    continue;
                }
            };

            let router = Arc::clone(&router);
            let io = TokioIo::new(stream);

            tokio::spawn(async move {
                // Called once per request on the connection.
                let svc = service_fn(move |req| {
                    let router = Arc::clone(&router);
                    async move { dispatch(&router, req).await }
                });

                if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                    .serve_connection(io, svc)
                    .await
                {
                    debug!(peer = %remote_addr, "connection error: {e}");
                }
            });
        }
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads one request fully, routes it, and produces one response.
///
/// Never fails towards hyper: a body that cannot be read becomes `400`, and
/// handler panics are the middleware's business.
async fn dispatch(
    router: &Router,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!("failed to read request body: {e}");
            return Ok(Response::error(StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let req = Request::new(parts.method, parts.uri, parts.headers, body);
    Ok(router.handle(req).await.into_inner())
}
