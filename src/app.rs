//! The demo application: two static pages behind one shared middleware chain.

use std::net::SocketAddr;

use crate::middleware::{self, Chain};
use crate::{Request, Response, Router};

/// Where the demo listens. Not configurable.
pub const ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
    8085,
);

pub async fn index(_req: Request) -> Response {
    Response::text("Welcome!")
}

pub async fn about(_req: Request) -> Response {
    Response::text("About!")
}

/// The middleware every route shares: request logging outside panic recovery.
pub fn common() -> Chain {
    Chain::new()
        .append(middleware::logging)
        .append(middleware::recover)
}

/// Routes `/` and `/about`, any method.
///
/// `/` also catches every path without a route of its own, so `/anything`
/// gets the index page.
pub fn app() -> Router {
    let common = common();
    Router::new()
        .any("/", common.then(index))
        .any("/about", common.then(about))
        .fallback(common.then(index))
}
