use std::time::Instant;

use tracing::info;

use crate::handler::{Handler, Next};
use crate::request::Request;

/// Logs one line per request once the inner handler has answered:
///
/// ```text
/// [GET] "/about?lang=en" 38.2µs
/// ```
///
/// The target is the path and query only, quoted and escaped, even when the
/// request arrived in absolute form (HTTP/2, proxies). The duration covers
/// everything inside this layer. The response passes through untouched.
pub fn logging(next: Next) -> impl Handler {
    move |req: Request| {
        let next = next.clone();
        async move {
            let method = req.method().clone();
            let target = req.uri().path_and_query().map_or(req.path(), |pq| pq.as_str()).to_owned();

            let started = Instant::now();
            let res = next.run(req).await;
            let elapsed = started.elapsed();

            info!("[{method}] {target:?} {elapsed:?}");
            res
        }
    }
}
