use std::any::Any;
use std::cell::Cell;
use std::future::{Future, poll_fn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use futures::FutureExt;
use http::StatusCode;
use tracing::{debug, error};

use crate::handler::{Handler, Next};
use crate::request::Request;
use crate::response::Response;

thread_local! {
    static RECOVERING: Cell<usize> = const { Cell::new(0) };
}

/// Held while this thread polls a future guarded by [`recover`]. Released on
/// unwind as well.
struct Recovering;

impl Recovering {
    fn enter() -> Self {
        RECOVERING.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for Recovering {
    fn drop(&mut self) {
        RECOVERING.with(|depth| depth.set(depth.get() - 1));
    }
}

fn recovering() -> bool {
    RECOVERING.with(|depth| depth.get() > 0)
}

/// Turns a panic anywhere inside this layer into `500 Internal Server Error`.
///
/// The panic message is logged as `error: <message>` and the client gets only
/// the reason phrase. Nothing escapes: the connection and the server keep
/// running. Without a panic the inner response is returned as-is.
///
/// Pair with [`install_panic_hook`] to keep the default hook from also
/// printing the panic to stderr.
pub fn recover(next: Next) -> impl Handler {
    move |req: Request| {
        let next = next.clone();
        // `next.run` is called on first poll so a handler that panics before
        // producing its future is caught too.
        let mut inner = Box::pin(async move { next.run(req).await });
        let guarded = AssertUnwindSafe(poll_fn(move |cx| {
            let _recovering = Recovering::enter();
            inner.as_mut().poll(cx)
        }))
        .catch_unwind();
        async move {
            match guarded.await {
                Ok(res) => res,
                Err(payload) => {
                    error!("error: {}", panic_message(&*payload));
                    Response::error(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
    }
}

/// Installs a process-wide panic hook that reports panics [`recover`] is
/// about to catch through `tracing` at DEBUG instead of stderr.
///
/// Every other panic still goes to the hook that was installed before.
/// Only the first call has any effect.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if recovering() {
                let location = info.location().map(|l| l.to_string()).unwrap_or_default();
                debug!(%location, "recovered panic: {}", panic_message(info.payload()));
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Box<dyn Any>"
    }
}

#[cfg(test)]
mod tests {
    use std::future::Ready;

    use super::*;
    use crate::middleware::Chain;
    use crate::testing::{LogCapture, get};

    async fn boom(_req: Request) -> Response {
        panic!("boom")
    }

    async fn formatted(req: Request) -> Response {
        panic!("no handler for {}", req.path())
    }

    async fn about(_req: Request) -> &'static str {
        "About!"
    }

    #[tokio::test]
    async fn panic_becomes_500_with_one_error_line() {
        let logs = LogCapture::default();
        let _guard = logs.install();

        let res = Chain::new().append(recover).then(boom).run(get("/")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.body(), b"Internal Server Error");
        assert_eq!(logs.count("error: boom"), 1);
        assert_eq!(logs.count("ERROR"), 1);
    }

    #[tokio::test]
    async fn formatted_panic_message_is_logged() {
        let logs = LogCapture::default();
        let _guard = logs.install();

        let res = Chain::new().append(recover).then(formatted).run(get("/nope")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(logs.count("error: no handler for /nope"), 1);
    }

    #[tokio::test]
    async fn panic_before_the_future_exists_is_caught() {
        let eager = |_req: Request| -> Ready<Response> { panic!("eager") };

        let res = Chain::new().append(recover).then(eager).run(get("/")).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn no_panic_passes_through() {
        let logs = LogCapture::default();
        let _guard = logs.install();

        let res = Chain::new().append(recover).then(about).run(get("/about")).await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"About!");
        assert!(logs.lines().is_empty());
    }

    #[test]
    fn non_string_payloads_have_a_placeholder() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(&*payload), "Box<dyn Any>");
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*payload), "static");
    }

    async fn flag(_req: Request) -> String {
        recovering().to_string()
    }

    #[tokio::test]
    async fn recovering_only_while_polled_inside_recover() {
        let res = Chain::new().append(recover).then(flag).run(get("/")).await;
        assert_eq!(res.body(), b"true");

        let res = Chain::new().then(flag).run(get("/")).await;
        assert_eq!(res.body(), b"false");
    }

    #[tokio::test]
    async fn hook_sends_recovered_panics_to_tracing_only() {
        install_panic_hook();
        let logs = LogCapture::default();
        let _guard = logs.install_at(tracing::Level::DEBUG);

        let res = Chain::new().append(recover).then(boom).run(get("/")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(logs.count("recovered panic: boom"), 1);
        assert_eq!(logs.count("error: boom"), 1);
        assert_eq!(logs.count("ERROR"), 1);
        assert!(!recovering());
    }
}
