//! Test helpers: request construction and log capture.

use std::io;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::{HeaderMap, Method};
use tracing::Level;
use tracing::subscriber::DefaultGuard;

use crate::request::Request;

pub(crate) fn request(method: Method, uri: &str) -> Request {
    Request::new(method, uri.parse().unwrap(), HeaderMap::new(), Bytes::new())
}

pub(crate) fn get(uri: &str) -> Request {
    request(Method::GET, uri)
}

/// In-memory sink for `tracing_subscriber::fmt` output.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Routes this thread's tracing events into the capture until the guard drops.
    ///
    /// `#[tokio::test]` runs on a current-thread runtime, so every event a
    /// test's futures emit lands here.
    pub(crate) fn install(&self) -> DefaultGuard {
        self.install_at(Level::INFO)
    }

    pub(crate) fn install_at(&self, level: Level) -> DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_owned).collect()
    }

    pub(crate) fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
