//! Infrastructure error type.

use std::fmt;

/// Returned by [`Server::serve`](crate::Server::serve) when the listener
/// cannot be bound.
///
/// A handler never produces an `Error`. Panics inside handlers are turned
/// into `500` responses by [`middleware::recover`](crate::middleware::recover)
/// and everything else a handler wants to say is a [`Response`](crate::Response).
#[derive(Debug)]
pub struct Error(std::io::Error);

impl Error {
    /// The underlying I/O error.
    pub fn io(&self) -> &std::io::Error {
        &self.0
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}
