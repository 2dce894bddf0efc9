//! Unified error type.

use thiserror::Error;

/// The error type returned by rollcall's fallible infrastructure operations.
///
/// Application-level failures (a rejected form, an unknown user) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces the failures that stop the process from serving at
/// all: a bad bind address, a port already in use, a logger that will not
/// install.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to install tracing subscriber: {0}")]
    Tracing(String),
}
