//! Unified error type.

use std::net::AddrParseError;

use thiserror::Error;

/// The error type returned by fabuverse's fallible operations.
///
/// Application-level outcomes (404, 405, 500 from a panicking handler) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces infrastructure failures: a bad bind address, binding to
/// a port, reading configuration, or an identifier generator misbehaving.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The generator returned an empty string or bytes that cannot travel in
    /// an HTTP header.
    #[error("identifier generator produced an unusable value: {0:?}")]
    InvalidId(String),
}
