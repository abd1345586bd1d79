//! Crate error type
//!
//! Only conditions that cross the crate boundary appear here. Per-request
//! file failures never do; they degrade into 500 responses instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A response reached serialization with its status still unset.
    #[error("response status was never set")]
    StatusUnset,

    /// The configured error document could not be opened at startup. The
    /// embedding process should refuse to start serving.
    #[error("error page '{}' is missing or unreadable", path.display())]
    ErrorPage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A header key or value was rejected while assembling the wire
    /// response.
    #[error("failed to assemble response head: {0}")]
    Http(#[from] hyper::http::Error),
}
