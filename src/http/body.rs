//! Body loading module
//!
//! Resolves response body bytes either by zero-copy mapping a file from the
//! document root or by handing over an owned in-memory buffer. File access
//! failures never escape to the caller: the canned error document is
//! substituted, and a built-in page covers the case where even that file is
//! unreadable.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use memmap2::Mmap;

use crate::error::Error;
use crate::logger;

/// Last-resort body when the canned error document itself cannot be read.
/// Requires no file access, so it is always available.
const BUILTIN_ERROR_PAGE: &[u8] =
    b"<!DOCTYPE html><html><head><title>500 Internal Server Error</title></head>\
<body><h1>500 Internal Server Error</h1></body></html>";

/// Response body bytes with their release regime.
///
/// A mapped body is unmapped on drop, an owned body is freed on drop; the
/// variant tag keeps the two from ever being released the wrong way.
#[derive(Debug)]
pub enum Body {
    /// Read-only zero-copy mapping of a file, sized exactly to its length.
    Mapped(Mmap),
    /// Heap-allocated buffer.
    Owned(Bytes),
}

impl Body {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Mapped(map) => map,
            Self::Owned(buf) => buf,
        }
    }

    /// Exact byte length. Mapped files are not NUL-terminated, so the
    /// length always travels with the buffer.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Hand the bytes to the wire layer. A mapped body stays zero-copy:
    /// the mapping becomes the owner behind the returned `Bytes` and is
    /// unmapped when the last reference drops.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Mapped(map) => Bytes::from_owner(map),
            Self::Owned(buf) => buf,
        }
    }
}

/// Outcome of a file-body load.
///
/// `degraded` is set when the requested file could not be served and the
/// error document (or the built-in page) was substituted; the caller must
/// then force status 500.
#[derive(Debug)]
pub struct Served {
    pub body: Body,
    pub degraded: bool,
}

/// File-backed body provider.
///
/// Both paths are explicit configuration: static files resolve against
/// `root`, and `error_page` names the canned error document.
#[derive(Debug, Clone)]
pub struct FileServer {
    root: PathBuf,
    error_page: PathBuf,
}

impl FileServer {
    /// Create a provider, verifying the error document up front.
    ///
    /// An unreadable error page at this point is a configuration error the
    /// embedding process should treat as fatal before it starts accepting
    /// connections; once serving, the same condition is degraded per
    /// request instead.
    pub fn new(root: impl Into<PathBuf>, error_page: impl Into<PathBuf>) -> Result<Self, Error> {
        let server = Self {
            root: root.into(),
            error_page: error_page.into(),
        };

        if let Err(source) = File::open(&server.error_page).and_then(|f| f.metadata().map(|_| ())) {
            return Err(Error::ErrorPage {
                path: server.error_page,
                source,
            });
        }

        Ok(server)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load `filename` from the document root.
    ///
    /// Open, stat, and map failures are absorbed: the canned error document
    /// is substituted and the outcome marked degraded. Blocks on the
    /// filesystem; on an event-loop thread use [`FileServer::serve_async`].
    pub fn serve(&self, filename: &str) -> Served {
        match self.resolve(filename).and_then(|path| map_file(&path)) {
            Ok(body) => Served {
                body,
                degraded: false,
            },
            Err(err) => {
                logger::log_warning(&format!("failed to serve '{filename}': {err}"));
                Served {
                    body: self.error_body(),
                    degraded: true,
                }
            }
        }
    }

    /// [`FileServer::serve`] with the blocking open/stat/map offloaded to
    /// the tokio blocking pool, so a readiness-driven loop thread is not
    /// stalled behind a slow filesystem.
    pub async fn serve_async(&self, filename: &str) -> Served {
        let server = self.clone();
        let name = filename.to_owned();

        match tokio::task::spawn_blocking(move || server.serve(&name)).await {
            Ok(served) => served,
            Err(err) => {
                logger::log_error(&format!("file worker failed serving '{filename}': {err}"));
                Served {
                    body: Body::Owned(Bytes::from_static(BUILTIN_ERROR_PAGE)),
                    degraded: true,
                }
            }
        }
    }

    /// Resolve against the root and reject paths that escape it.
    fn resolve(&self, filename: &str) -> io::Result<PathBuf> {
        let relative = filename.trim_start_matches('/');
        let canonical = self.root.join(relative).canonicalize()?;
        let root = self.root.canonicalize()?;

        if !canonical.starts_with(&root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "path escapes document root",
            ));
        }

        Ok(canonical)
    }

    /// The canned error document, or the built-in page when even that is
    /// unreadable. Never fails.
    fn error_body(&self) -> Body {
        match map_file(&self.error_page) {
            Ok(body) => body,
            Err(err) => {
                logger::log_error(&format!(
                    "error page '{}' unavailable: {err}",
                    self.error_page.display()
                ));
                Body::Owned(Bytes::from_static(BUILTIN_ERROR_PAGE))
            }
        }
    }
}

/// Map a file read-only, sized exactly to its length. A zero-length file
/// becomes an empty owned body since the OS rejects empty mappings.
#[allow(unsafe_code)]
fn map_file(path: &Path) -> io::Result<Body> {
    let file = File::open(path)?;
    let meta = file.metadata()?;

    if meta.len() == 0 {
        return Ok(Body::Owned(Bytes::new()));
    }

    // SAFETY: private read-only mapping; the server never writes the files
    // it serves, and the map owns its file handle for its whole lifetime.
    let map = unsafe { Mmap::map(&file)? };
    Ok(Body::Mapped(map))
}
