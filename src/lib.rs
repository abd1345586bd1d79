//! Response construction and content negotiation core for an event-driven
//! HTTP server.
//!
//! The surrounding reactor owns the sockets, the accept loop, and the
//! request parser; this crate turns a parsed request (method, path,
//! accepted media types) into a complete [`http::Response`]: a negotiated
//! content type, a zero-copy memory-mapped or owned in-memory body, and a
//! header store, ready to serialize with [`http::Response::into_hyper`].
//!
//! Per-request file failures never abort anything: a missing file becomes
//! a 500 carrying the configured error document, a refused negotiation a
//! 406, and malformed JSON a 500 for that request alone.

pub mod config;
mod error;
pub mod http;
pub mod logger;

pub use error::Error;
