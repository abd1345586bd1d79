//! HTTP response layer module
//!
//! Everything needed to turn a parsed request into a transmittable
//! response: the key-value store, content-type negotiation, body loading,
//! and the response object itself.

pub mod body;
pub mod content_type;
pub mod response;
pub mod store;

// Re-export commonly used types
pub use body::{Body, FileServer, Served};
pub use content_type::{negotiate, ContentType};
pub use response::Response;
pub use store::Store;
