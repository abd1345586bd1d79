//! Content-type negotiation module
//!
//! Maps a requested-type token (usually a file extension) to a content-type
//! code, honoring the client's accept set and wildcard acceptance.

use crate::http::store::Store;

/// Accept-set entry meaning "client accepts everything".
pub const WILDCARD: &str = "*/*";

/// Content types the server can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Html,
    Css,
    Js,
    Png,
    Jpeg,
    Webp,
    Svg,
    Icon,
    Text,
    Json,
}

/// Requested-type token to content-type code. Tokens and codes are unique;
/// see the table test below.
const TOKEN_TABLE: &[(&str, ContentType)] = &[
    ("html", ContentType::Html),
    ("css", ContentType::Css),
    ("js", ContentType::Js),
    ("png", ContentType::Png),
    ("jpg", ContentType::Jpeg),
    ("webp", ContentType::Webp),
    ("svg", ContentType::Svg),
    ("icon", ContentType::Icon),
    ("txt", ContentType::Text),
    ("json", ContentType::Json),
];

impl ContentType {
    /// Resolve a requested-type token against the table.
    pub fn from_token(token: &str) -> Option<Self> {
        TOKEN_TABLE
            .iter()
            .find(|(t, _)| *t == token)
            .map(|&(_, code)| code)
    }

    /// Canonical MIME string for the Content-Type header.
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Css => "text/css",
            Self::Js => "text/javascript",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
            Self::Icon => "image/x-icon",
            Self::Text => "text/plain",
            Self::Json => "application/json",
        }
    }

    fn accepted_by(self, accepts: &Store) -> bool {
        if accepts.contains(self.mime()) {
            return true;
        }
        // favicon requests commonly declare an AVIF preference instead
        self == Self::Icon && accepts.contains("image/avif")
    }
}

/// Negotiate a content type for `token` against the client's accept set.
///
/// A known token is returned when the client accepts everything or its
/// canonical MIME string is present in `accepts`. An unknown token falls
/// back to HTML under wildcard acceptance, so a wildcard never negotiates
/// to nothing. Pure: no I/O, no state.
///
/// # Examples
/// ```
/// use retort::http::content_type::{negotiate, ContentType};
/// use retort::http::store::Store;
///
/// let mut accepts = Store::new();
/// accepts.insert("image/png", "");
/// assert_eq!(negotiate("png", &accepts), Some(ContentType::Png));
/// assert_eq!(negotiate("css", &accepts), None);
/// ```
pub fn negotiate(token: &str, accepts: &Store) -> Option<ContentType> {
    let accept_all = accepts.contains(WILDCARD);

    match ContentType::from_token(token) {
        Some(code) if accept_all || code.accepted_by(accepts) => Some(code),
        Some(_) => None,
        None if accept_all => Some(ContentType::Html),
        None => None,
    }
}
