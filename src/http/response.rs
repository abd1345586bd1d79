//! Response object module
//!
//! Aggregates status, method, negotiated content type, headers, and body
//! for one request/response cycle, and carries the construction
//! orchestration: negotiate, load the body, degrade to 406/500 as needed.
//! Failures surface only through the `status` field, which callers check.

use std::path::Path;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, StatusCode};

use crate::error::Error;
use crate::http::body::{Body, FileServer, Served};
use crate::http::content_type::{self, ContentType};
use crate::http::store::Store;
use crate::logger;

/// Body of every 406 reply.
const NOT_ACCEPTABLE_BODY: &str = "Not acceptable";

/// One response under construction.
///
/// Starts with nothing set; `None` status or method means "not yet set"
/// and is rejected at serialization time. The headers and accept stores
/// are owned exclusively by the response, and the body's release (unmap
/// vs free) dispatches on its [`Body`] variant, each exactly once on drop.
#[derive(Debug, Default)]
pub struct Response {
    status: Option<StatusCode>,
    method: Option<Method>,
    content_type: Option<ContentType>,
    headers: Store,
    accepts: Store,
    body: Option<Body>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = Some(method);
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    /// Insert or overwrite an outgoing header.
    pub fn header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key, value);
    }

    pub fn headers(&self) -> &Store {
        &self.headers
    }

    /// Record one media type the client declared acceptable, e.g.
    /// `"text/html"` or `"*/*"`. The accept set is a membership map; the
    /// stored value is unused.
    pub fn accept(&mut self, media_type: impl Into<String>) {
        self.accepts.insert(media_type, "");
    }

    /// Negotiate a content type for `token` against this response's accept
    /// set. Mutates nothing; see [`content_type::negotiate`].
    pub fn negotiate(&self, token: &str) -> Option<ContentType> {
        content_type::negotiate(token, &self.accepts)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_ref().map(Body::as_bytes)
    }

    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Body::len)
    }

    /// Build a file-backed response: negotiate on the filename's extension,
    /// then load the body.
    ///
    /// A failed negotiation overrides `status` with 406 and a plain-text
    /// body; a failed file load overrides it with 500 and the error
    /// document. Otherwise `status` stays as supplied.
    pub fn construct(
        &mut self,
        files: &FileServer,
        status: StatusCode,
        method: Method,
        filename: &str,
    ) {
        self.status = Some(status);
        self.method = Some(method);

        let Some(code) = self.negotiate(extension(filename)) else {
            self.not_acceptable();
            return;
        };

        self.content_type = Some(code);
        self.attach(files.serve(filename));
    }

    /// [`Response::construct`] with the file load offloaded from the
    /// calling event-loop thread.
    pub async fn construct_async(
        &mut self,
        files: &FileServer,
        status: StatusCode,
        method: Method,
        filename: &str,
    ) {
        self.status = Some(status);
        self.method = Some(method);

        let Some(code) = self.negotiate(extension(filename)) else {
            self.not_acceptable();
            return;
        };

        self.content_type = Some(code);
        self.attach(files.serve_async(filename).await);
    }

    /// Load a file body without negotiating; the caller has already settled
    /// the content type. May still override `status` with 500 on failure.
    pub fn send_file(&mut self, files: &FileServer, filename: &str) {
        self.attach(files.serve(filename));
    }

    /// [`Response::send_file`] for event-loop callers.
    pub async fn send_file_async(&mut self, files: &FileServer, filename: &str) {
        self.attach(files.serve_async(filename).await);
    }

    /// Owned plain-text body.
    pub fn text(&mut self, text: &str) {
        self.body = Some(Body::Owned(Bytes::copy_from_slice(text.as_bytes())));
        self.content_type = Some(ContentType::Text);
    }

    /// Owned JSON body from caller-supplied JSON text.
    ///
    /// Negotiates JSON first (406 + text body when the client refuses it),
    /// then parses and re-serializes the input compactly. The round trip
    /// validates well-formedness and normalizes whitespace. Malformed
    /// input fails this request with 500 and a logged diagnostic.
    pub fn json(&mut self, raw: &str) {
        let Some(code) = self.negotiate("json") else {
            self.not_acceptable();
            return;
        };

        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => {
                self.content_type = Some(code);
                self.body = Some(Body::Owned(Bytes::from(value.to_string())));
            }
            Err(err) => {
                logger::log_error(&format!("rejecting malformed json body: {err}"));
                self.status = Some(StatusCode::INTERNAL_SERVER_ERROR);
                self.text("Internal server error");
            }
        }
    }

    /// Serialize for transmission, consuming the response.
    ///
    /// Fails when the status was never set; the "not yet set" state must
    /// never reach the wire. Content-Type comes from the negotiated code
    /// and Content-Length from the true body length. The body's bytes are
    /// handed over without copying, mapped or owned alike.
    pub fn into_hyper(self) -> Result<hyper::Response<Full<Bytes>>, Error> {
        let status = self.status.ok_or(Error::StatusUnset)?;
        let body = self.body.map_or_else(Bytes::new, Body::into_bytes);

        let mut builder = hyper::Response::builder().status(status);
        if let Some(code) = self.content_type {
            builder = builder.header("Content-Type", code.mime());
        }
        builder = builder.header("Content-Length", body.len());
        for (key, value) in self.headers.iter() {
            builder = builder.header(key, value);
        }

        Ok(builder.body(Full::new(body))?)
    }

    fn not_acceptable(&mut self) {
        self.status = Some(StatusCode::NOT_ACCEPTABLE);
        self.text(NOT_ACCEPTABLE_BODY);
    }

    fn attach(&mut self, served: Served) {
        if served.degraded {
            self.status = Some(StatusCode::INTERNAL_SERVER_ERROR);
        }
        self.body = Some(served.body);
    }
}

/// Requested-type token from a filename: the final extension, or `""` when
/// there is none.
fn extension(filename: &str) -> &str {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::content_type::WILDCARD;
    use http_body_util::BodyExt;
    use std::fs;
    use std::path::PathBuf;

    fn fixture_dir(tag: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("retort-response-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn file_server(dir: &std::path::Path) -> FileServer {
        let error_page = dir.join("500.html");
        fs::write(&error_page, "<h1>it broke</h1>").unwrap();
        FileServer::new(dir, &error_page).unwrap()
    }

    #[test]
    fn test_construct_serves_negotiated_file() {
        let dir = fixture_dir("ok");
        let files = file_server(&dir);
        let content = b"<html>index</html>";
        fs::write(dir.join("index.html"), content).unwrap();

        let mut res = Response::new();
        res.accept("text/html");
        res.construct(&files, StatusCode::OK, Method::GET, "index.html");

        assert_eq!(res.status(), Some(StatusCode::OK));
        assert_eq!(res.method(), Some(&Method::GET));
        assert_eq!(res.content_type(), Some(ContentType::Html));
        assert_eq!(res.body(), Some(&content[..]));
        assert_eq!(res.body_len(), content.len());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_construct_refused_negotiation_is_406() {
        let dir = fixture_dir("406");
        let files = file_server(&dir);
        fs::write(dir.join("index.html"), "<html></html>").unwrap();

        let mut res = Response::new();
        res.accept("image/png");
        res.construct(&files, StatusCode::OK, Method::GET, "index.html");

        assert_eq!(res.status(), Some(StatusCode::NOT_ACCEPTABLE));
        assert_eq!(res.content_type(), Some(ContentType::Text));
        assert_eq!(res.body(), Some(&b"Not acceptable"[..]));
        assert_eq!(res.body_len(), 14);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_construct_missing_file_is_500_with_error_page() {
        let dir = fixture_dir("500");
        let files = file_server(&dir);

        let mut res = Response::new();
        res.accept(WILDCARD);
        res.construct(&files, StatusCode::OK, Method::GET, "missing.html");

        assert_eq!(res.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(res.body(), Some(&b"<h1>it broke</h1>"[..]));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_send_file_bypasses_negotiation() {
        let dir = fixture_dir("sendfile");
        let files = file_server(&dir);
        fs::write(dir.join("raw.bin"), [0u8, 1, 2, 3]).unwrap();

        // an empty accept set would refuse everything under negotiation
        let mut res = Response::new();
        res.set_status(StatusCode::OK);
        res.send_file(&files, "raw.bin");

        assert_eq!(res.status(), Some(StatusCode::OK));
        assert_eq!(res.body(), Some(&[0u8, 1, 2, 3][..]));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_text_body() {
        let mut res = Response::new();
        res.text("hello");

        assert_eq!(res.content_type(), Some(ContentType::Text));
        assert_eq!(res.body(), Some(&b"hello"[..]));
        assert_eq!(res.body_len(), 5);
    }

    #[test]
    fn test_json_round_trip_preserves_structure() {
        let raw = r#"{ "b" : [1, 2, 3],
            "a": { "nested": true, "s": "x" } }"#;

        let mut res = Response::new();
        res.accept("application/json");
        res.set_status(StatusCode::OK);
        res.json(raw);

        assert_eq!(res.status(), Some(StatusCode::OK));
        assert_eq!(res.content_type(), Some(ContentType::Json));

        let normalized: serde_json::Value = serde_json::from_slice(res.body().unwrap()).unwrap();
        let original: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(normalized, original);
    }

    #[test]
    fn test_json_refused_negotiation_is_406() {
        let mut res = Response::new();
        res.accept("text/html");
        res.set_status(StatusCode::OK);
        res.json(r#"{"ok": true}"#);

        assert_eq!(res.status(), Some(StatusCode::NOT_ACCEPTABLE));
        assert_eq!(res.body(), Some(&b"Not acceptable"[..]));
    }

    #[test]
    fn test_json_malformed_fails_request_not_process() {
        let mut res = Response::new();
        res.accept(WILDCARD);
        res.set_status(StatusCode::OK);
        res.json("{not json");

        assert_eq!(res.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(res.content_type(), Some(ContentType::Text));
    }

    #[test]
    fn test_into_hyper_requires_status() {
        let mut res = Response::new();
        res.text("body without status");

        assert!(matches!(res.into_hyper(), Err(Error::StatusUnset)));
    }

    #[tokio::test]
    async fn test_into_hyper_carries_headers_and_body() {
        let mut res = Response::new();
        res.set_status(StatusCode::OK);
        res.header("X-Request-Id", "42");
        res.text("payload");

        let wire = res.into_hyper().unwrap();
        assert_eq!(wire.status(), StatusCode::OK);
        assert_eq!(wire.headers()["Content-Type"], "text/plain");
        assert_eq!(wire.headers()["Content-Length"], "7");
        assert_eq!(wire.headers()["X-Request-Id"], "42");

        let body = wire.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"payload");
    }

    #[tokio::test]
    async fn test_construct_async_matches_blocking() {
        let dir = fixture_dir("async");
        let files = file_server(&dir);
        fs::write(dir.join("a.css"), "body{}").unwrap();

        let mut res = Response::new();
        res.accept("text/css");
        res.construct_async(&files, StatusCode::OK, Method::GET, "a.css")
            .await;

        assert_eq!(res.status(), Some(StatusCode::OK));
        assert_eq!(res.content_type(), Some(ContentType::Css));
        assert_eq!(res.body(), Some(&b"body{}"[..]));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_extensionless_filename_defaults_to_html_under_wildcard() {
        let dir = fixture_dir("noext");
        let files = file_server(&dir);
        fs::write(dir.join("README"), "plain").unwrap();

        let mut res = Response::new();
        res.accept(WILDCARD);
        res.construct(&files, StatusCode::OK, Method::GET, "README");

        assert_eq!(res.status(), Some(StatusCode::OK));
        assert_eq!(res.content_type(), Some(ContentType::Html));
        assert_eq!(res.body(), Some(&b"plain"[..]));

        let _ = fs::remove_dir_all(&dir);
    }
}
