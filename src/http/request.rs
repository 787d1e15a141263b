//! Inbound request descriptor.
//!
//! # Responsibilities
//! - Hold method, URI, headers and the buffered body of one request
//! - Read query and form values
//!
//! # Design Decisions
//! - Body is fully buffered by the transport before dispatch, so handlers
//!   stay synchronous
//! - Missing values are `None`, never an empty string

use axum::body::Bytes;
use axum::http::{header, request::Parts, HeaderMap, Method, Uri};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The request a handler sees.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// First value of URL query parameter `key`.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.uri.query()?;
        first_value(query.as_bytes(), key)
    }

    /// First value of form field `key`.
    ///
    /// Reads an urlencoded body first and falls back to the URL query.
    pub fn post_form(&self, key: &str) -> Option<String> {
        let is_form = self
            .header(header::CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));

        is_form
            .then(|| first_value(&self.body, key))
            .flatten()
            .or_else(|| self.query(key))
    }
}

impl From<axum::http::Request<Bytes>> for Request {
    fn from(request: axum::http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self::from_parts(parts, body)
    }
}

fn first_value(encoded: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method(Method::POST).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Bytes::from_static(body.as_bytes())).unwrap().into()
    }

    #[test]
    fn test_query() {
        let req = request("/search?q=rust+lang&page=2&q=second", None, "");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query("q").as_deref(), Some("rust lang"));
        assert_eq!(req.query("page").as_deref(), Some("2"));
        assert_eq!(req.query("missing"), None);
    }

    #[test]
    fn test_post_form_reads_body_then_query() {
        let req = request(
            "/login?username=fromquery&next=%2Fhome",
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            "username=alice&password=p%40ss",
        );
        assert_eq!(req.post_form("username").as_deref(), Some("alice"));
        assert_eq!(req.post_form("password").as_deref(), Some("p@ss"));
        assert_eq!(req.post_form("next").as_deref(), Some("/home"));
    }

    #[test]
    fn test_post_form_ignores_non_form_body() {
        let req = request("/login", Some("application/json"), "username=alice");
        assert_eq!(req.post_form("username"), None);
    }
}
