//! Buffered response sink.
//!
//! # Responsibilities
//! - Collect status, headers and body written by handlers
//! - Convert the result into an axum response once the chain finishes
//!
//! # Design Decisions
//! - First status write commits; later ones are ignored and logged
//! - Body writes append and implicitly commit `200 OK`
//! - Nothing reaches the client until dispatch returns, so a failing
//!   request can still be rewritten from scratch

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_status(&mut self, code: StatusCode) {
        match self.status {
            None => self.status = Some(code),
            Some(current) => {
                tracing::warn!(
                    current = current.as_u16(),
                    ignored = code.as_u16(),
                    "Superfluous status write"
                );
            }
        }
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
    }

    /// Status written so far, `200 OK` if none.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Whether a status has been committed.
    pub fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

impl IntoResponse for ResponseWriter {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_first_status_wins() {
        let mut res = ResponseWriter::new();
        res.write_status(StatusCode::CREATED);
        res.write_status(StatusCode::NOT_FOUND);
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_write_commits_ok() {
        let mut res = ResponseWriter::new();
        assert!(!res.is_committed());
        res.write(b"hello ");
        res.write(b"world");
        res.write_status(StatusCode::BAD_REQUEST);

        assert!(res.is_committed());
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body(), b"hello world");
    }

    #[test]
    fn test_reset_and_convert() {
        let mut res = ResponseWriter::new();
        res.write_status(StatusCode::OK);
        res.write(b"partial");
        res.reset();
        res.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        res.write_status(StatusCode::INTERNAL_SERVER_ERROR);

        let response = res.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    }
}
