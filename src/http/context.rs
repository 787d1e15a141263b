//! Per-request state and the middleware chain executor.
//!
//! # Responsibilities
//! - Own the request, the buffered response and extracted path params
//! - Walk the resolved handler list with an explicit cursor
//! - Provide response helpers (text, JSON, bytes, HTML)
//!
//! # Design Decisions
//! - A context lives for exactly one request and is never shared
//! - `next` runs exactly one handler; a handler that does not call it
//!   ends the forward walk, while callers already on the stack still
//!   run their trailing code
//! - `abort` and `fail` both move the cursor past the end

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::http::request::Request;
use crate::http::response::ResponseWriter;
use crate::routing::router::Params;
use crate::routing::segments::percent_decode;

/// A middleware or route handler.
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync + 'static>;

/// Where a context is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Created,
    Dispatching,
    /// The last handler in the chain ran.
    Completed,
    /// Some handler stopped the chain before the last one ran.
    Aborted,
    Failed,
}

pub struct Context {
    request: Request,
    response: ResponseWriter,
    method: Method,
    path: String,
    params: Params,
    matched_pattern: Option<String>,
    handlers: Vec<HandlerFunc>,
    // None until the first `next`
    index: Option<usize>,
    reached_end: bool,
    state: ChainState,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self {
            method: request.method().clone(),
            path: percent_decode(request.path()),
            request,
            response: ResponseWriter::new(),
            params: Params::new(),
            matched_pattern: None,
            handlers: Vec::new(),
            index: None,
            reached_end: false,
            state: ChainState::Created,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &ResponseWriter {
        &self.response
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Status written so far.
    pub fn status_code(&self) -> StatusCode {
        self.response.status()
    }

    /// Value bound to path parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Pattern of the route that served this request, if any.
    pub fn matched_pattern(&self) -> Option<&str> {
        self.matched_pattern.as_deref()
    }

    pub fn query(&self, key: &str) -> Option<String> {
        self.request.query(key)
    }

    pub fn post_form(&self, key: &str) -> Option<String> {
        self.request.post_form(key)
    }

    /// The `x-request-id` assigned by the transport.
    pub fn request_id(&self) -> Option<&str> {
        self.request.header("x-request-id")
    }

    /// Runs the handler after the cursor.
    ///
    /// Returns once that handler (and whatever it chained into) is done.
    /// Calling past the end is a no-op.
    pub fn next(&mut self) {
        let len = self.handlers.len();
        let cursor = self.index.map_or(0, |i| i.saturating_add(1)).min(len);
        self.index = Some(cursor);

        if let Some(handler) = self.handlers.get(cursor).cloned() {
            if cursor + 1 == len {
                self.reached_end = true;
            }
            handler(self);
            // the handler never advanced, so nothing after it may run
            if self.index == Some(cursor) {
                self.index = Some(len);
            }
        }
    }

    /// Stops the chain: no later handler will run.
    pub fn abort(&mut self) {
        self.index = Some(self.handlers.len());
        if self.state == ChainState::Dispatching {
            self.state = ChainState::Aborted;
        }
    }

    /// Whether the chain was stopped by `abort` or `fail`, or ended early.
    pub fn is_aborted(&self) -> bool {
        matches!(self.state, ChainState::Aborted | ChainState::Failed)
    }

    /// Stops the chain and replaces the response with `code` and `message`.
    pub fn fail(&mut self, code: StatusCode, message: &str) {
        self.index = Some(self.handlers.len());
        self.state = ChainState::Failed;
        self.response.reset();
        self.string(code, message);
    }

    pub fn status(&mut self, code: StatusCode) {
        self.response.write_status(code);
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.set_header(name, value);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.response.write(bytes);
    }

    /// Writes a `text/plain` response.
    pub fn string(&mut self, code: StatusCode, text: impl AsRef<str>) {
        self.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        self.status(code);
        self.write(text.as_ref().as_bytes());
    }

    /// Writes `value` as an `application/json` response.
    ///
    /// An encoding failure becomes a 500 carrying the encoder message.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(mut body) => {
                body.push(b'\n');
                self.set_header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.status(code);
                self.write(&body);
            }
            Err(err) => {
                tracing::error!(error = %err, path = %self.path, "JSON encoding failed");
                self.response.reset();
                self.string(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
            }
        }
    }

    /// Writes raw bytes with no content type.
    pub fn data(&mut self, code: StatusCode, data: &[u8]) {
        self.status(code);
        self.write(data);
    }

    /// Writes a `text/html` response.
    pub fn html(&mut self, code: StatusCode, html: impl AsRef<str>) {
        self.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        self.status(code);
        self.write(html.as_ref().as_bytes());
    }

    pub(crate) fn set_handlers(&mut self, handlers: Vec<HandlerFunc>) {
        self.handlers = handlers;
    }

    pub(crate) fn push_handler(&mut self, handler: HandlerFunc) {
        self.handlers.push(handler);
    }

    pub(crate) fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    pub(crate) fn set_matched_pattern(&mut self, pattern: Option<String>) {
        self.matched_pattern = pattern;
    }

    /// Starts the chain and settles the final state once it unwinds.
    pub(crate) fn dispatch(&mut self) {
        self.state = ChainState::Dispatching;
        self.next();
        if self.state == ChainState::Dispatching {
            self.state = if self.reached_end {
                ChainState::Completed
            } else {
                ChainState::Aborted
            };
        }
    }
}

impl IntoResponse for Context {
    fn into_response(self) -> Response {
        self.response.into_response()
    }
}
