//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Keep one segment trie per HTTP method
//! - Keep the handler for every `(method, pattern)` pair
//! - Resolve a request to its route, extracting path parameters
//!
//! # Design Decisions
//! - Trie stores shape, map stores behavior: lookup reuses the matched
//!   node's pattern as the handler key, whatever concrete path matched
//! - Routes are append-only; there is no removal
//! - Immutable once served (shared through `Arc`, no locks)

use std::collections::HashMap;

use axum::http::{Method, StatusCode};

use crate::http::context::{Context, HandlerFunc};
use crate::routing::segments::{decode_segments, split_segments};
use crate::routing::tree::Node;

/// Path parameters extracted from a matched request, by name.
pub type Params = HashMap<String, String>;

/// A successful lookup.
pub struct RouteMatch<'a> {
    pub node: &'a Node,
    pub handler: &'a HandlerFunc,
    pub params: Params,
}

impl RouteMatch<'_> {
    /// The registered pattern that matched.
    pub fn pattern(&self) -> &str {
        self.node.pattern().unwrap_or_default()
    }
}

/// Method-indexed trie router.
#[derive(Default)]
pub struct Router {
    trees: HashMap<Method, Node>,
    handlers: HashMap<(Method, String), HandlerFunc>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` requests matching `pattern`.
    ///
    /// The trie and the handler map are always updated together.
    pub fn add_route(&mut self, method: Method, pattern: &str, handler: HandlerFunc) {
        let segments = split_segments(pattern);
        self.trees
            .entry(method.clone())
            .or_default()
            .insert(pattern, &segments, 0);
        self.handlers.insert((method, pattern.to_string()), handler);
    }

    /// Finds the terminal node for `path` and extracts its parameters.
    ///
    /// `path` is the raw request path; segments are percent-decoded before
    /// matching.
    pub fn get_route(&self, method: &Method, path: &str) -> Option<(&Node, Params)> {
        let root = self.trees.get(method)?;
        let decoded = decode_segments(path);
        let search_segments: Vec<&str> = decoded.iter().map(String::as_str).collect();
        let node = root.search(&search_segments, 0)?;
        let params = extract_params(node.pattern().unwrap_or_default(), &search_segments);
        Some((node, params))
    }

    /// Like [`Router::get_route`], also resolving the handler.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let (node, params) = self.get_route(method, path)?;
        let key = (method.clone(), node.pattern()?.to_string());
        let handler = self.handlers.get(&key)?;
        Some(RouteMatch {
            node,
            handler,
            params,
        })
    }

    /// Every registered route for `method`, in trie pre-order.
    pub fn get_routes(&self, method: &Method) -> Vec<&Node> {
        let mut routes = Vec::new();
        if let Some(root) = self.trees.get(method) {
            root.travel(&mut routes);
        }
        routes
    }

    /// Methods that have at least one route.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.trees.keys()
    }

    /// Resolves the context's route and runs its chain.
    ///
    /// Middleware already queued on the context run first; the route
    /// handler is appended last. Unmatched requests get a plain 404 and the
    /// chain is never started.
    pub fn handle(&self, ctx: &mut Context) {
        let matched = self.lookup(ctx.method(), ctx.request().path());
        match matched {
            Some(route) => {
                tracing::trace!(pattern = route.pattern(), "Route matched");
                ctx.set_params(route.params);
                ctx.set_matched_pattern(route.node.pattern().map(str::to_string));
                ctx.push_handler(route.handler.clone());
                ctx.dispatch();
            }
            None => {
                let body = format!("404 NOT FOUND: {}\n", ctx.path());
                ctx.string(StatusCode::NOT_FOUND, body);
            }
        }
    }
}

/// Binds the wildcard segments of `pattern` against `search_segments`.
fn extract_params(pattern: &str, search_segments: &[&str]) -> Params {
    let mut params = Params::new();
    for (index, part) in split_segments(pattern).into_iter().enumerate() {
        if let Some(name) = part.strip_prefix(':') {
            if let Some(value) = search_segments.get(index) {
                params.insert(name.to_string(), (*value).to_string());
            }
        } else if let Some(name) = part.strip_prefix('*') {
            if !name.is_empty() {
                let rest = search_segments.get(index..).unwrap_or_default();
                params.insert(name.to_string(), rest.join("/"));
            }
            break;
        }
    }
    params
}
