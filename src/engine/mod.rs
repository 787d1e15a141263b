//! Application builder and request entry point.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Engine::new()
//!     → group()/use_middleware()/get()/post()...
//!     → Arc<Engine> handed to the HTTP server (no further mutation)
//!
//! Per request:
//!     Request
//!     → Context::new
//!     → middleware of every group whose prefix matches the path
//!     → Router::handle (route handler appended last, chain run)
//!     → Context (buffered response)
//! ```
//!
//! # Design Decisions
//! - Groups only contribute a prefix and middleware; routes live in the
//!   single shared router
//! - Groups are scanned in creation order, so outer middleware run first
//! - Prefixes are plain string prefixes of the request path

pub mod group;

use axum::http::Method;

use crate::http::context::{Context, HandlerFunc};
use crate::http::request::Request;
use crate::routing::router::Router;

pub use group::RouterGroup;

#[derive(Default)]
pub(crate) struct GroupEntry {
    pub(crate) prefix: String,
    pub(crate) middlewares: Vec<HandlerFunc>,
}

/// Routes, groups and the per-request entry point.
pub struct Engine {
    router: Router,
    // index 0 is the root group
    groups: Vec<GroupEntry>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: vec![GroupEntry::default()],
        }
    }

    /// The root group (empty prefix).
    pub fn root(&mut self) -> RouterGroup<'_> {
        RouterGroup::new(self, 0)
    }

    /// Creates a group with `prefix` directly below the root.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let index = self.add_group(0, prefix);
        RouterGroup::new(self, index)
    }

    /// Adds middleware that applies to every request.
    pub fn use_middleware<F>(&mut self, middleware: F)
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.root().use_middleware(middleware);
    }

    pub fn route<F>(&mut self, method: Method, pattern: &str, handler: F)
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.root().route(method, pattern, handler);
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler);
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, handler);
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, handler);
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, handler);
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Every registered `(method, pattern)`, sorted by method then in trie
    /// order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut methods: Vec<&Method> = self.router.methods().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        methods
            .into_iter()
            .flat_map(|method| {
                self.router
                    .get_routes(method)
                    .into_iter()
                    .filter_map(|node| node.pattern())
                    .map(move |pattern| (method.clone(), pattern.to_string()))
            })
            .collect()
    }

    /// Dispatches one request and returns its finished context.
    pub fn handle(&self, request: Request) -> Context {
        let mut ctx = Context::new(request);
        ctx.set_handlers(self.middlewares_for(ctx.path()));
        self.router.handle(&mut ctx);
        ctx
    }

    fn middlewares_for(&self, path: &str) -> Vec<HandlerFunc> {
        self.groups
            .iter()
            .filter(|group| path.starts_with(&group.prefix))
            .flat_map(|group| group.middlewares.iter().cloned())
            .collect()
    }

    pub(crate) fn add_group(&mut self, parent: usize, prefix: &str) -> usize {
        let prefix = format!("{}{}", self.groups[parent].prefix, prefix);
        tracing::debug!(prefix = %prefix, "Group created");
        self.groups.push(GroupEntry {
            prefix,
            middlewares: Vec::new(),
        });
        self.groups.len() - 1
    }

    pub(crate) fn group_entry(&self, index: usize) -> &GroupEntry {
        &self.groups[index]
    }

    pub(crate) fn group_entry_mut(&mut self, index: usize) -> &mut GroupEntry {
        &mut self.groups[index]
    }

    pub(crate) fn add_route(&mut self, method: Method, pattern: &str, handler: HandlerFunc) {
        tracing::debug!(method = %method, pattern = %pattern, "Route registered");
        self.router.add_route(method, pattern, handler);
    }
}
