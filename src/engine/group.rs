//! Route groups: a shared path prefix plus middleware.

use std::sync::Arc;

use axum::http::Method;

use crate::engine::Engine;
use crate::http::context::Context;

/// A handle to one group of an [`Engine`].
///
/// Routes registered through the handle get the group prefix prepended.
/// Nested groups concatenate prefixes.
pub struct RouterGroup<'a> {
    engine: &'a mut Engine,
    index: usize,
}

impl<'a> RouterGroup<'a> {
    pub(crate) fn new(engine: &'a mut Engine, index: usize) -> Self {
        Self { engine, index }
    }

    pub fn prefix(&self) -> &str {
        &self.engine.group_entry(self.index).prefix
    }

    /// Creates a child group whose prefix is this prefix plus `prefix`.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let index = self.engine.add_group(self.index, prefix);
        RouterGroup::new(self.engine, index)
    }

    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.engine
            .group_entry_mut(self.index)
            .middlewares
            .push(Arc::new(middleware));
        self
    }

    pub fn route<F>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        let pattern = format!("{}{}", self.prefix(), pattern);
        self.engine.add_route(method, &pattern, Arc::new(handler));
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::PATCH, pattern, handler)
    }

    pub fn head<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::HEAD, pattern, handler)
    }
}
