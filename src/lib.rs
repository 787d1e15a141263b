//! Trie-based HTTP request router with a cursor-driven middleware chain.

pub mod config;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use engine::{Engine, RouterGroup};
pub use http::middleware::{logger, recovery};
pub use http::{ChainState, Context, HandlerFunc, HttpServer, Request};
pub use lifecycle::Shutdown;
pub use routing::Params;
