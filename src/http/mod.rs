//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → request.rs (buffered body → Request)
//!     → Engine::handle → context.rs (middleware chain)
//!     → response.rs (buffered response → client)
//! ```

pub mod context;
pub mod middleware;
pub mod request;
pub mod request_id;
pub mod response;
pub mod server;

pub use context::{ChainState, Context, HandlerFunc};
pub use request::Request;
pub use request_id::{UuidRequestId, X_REQUEST_ID};
pub use response::ResponseWriter;
pub use server::HttpServer;
