//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     (method, pattern, handler)
//!     → segments.rs (split pattern)
//!     → tree.rs (insert into the method's trie)
//!     → router.rs (store handler under (method, pattern))
//!
//! Lookup (per request):
//!     (method, path)
//!     → segments.rs (split path)
//!     → tree.rs (depth-first search)
//!     → router.rs (extract params, resolve handler)
//!     → Return: matched route or no match
//! ```
//!
//! # Design Decisions
//! - Routes registered before serving, immutable afterwards
//! - No regex: segments are literal, `:param` or `*catch-all`
//! - Literal beats `:param` beats `*catch-all` at every level

pub mod router;
pub mod segments;
pub mod tree;

pub use router::{Params, RouteMatch, Router};
pub use segments::split_segments;
pub use tree::{Node, SegmentKind};
