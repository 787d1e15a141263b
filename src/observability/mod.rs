//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine, middleware and transport produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics are cheap (atomic increments); exporter disabled by default

pub mod logging;
pub mod metrics;
