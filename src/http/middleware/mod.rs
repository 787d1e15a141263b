//! Bundled middleware.

pub mod logger;
pub mod recovery;

pub use logger::logger;
pub use recovery::recovery;
