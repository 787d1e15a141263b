//! Network layer subsystem.

pub mod listener;

pub use listener::{bind, ListenerError};
