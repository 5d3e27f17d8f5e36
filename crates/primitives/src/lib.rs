//! Core types shared across the registry, storage and façade crates.

/// Normalized definition identifiers.
pub mod identifier;
/// Thread-local "current actor" used to correlate experiment participation.
pub mod identity;
/// Leveled logging capability consumed by the playground and its collaborators.
pub mod logger;

pub use identifier::Identifier;
pub use identity::Identity;
pub use logger::{Logger, SharedLogger, TracingLogger};
