//! Shared registry infrastructure.

mod catalog;
mod definition;
mod pass;
mod registry;
mod scope;
mod script;

pub use catalog::Catalog;
pub use definition::{Definition, RegistryKind};
pub use pass::{LoadContext, LoadEnv};
pub use registry::DefinitionRegistry;
pub use scope::LoadScope;
pub use script::{DefinitionScript, Fields};

#[cfg(test)]
mod tests;
