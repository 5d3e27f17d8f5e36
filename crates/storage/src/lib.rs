//! Storage binding for the playground.
//!
//! # Mental Model
//!
//! 1. A [`Store`] is anything that speaks the small key-value vocabulary the
//!    definitions need: strings, batch reads, set-if-absent and counters.
//! 2. A [`Keyspace`] pins a store to the configured namespace so every key a
//!    definition touches lands under `<namespace>:`.
//! 3. A [`Binding`] owns the choice of backend. The first caller of
//!    [`Binding::connection`] or [`Binding::use_mock`] decides it; the choice is
//!    one-way and memoized for the life of the binding.
//!
//! # Invariants
//!
//! - Exactly one keyspace is ever constructed per binding, even when several
//!   threads race on first access.
//! - Repeated [`Binding::connection`] calls return pointer-equal handles.
//! - [`Binding::use_mock`] never replaces an existing handle.

mod backend;
mod binding;
mod error;
mod keyspace;
mod memory;
mod redis_store;
mod store;

pub use backend::{BackendKind, BackendSpec, ConnectionParams};
pub use binding::{Binding, BindingState};
pub use error::{Result, StoreError};
pub use keyspace::Keyspace;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::{Capabilities, Store};
