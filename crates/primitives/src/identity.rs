//! Per-thread identity slot.
//!
//! The request-handling layer above the playground binds the actor for each
//! unit of work; experiment logic reads it to decide participation. The slot
//! lives in a `thread_local!` cell, so a binding made on one worker thread is
//! never observed by another. Async callers that hop threads must rebind with
//! [`scope`] around each unit of work.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

thread_local! {
	static CURRENT: RefCell<Option<Identity>> = const { RefCell::new(None) };
}

/// Opaque actor reference (a user id, session id, cookie value...).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity(Arc<str>);

impl Identity {
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Identity {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for Identity {
	fn from(id: String) -> Self {
		Self::new(id)
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Identity({:?})", &*self.0)
	}
}

/// Returns the identity bound to the calling thread.
pub fn current() -> Option<Identity> {
	CURRENT.with(|slot| slot.borrow().clone())
}

/// Rebinds the calling thread's identity and returns the previous binding.
pub fn set(identity: Option<Identity>) -> Option<Identity> {
	CURRENT.with(|slot| slot.replace(identity))
}

/// Runs `f` with `identity` bound, restoring the previous binding afterwards.
///
/// The previous binding is restored even if `f` unwinds.
pub fn scope<R>(identity: impl Into<Identity>, f: impl FnOnce() -> R) -> R {
	struct Restore(Option<Identity>);

	impl Drop for Restore {
		fn drop(&mut self) {
			set(self.0.take());
		}
	}

	let _restore = Restore(set(Some(identity.into())));
	f()
}
