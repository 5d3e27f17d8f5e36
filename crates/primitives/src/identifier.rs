use std::borrow::Borrow;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new("[^0-9A-Za-z_]+").expect("static pattern"));

/// Unique registry key derived from a definition's display name.
///
/// Normalization lower-cases the name and collapses every run of characters
/// outside `[0-9A-Za-z_]` into a single `_`. Display names are not unique:
/// `"Price Options"` and `"price-options"` both normalize to `price_options`
/// and therefore collide.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Arc<str>);

impl Identifier {
	/// Derives the identifier for a human-readable name.
	pub fn normalize(name: &str) -> Self {
		let lowered = name.to_lowercase();
		Self(Arc::from(NON_WORD.replace_all(&lowered, "_").as_ref()))
	}

	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Identifier {
	fn from(name: &str) -> Self {
		Self::normalize(name)
	}
}

impl From<&String> for Identifier {
	fn from(name: &String) -> Self {
		Self::normalize(name)
	}
}

impl From<&Identifier> for Identifier {
	fn from(id: &Identifier) -> Self {
		id.clone()
	}
}

impl AsRef<str> for Identifier {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for Identifier {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Identifier({:?})", &*self.0)
	}
}
