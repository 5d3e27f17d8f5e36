//! Definition scripts.
//!
//! A definition file is a TOML document where exactly one top-level key names
//! the definition kind and carries the display name; every other key is a
//! builder call:
//!
//! ```toml
//! ab_test = "Price options"
//! description = "Which price converts best?"
//! alternatives = [19, 25, 29]
//! metrics = ["signups"]
//! ```

use std::path::Path;

use toml::{Table, Value};

use super::RegistryKind;
use crate::{RegistryError, Result};

/// A parsed definition file, before any builder has run.
#[derive(Debug, Clone)]
pub struct DefinitionScript {
	/// Kind tag, one of the registry's known tags.
	pub tag: &'static str,
	/// Display name carried by the kind tag.
	pub name: String,
	pub fields: Fields,
}

impl DefinitionScript {
	/// Parses `text` read from `path`, locating the kind among `tags`.
	pub fn parse(text: &str, path: &Path, kind: RegistryKind, tags: &'static [&'static str]) -> Result<Self> {
		let mut table: Table = toml::from_str(text).map_err(|source| RegistryError::Parse {
			path: path.to_path_buf(),
			source,
		})?;

		let declared: Vec<&'static str> = tags.iter().copied().filter(|tag| table.contains_key(*tag)).collect();
		let tag = match declared.as_slice() {
			[tag] => *tag,
			[] => {
				return Err(RegistryError::UnknownKind {
					kind,
					path: path.to_path_buf(),
					expected: tags.to_vec(),
				});
			}
			many => {
				return Err(RegistryError::AmbiguousKind {
					path: path.to_path_buf(),
					found: many.iter().map(|t| t.to_string()).collect(),
				});
			}
		};

		let name = match table.remove(tag) {
			Some(Value::String(name)) => name,
			_ => {
				return Err(RegistryError::InvalidField {
					origin: path.display().to_string(),
					field: tag.to_owned(),
					expected: "a display name string",
				});
			}
		};

		Ok(Self {
			tag,
			name,
			fields: Fields::new(path.display().to_string(), table),
		})
	}
}

/// Remaining body keys of a definition, consumed by builder calls.
///
/// Each `take_*` removes its key; [`Fields::finish`] rejects anything left.
#[derive(Debug, Clone)]
pub struct Fields {
	origin: String,
	table: Table,
}

impl Fields {
	/// `origin` names where the fields came from in error messages.
	pub fn new(origin: impl Into<String>, table: Table) -> Self {
		Self {
			origin: origin.into(),
			table,
		}
	}

	pub fn origin(&self) -> &str {
		&self.origin
	}

	pub fn take_str(&mut self, field: &str) -> Result<Option<String>> {
		match self.table.remove(field) {
			None => Ok(None),
			Some(Value::String(s)) => Ok(Some(s)),
			Some(_) => Err(self.invalid(field, "a string")),
		}
	}

	pub fn take_str_list(&mut self, field: &str) -> Result<Option<Vec<String>>> {
		let Some(values) = self.take_array(field)? else {
			return Ok(None);
		};
		values
			.into_iter()
			.map(|value| match value {
				Value::String(s) => Ok(s),
				_ => Err(self.invalid(field, "a list of strings")),
			})
			.collect::<Result<Vec<_>>>()
			.map(Some)
	}

	pub fn take_array(&mut self, field: &str) -> Result<Option<Vec<Value>>> {
		match self.table.remove(field) {
			None => Ok(None),
			Some(Value::Array(values)) => Ok(Some(values)),
			Some(_) => Err(self.invalid(field, "a list")),
		}
	}

	/// Fails on the first key no builder call consumed.
	pub fn finish(self) -> Result<()> {
		match self.table.keys().next() {
			Some(field) => Err(RegistryError::UnknownField {
				origin: self.origin.clone(),
				field: field.clone(),
			}),
			None => Ok(()),
		}
	}

	pub fn invalid(&self, field: &str, expected: &'static str) -> RegistryError {
		RegistryError::InvalidField {
			origin: self.origin.clone(),
			field: field.to_owned(),
			expected,
		}
	}
}
