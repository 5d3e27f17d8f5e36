use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use vantage_primitives::Identifier;

use super::Definition;
use crate::{RegistryError, Result};

struct Slot<D> {
	def: Arc<D>,
	/// File the definition was loaded from; `None` for programmatic definitions.
	source: Option<PathBuf>,
}

impl<D> Clone for Slot<D> {
	fn clone(&self) -> Self {
		Self {
			def: Arc::clone(&self.def),
			source: self.source.clone(),
		}
	}
}

/// Identifier → definition mapping produced by one population pass.
///
/// Iteration follows load order. Callers must not rely on it for anything
/// but stable output.
pub struct Catalog<D> {
	slots: IndexMap<Identifier, Slot<D>>,
}

impl<D> Clone for Catalog<D> {
	fn clone(&self) -> Self {
		Self { slots: self.slots.clone() }
	}
}

impl<D> Default for Catalog<D> {
	fn default() -> Self {
		Self { slots: IndexMap::new() }
	}
}

impl<D: Definition> Catalog<D> {
	pub fn get(&self, id: &Identifier) -> Option<&Arc<D>> {
		self.slots.get(id).map(|slot| &slot.def)
	}

	pub fn contains(&self, id: &Identifier) -> bool {
		self.slots.contains_key(id)
	}

	/// File the definition came from, if it was loaded from disk.
	pub fn source(&self, id: &Identifier) -> Option<&Path> {
		self.slots.get(id).and_then(|slot| slot.source.as_deref())
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
		self.slots.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Arc<D>)> {
		self.slots.iter().map(|(id, slot)| (id, &slot.def))
	}

	pub fn values(&self) -> impl Iterator<Item = &Arc<D>> {
		self.slots.values().map(|slot| &slot.def)
	}

	/// Registers `def`, rejecting an identifier that is already present.
	pub(crate) fn insert(&mut self, def: D, source: Option<PathBuf>) -> Result<Arc<D>> {
		let id = def.id().clone();
		if let Some(existing) = self.slots.get(&id) {
			return Err(RegistryError::DuplicateDefinition {
				kind: D::KIND,
				id,
				first: existing.source.clone(),
				second: source,
			});
		}
		let def = Arc::new(def);
		self.slots.insert(
			id,
			Slot {
				def: Arc::clone(&def),
				source,
			},
		);
		Ok(def)
	}
}

impl<D> std::fmt::Debug for Catalog<D> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_set().entries(self.slots.keys()).finish()
	}
}
