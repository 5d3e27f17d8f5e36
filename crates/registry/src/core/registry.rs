use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use vantage_primitives::Identifier;

use super::pass::Pass;
use super::{Catalog, Definition, LoadEnv, LoadScope};
use crate::{RegistryError, Result};

/// Lazily populated, cached set of definitions loaded from one directory.
///
/// The first access runs a population pass under the registry mutex; callers
/// arriving meanwhile block and then read its result. A failed pass publishes
/// nothing, so the next access starts over.
pub struct DefinitionRegistry<D> {
	dir: PathBuf,
	slot: Mutex<Option<Arc<Catalog<D>>>>,
	passes: AtomicU64,
}

impl<D: Definition> DefinitionRegistry<D> {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			slot: Mutex::new(None),
			passes: AtomicU64::new(0),
		}
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Looks up `name` after normalizing it, populating first if needed.
	pub fn get(&self, name: &str, env: &LoadEnv<'_>) -> Result<Arc<D>> {
		self.get_in(name, env, &mut LoadScope::new())
	}

	/// Every loaded definition, populating first if needed.
	pub fn all(&self, env: &LoadEnv<'_>) -> Result<Arc<Catalog<D>>> {
		self.catalog_in(env, &mut LoadScope::new())
	}

	/// Like [`get`](Self::get) but continuing an enclosing pass's scope.
	pub(crate) fn get_in(&self, name: &str, env: &LoadEnv<'_>, scope: &mut LoadScope) -> Result<Arc<D>> {
		let id = Identifier::normalize(name);
		let catalog = self.catalog_in(env, scope)?;
		catalog
			.get(&id)
			.cloned()
			.ok_or(RegistryError::NotFound { kind: D::KIND, id })
	}

	pub(crate) fn catalog_in(&self, env: &LoadEnv<'_>, scope: &mut LoadScope) -> Result<Arc<Catalog<D>>> {
		let mut slot = self.slot.lock();
		self.populate(&mut slot, env, scope)
	}

	fn populate(&self, slot: &mut Option<Arc<Catalog<D>>>, env: &LoadEnv<'_>, scope: &mut LoadScope) -> Result<Arc<Catalog<D>>> {
		if let Some(catalog) = slot.as_ref() {
			return Ok(Arc::clone(catalog));
		}

		let pass = Pass::<D>::discover(&self.dir)?;
		env.logger.debug(&format!(
			"{} pass: {} file(s) in {}",
			D::KIND,
			pass.file_count(),
			self.dir.display()
		));

		let catalog = match pass.run(env, scope) {
			Ok(catalog) => Arc::new(catalog),
			Err(err) => {
				env.logger.error(&format!("{} pass aborted: {err}", D::KIND));
				return Err(err);
			}
		};

		let completed = self.passes.fetch_add(1, Ordering::AcqRel) + 1;
		env.logger.info(&format!(
			"loaded {} {} definition(s) from {} (pass {completed})",
			catalog.len(),
			D::KIND,
			self.dir.display()
		));
		*slot = Some(Arc::clone(&catalog));
		Ok(catalog)
	}

	/// The published catalog without triggering a pass.
	pub fn cached(&self) -> Option<Arc<Catalog<D>>> {
		self.slot.lock().clone()
	}

	pub fn is_populated(&self) -> bool {
		self.slot.lock().is_some()
	}

	/// Discards the cached catalog; the next access repeats the pass.
	pub fn reset(&self) {
		*self.slot.lock() = None;
	}

	/// Number of population passes that completed.
	pub fn passes(&self) -> u64 {
		self.passes.load(Ordering::Acquire)
	}

	/// Registers a programmatically built definition.
	///
	/// Populates first so the duplicate check sees every file. The definition
	/// is persisted, then published in a new catalog.
	pub fn insert(&self, def: D, env: &LoadEnv<'_>) -> Result<Arc<D>> {
		let mut slot = self.slot.lock();
		let current = self.populate(&mut slot, env, &mut LoadScope::new())?;

		if current.contains(def.id()) {
			return Err(RegistryError::DuplicateDefinition {
				kind: D::KIND,
				id: def.id().clone(),
				first: current.source(def.id()).map(Path::to_path_buf),
				second: None,
			});
		}

		let store = env.binding.connection()?;
		def.save(&store)?;
		let mut next = (*current).clone();
		let def = next.insert(def, None)?;
		*slot = Some(Arc::new(next));
		env.logger.debug(&format!("defined {} {}", D::KIND, def.id()));
		Ok(def)
	}
}

impl<D> std::fmt::Debug for DefinitionRegistry<D> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DefinitionRegistry")
			.field("dir", &self.dir)
			.field("populated", &self.slot.lock().is_some())
			.field("passes", &self.passes.load(Ordering::Relaxed))
			.finish()
	}
}
