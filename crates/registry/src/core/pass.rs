//! One discovery + load cycle over a registry directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use vantage_primitives::{Identifier, Logger};
use vantage_storage::{Binding, Keyspace};

use super::{Catalog, Definition, DefinitionRegistry, DefinitionScript, LoadScope};
use crate::metrics::Metric;
use crate::{RegistryError, Result};

/// Collaborators a population pass reads and writes through.
#[derive(Clone, Copy)]
pub struct LoadEnv<'e> {
	/// Storage used by persistence hooks.
	pub binding: &'e Binding,
	/// Registry experiments resolve their metrics against.
	pub metrics: &'e DefinitionRegistry<Metric>,
	pub logger: &'e dyn Logger,
}

/// In-flight state of a population pass.
pub(crate) struct Pass<D> {
	files: Vec<PathBuf>,
	/// Identifier each file produced, once loaded.
	loaded: Vec<Option<Identifier>>,
	catalog: Catalog<D>,
}

impl<D: Definition> Pass<D> {
	/// Enumerates `*.toml` files directly inside `dir`, sorted by name.
	///
	/// A missing directory is an empty registry.
	pub(crate) fn discover(dir: &Path) -> Result<Self> {
		let io_err = |source| RegistryError::Io {
			path: dir.to_path_buf(),
			source,
		};

		let entries = match fs::read_dir(dir) {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new(Vec::new())),
			Err(e) => return Err(io_err(e)),
		};

		let mut files = Vec::new();
		for entry in entries {
			let path = entry.map_err(io_err)?.path();
			if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
				files.push(path);
			}
		}
		files.sort();
		Ok(Self::new(files))
	}

	fn new(files: Vec<PathBuf>) -> Self {
		Self {
			loaded: vec![None; files.len()],
			files,
			catalog: Catalog::default(),
		}
	}

	pub(crate) fn file_count(&self) -> usize {
		self.files.len()
	}

	/// Loads every file in enumeration order.
	pub(crate) fn run(mut self, env: &LoadEnv<'_>, scope: &mut LoadScope) -> Result<Catalog<D>> {
		for index in 0..self.files.len() {
			self.load(index, env, scope)?;
		}
		Ok(self.catalog)
	}

	/// Loads one file unless an earlier reference already pulled it in.
	fn load(&mut self, index: usize, env: &LoadEnv<'_>, scope: &mut LoadScope) -> Result<Arc<D>> {
		if let Some(id) = &self.loaded[index]
			&& let Some(def) = self.catalog.get(id)
		{
			return Ok(Arc::clone(def));
		}

		let path = self.files[index].clone();
		scope.enter(D::KIND, &path)?;
		let built = self.build(&path, env, scope);
		scope.leave();
		let def = built?;

		let id = def.id().clone();
		if self.catalog.contains(&id) {
			return Err(RegistryError::DuplicateDefinition {
				kind: D::KIND,
				first: self.catalog.source(&id).map(Path::to_path_buf),
				second: Some(path),
				id,
			});
		}

		let store = env.binding.connection()?;
		def.save(&store)?;
		let def = self.catalog.insert(def, Some(path.clone()))?;
		self.loaded[index] = Some(id.clone());
		env.logger.debug(&format!("loaded {} {id} from {}", D::KIND, path.display()));
		Ok(def)
	}

	fn build(&mut self, path: &Path, env: &LoadEnv<'_>, scope: &mut LoadScope) -> Result<D> {
		let script = Self::read_script(path)?;
		let mut cx = LoadContext {
			pass: self,
			env,
			scope,
			path,
		};
		D::build(script, &mut cx)
	}

	fn read_script(path: &Path) -> Result<DefinitionScript> {
		let text = fs::read_to_string(path).map_err(|source| RegistryError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		DefinitionScript::parse(&text, path, D::KIND, D::TAGS)
	}

	/// Finds the file whose stem normalizes to `id`.
	fn index_for(&self, id: &Identifier) -> Option<usize> {
		self.files
			.iter()
			.position(|path| path.file_stem().is_some_and(|stem| Identifier::normalize(&stem.to_string_lossy()) == *id))
	}

	/// Finds a file not loaded yet whose declared name normalizes to `id`.
	///
	/// Files are only read here, never built, so load order is unchanged.
	fn index_declaring(&self, id: &Identifier) -> Result<Option<usize>> {
		for (index, path) in self.files.iter().enumerate() {
			if self.loaded[index].is_some() {
				continue;
			}
			if Identifier::normalize(&Self::read_script(path)?.name) == *id {
				return Ok(Some(index));
			}
		}
		Ok(None)
	}
}

/// Handed to [`Definition::build`] while a file is being loaded.
pub struct LoadContext<'p, 'e, D> {
	pass: &'p mut Pass<D>,
	pub(crate) env: &'p LoadEnv<'e>,
	pub(crate) scope: &'p mut LoadScope,
	path: &'p Path,
}

impl<D: Definition> LoadContext<'_, '_, D> {
	/// File being loaded.
	pub fn path(&self) -> &Path {
		self.path
	}

	/// Resolves another definition of the same registry.
	///
	/// Definitions already loaded in this pass are returned directly. Otherwise
	/// the file named after the identifier (`signups.toml` for `signups`) is
	/// loaded first; failing that, the file declaring that name. Loading a file
	/// still in progress further up the chain fails with a cyclic load error.
	pub fn require(&mut self, name: &str) -> Result<Arc<D>> {
		let id = Identifier::normalize(name);
		if let Some(def) = self.pass.catalog.get(&id) {
			return Ok(Arc::clone(def));
		}

		if let Some(index) = self.pass.index_for(&id) {
			let def = self.pass.load(index, self.env, self.scope)?;
			if *def.id() == id {
				return Ok(def);
			}
		}

		match self.pass.index_declaring(&id)? {
			Some(index) => self.pass.load(index, self.env, self.scope),
			None => Err(RegistryError::NotFound { kind: D::KIND, id }),
		}
	}

	/// Storage handle, connecting on first use.
	pub fn store(&self) -> Result<Arc<Keyspace>> {
		Ok(self.env.binding.connection()?)
	}
}
