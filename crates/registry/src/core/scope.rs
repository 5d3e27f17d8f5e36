use std::path::{Path, PathBuf};

use super::RegistryKind;
use crate::{RegistryError, Result};

/// Files currently being loaded, innermost last.
///
/// One scope spans a top-level population pass and every pass it pulls in
/// (an experiment pass loading the metric registry hands its scope down), so
/// a cycle through both registries is still caught. Entries leave the scope
/// when their file finishes loading; a scope is never shared between
/// concurrent passes.
#[derive(Debug, Default)]
pub struct LoadScope {
	stack: Vec<(RegistryKind, PathBuf)>,
}

impl LoadScope {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn depth(&self) -> usize {
		self.stack.len()
	}

	pub fn contains(&self, kind: RegistryKind, path: &Path) -> bool {
		self.stack.iter().any(|(k, p)| *k == kind && p == path)
	}

	/// Marks `path` as in progress, failing if it already is.
	pub(crate) fn enter(&mut self, kind: RegistryKind, path: &Path) -> Result<()> {
		if self.contains(kind, path) {
			let mut chain: Vec<String> = self.stack.iter().map(|(k, p)| format!("{k}:{}", p.display())).collect();
			chain.push(format!("{kind}:{}", path.display()));
			return Err(RegistryError::CyclicLoad { chain });
		}
		self.stack.push((kind, path.to_path_buf()));
		Ok(())
	}

	pub(crate) fn leave(&mut self) {
		self.stack.pop();
	}
}
