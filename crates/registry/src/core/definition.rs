use strum_macros::Display;
use vantage_primitives::Identifier;
use vantage_storage::Keyspace;

use super::{DefinitionScript, LoadContext};
use crate::Result;

/// Which registry a definition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RegistryKind {
	Experiment,
	Metric,
}

/// A value a registry can load, cache and persist.
pub trait Definition: Send + Sync + Sized + 'static {
	/// Registry this definition type lives in.
	const KIND: RegistryKind;

	/// Kind tags a definition script may declare, e.g. `ab_test`.
	const TAGS: &'static [&'static str];

	fn id(&self) -> &Identifier;

	/// Display name as written in the definition.
	fn name(&self) -> &str;

	/// Builds the definition from a parsed script.
	///
	/// The context resolves references to other definitions; resolving them
	/// may load further files within the same pass.
	fn build(script: DefinitionScript, cx: &mut LoadContext<'_, '_, Self>) -> Result<Self>;

	/// Persistence hook, run once the definition is built and before the next
	/// file of the pass is loaded.
	fn save(&self, store: &Keyspace) -> Result<()>;
}
