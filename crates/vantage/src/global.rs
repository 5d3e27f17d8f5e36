use std::sync::OnceLock;

use crate::{Config, Error, Playground, Result};

static PLAYGROUND: OnceLock<Playground> = OnceLock::new();

/// Installs the process-wide playground.
///
/// Fails if one already exists, including one created on demand by
/// [`playground`].
pub fn init(config: Config) -> Result<&'static Playground> {
	let mut created = false;
	let playground = PLAYGROUND.get_or_init(|| {
		created = true;
		Playground::new(config)
	});
	if created { Ok(playground) } else { Err(Error::AlreadyInitialized) }
}

/// The process-wide playground, created from [`Config::default`] on first use
/// if [`init`] never ran.
pub fn playground() -> &'static Playground {
	PLAYGROUND.get_or_init(|| Playground::new(Config::default()))
}
