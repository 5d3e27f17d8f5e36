use std::sync::{Arc, Barrier};
use std::thread;

use pretty_assertions::assert_eq;
use vantage_primitives::Identifier;

use super::*;
use crate::testing::Fixture;
use crate::{MetricKind, RegistryError};

fn ids<D: Definition>(catalog: &Catalog<D>) -> Vec<&str> {
	catalog.ids().map(Identifier::as_str).collect()
}

#[test]
fn first_access_runs_one_pass() {
	let fx = Fixture::new();
	fx.metric_file("signups.toml", "metric = \"Signups\"\n");
	fx.metric_file("visits.toml", "metric = \"Visits\"\n");
	assert!(!fx.metrics.is_populated());
	assert_eq!(fx.metrics.passes(), 0);

	let signups = fx.metrics.get("Signups", &fx.env()).unwrap();
	assert_eq!(signups.name(), "Signups");
	assert_eq!(fx.metrics.passes(), 1);

	fx.metrics.get("visits", &fx.env()).unwrap();
	fx.metrics.all(&fx.env()).unwrap();
	assert_eq!(fx.metrics.passes(), 1);
	assert!(fx.metrics.is_populated());
}

#[test]
fn concurrent_first_access_shares_one_pass() {
	let fx = Fixture::new();
	for i in 0..16 {
		fx.metric_file(&format!("m{i:02}.toml"), &format!("metric = \"Metric {i}\"\n"));
	}

	let barrier = Barrier::new(8);
	thread::scope(|s| {
		for _ in 0..8 {
			s.spawn(|| {
				barrier.wait();
				let catalog = fx.metrics.all(&fx.env()).unwrap();
				assert_eq!(catalog.len(), 16);
			});
		}
	});

	assert_eq!(fx.metrics.passes(), 1);
}

#[test]
fn same_identifier_in_two_files_is_rejected() {
	let fx = Fixture::new();
	let first = fx.metric_file("a.toml", "metric = \"Sign Ups\"\n");
	let second = fx.metric_file("b.toml", "metric = \"sign-ups\"\n");

	match fx.metrics.get("sign ups", &fx.env()) {
		Err(RegistryError::DuplicateDefinition { kind, id, first: a, second: b }) => {
			assert_eq!(kind, RegistryKind::Metric);
			assert_eq!(id.as_str(), "sign_ups");
			assert_eq!(a, Some(first));
			assert_eq!(b, Some(second));
		}
		other => panic!("expected duplicate definition, got {other:?}"),
	}
	assert!(!fx.metrics.is_populated());
	assert_eq!(fx.metrics.passes(), 0);
}

#[test]
fn mutual_references_are_cyclic() {
	let fx = Fixture::new();
	fx.metric_file("a.toml", "metric = \"A\"\nsum_of = [\"b\"]\n");
	fx.metric_file("b.toml", "metric = \"B\"\nsum_of = [\"a\"]\n");

	match fx.metrics.all(&fx.env()) {
		Err(RegistryError::CyclicLoad { chain }) => {
			assert_eq!(chain.len(), 3);
			assert!(chain[0].ends_with("a.toml"), "{chain:?}");
			assert!(chain[1].ends_with("b.toml"), "{chain:?}");
			assert!(chain[2].ends_with("a.toml"), "{chain:?}");
		}
		other => panic!("expected cyclic load, got {other:?}"),
	}
	assert!(fx.metrics.cached().is_none());
}

#[test]
fn self_reference_is_cyclic() {
	let fx = Fixture::new();
	fx.metric_file("loop.toml", "metric = \"Loop\"\nsum_of = [\"loop\"]\n");

	let err = fx.metrics.get("loop", &fx.env()).unwrap_err();
	assert!(matches!(err, RegistryError::CyclicLoad { .. }), "{err}");
}

#[test]
fn references_load_later_files_once() {
	let fx = Fixture::new();
	fx.metric_file("all.toml", "metric = \"All\"\nsum_of = [\"signups\", \"visits\"]\n");
	fx.metric_file("signups.toml", "metric = \"Signups\"\n");
	fx.metric_file("visits.toml", "metric = \"Visits\"\n");

	let catalog = fx.metrics.all(&fx.env()).unwrap();
	assert_eq!(ids(&catalog), ["signups", "visits", "all"]);

	let all = catalog.get(&Identifier::normalize("all")).unwrap();
	let MetricKind::Sum(parts) = all.kind() else {
		panic!("expected a sum");
	};
	assert!(Arc::ptr_eq(&parts[0], catalog.get(&Identifier::normalize("signups")).unwrap()));
}

#[test]
fn references_resolve_by_declared_name() {
	let fx = Fixture::new();
	fx.metric_file("m_total.toml", "metric = \"Total\"\nsum_of = [\"signups\"]\n");
	fx.metric_file("z_signup_counter.toml", "metric = \"Signups\"\n");

	let catalog = fx.metrics.all(&fx.env()).unwrap();
	assert_eq!(ids(&catalog), ["signups", "total"]);
	let total = catalog.get(&Identifier::normalize("total")).unwrap();
	let MetricKind::Sum(parts) = total.kind() else {
		panic!("expected a sum");
	};
	assert!(Arc::ptr_eq(&parts[0], catalog.get(&Identifier::normalize("signups")).unwrap()));
}

#[test]
fn file_order_does_not_change_reference_resolution() {
	let before = Fixture::new();
	before.metric_file("a_signup_counter.toml", "metric = \"Signups\"\n");
	before.metric_file("m_total.toml", "metric = \"Total\"\nsum_of = [\"signups\"]\n");

	let after = Fixture::new();
	after.metric_file("m_total.toml", "metric = \"Total\"\nsum_of = [\"signups\"]\n");
	after.metric_file("z_signup_counter.toml", "metric = \"Signups\"\n");

	assert_eq!(before.metrics.all(&before.env()).unwrap().len(), 2);
	assert_eq!(after.metrics.all(&after.env()).unwrap().len(), 2);
}

#[test]
fn self_reference_under_another_file_name_is_cyclic() {
	let fx = Fixture::new();
	fx.metric_file("z_loop.toml", "metric = \"Loop\"\nsum_of = [\"loop\"]\n");

	let err = fx.metrics.all(&fx.env()).unwrap_err();
	assert!(matches!(err, RegistryError::CyclicLoad { .. }), "{err}");
}

#[test]
fn reference_to_missing_file_is_not_found() {
	let fx = Fixture::new();
	fx.metric_file("all.toml", "metric = \"All\"\nsum_of = [\"ghost\"]\n");

	match fx.metrics.all(&fx.env()) {
		Err(RegistryError::NotFound { kind, id }) => {
			assert_eq!(kind, RegistryKind::Metric);
			assert_eq!(id.as_str(), "ghost");
		}
		other => panic!("expected not found, got {other:?}"),
	}
}

#[test]
fn unknown_name_is_not_found() {
	let fx = Fixture::new();
	fx.metric_file("signups.toml", "metric = \"Signups\"\n");

	let err = fx.metrics.get("unknown", &fx.env()).unwrap_err();
	assert!(matches!(err, RegistryError::NotFound { ref id, .. } if id.as_str() == "unknown"), "{err}");
	assert!(fx.metrics.is_populated());
}

#[test]
fn reset_rereads_files() {
	let fx = Fixture::new();
	fx.metric_file("signups.toml", "metric = \"Signups\"\ndescription = \"one\"\n");
	assert_eq!(fx.metrics.get("signups", &fx.env()).unwrap().description(), Some("one"));

	fx.metric_file("signups.toml", "metric = \"Signups\"\ndescription = \"two\"\n");
	assert_eq!(fx.metrics.get("signups", &fx.env()).unwrap().description(), Some("one"));

	fx.metrics.reset();
	assert!(!fx.metrics.is_populated());
	assert_eq!(fx.metrics.get("signups", &fx.env()).unwrap().description(), Some("two"));
	assert_eq!(fx.metrics.passes(), 2);
}

#[test]
fn failed_pass_is_retried() {
	let fx = Fixture::new();
	fx.metric_file("broken.toml", "gauge = \"Broken\"\n");

	let err = fx.metrics.all(&fx.env()).unwrap_err();
	assert!(matches!(err, RegistryError::UnknownKind { .. }), "{err}");

	fx.metric_file("broken.toml", "metric = \"Fixed\"\n");
	assert_eq!(fx.metrics.all(&fx.env()).unwrap().len(), 1);
	assert_eq!(fx.metrics.passes(), 1);
}

#[test]
fn unknown_field_aborts_the_pass() {
	let fx = Fixture::new();
	fx.metric_file("signups.toml", "metric = \"Signups\"\ncolour = \"red\"\n");

	let err = fx.metrics.all(&fx.env()).unwrap_err();
	assert!(matches!(err, RegistryError::UnknownField { ref field, .. } if field == "colour"), "{err}");
}

#[test]
fn missing_directory_is_empty() {
	let fx = Fixture::new();
	assert!(fx.metrics.all(&fx.env()).unwrap().is_empty());
	assert_eq!(fx.metrics.passes(), 1);
}

#[test]
fn only_toml_files_are_read() {
	let fx = Fixture::new();
	fx.metric_file("signups.toml", "metric = \"Signups\"\n");
	fx.metric_file("README.md", "not a definition");
	std::fs::create_dir_all(fx.dir.path().join("metrics/nested.toml")).unwrap();

	assert_eq!(ids(&fx.metrics.all(&fx.env()).unwrap()), ["signups"]);
}

#[test]
fn loaded_definitions_are_persisted() {
	let fx = Fixture::new();
	fx.metric_file("signups.toml", "metric = \"Signups\"\n");

	fx.metrics.all(&fx.env()).unwrap();
	assert!(fx.store().get("metrics:signups:created_at").unwrap().is_some());
}

#[test]
fn catalog_remembers_sources() {
	let fx = Fixture::new();
	let path = fx.metric_file("signups.toml", "metric = \"Signups\"\n");

	let catalog = fx.metrics.all(&fx.env()).unwrap();
	assert_eq!(catalog.source(&Identifier::normalize("signups")), Some(path.as_path()));
}

#[test]
fn insert_extends_a_populated_catalog() {
	let fx = Fixture::new();
	fx.metric_file("signups.toml", "metric = \"Signups\"\n");

	let before = fx.metrics.all(&fx.env()).unwrap();
	fx.metrics
		.insert(crate::Metric::new("Visits", None, MetricKind::Counter), &fx.env())
		.unwrap();

	assert_eq!(before.len(), 1);
	let after = fx.metrics.all(&fx.env()).unwrap();
	assert_eq!(ids(&after), ["signups", "visits"]);
	assert_eq!(after.source(&Identifier::normalize("visits")), None);

	let err = fx
		.metrics
		.insert(crate::Metric::new("signups", None, MetricKind::Counter), &fx.env())
		.unwrap_err();
	assert!(matches!(err, RegistryError::DuplicateDefinition { .. }), "{err}");
}
