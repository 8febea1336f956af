//! Registry trait for self-registering implementations.
//!
//! Accounts, oracles and history backends are selected by name from the
//! configuration. Each implementation module exposes a `Registry` type that
//! ties that name to its factory function.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// Name used under `implementations.<name>` in the configuration, for
	/// example `"muon"` for `oracle.implementations.muon`.
	const NAME: &'static str;

	/// Factory function type, defined per service crate.
	type Factory;

	/// Returns the factory that builds this implementation from its
	/// configuration table.
	fn factory() -> Self::Factory;
}
