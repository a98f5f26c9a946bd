//! Registry trait for self-registering implementations.
//!
//! Wallet backends that can be built from configuration declare the name used
//! in the config file and the factory that builds them.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// for example `"local"` for `[wallet.implementations.local]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
