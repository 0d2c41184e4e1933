//! Registry trait for self-registering implementations.
//!
//! Pluggable backends (currently storage) expose a `Registry` marker type so
//! the service binary can discover them by their configuration name.

/// Base trait for implementation registries.
///
/// Each backend module provides a `Registry` struct implementing this trait,
/// pairing the name used under `[storage.implementations.<name>]` with the
/// factory that builds it.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// e.g. "memory" for `storage.implementations.memory`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory function for this implementation.
	fn factory() -> Self::Factory;
}
