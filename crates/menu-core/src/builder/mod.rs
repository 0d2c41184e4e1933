//! Builder pattern for constructing menu engines.
//!
//! Composes a [`MenuEngine`] from the configuration and a set of named
//! storage factories, so backends stay pluggable.

use crate::engine::{event_bus::EventBus, MenuEngine};
use menu_config::Config;
use menu_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Capacity of the engine's broadcast channel.
const EVENT_BUS_CAPACITY: usize = 1000;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions needed to build a [`MenuEngine`], keyed by the
/// implementation name used in configuration.
pub struct MenuFactories<SF> {
	pub storage_factories: HashMap<String, SF>,
}

/// Builder for constructing a [`MenuEngine`] with pluggable storage.
pub struct MenuBuilder {
	config: Config,
}

impl MenuBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine around the primary storage implementation. Other
	/// configured backends are not instantiated.
	pub async fn build<SF>(self, factories: MenuFactories<SF>) -> Result<MenuEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let primary = &self.config.storage.primary;
		let storage_config = self
			.config
			.storage
			.implementations
			.get(primary)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Primary storage '{}' has no configuration",
					primary
				))
			})?;
		let factory = factories.storage_factories.get(primary).ok_or_else(|| {
			BuilderError::MissingComponent(format!("storage implementation '{}'", primary))
		})?;

		let backend = match factory(storage_config) {
			Ok(implementation) => {
				tracing::info!(component = "storage", implementation = %primary, enabled = true, "Loaded");
				implementation
			}
			Err(e) => {
				tracing::error!(
					component = "storage",
					implementation = %primary,
					error = %e,
					"Failed to create storage implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create storage implementation '{}': {}",
					primary, e
				)));
			}
		};

		for name in self.config.storage.implementations.keys() {
			if name != primary {
				tracing::info!(component = "storage", implementation = %name, enabled = false, "Configured");
			}
		}

		let storage = Arc::new(StorageService::new(backend));
		Ok(MenuEngine::new(
			self.config,
			storage,
			EventBus::new(EVENT_BUS_CAPACITY),
		))
	}
}
