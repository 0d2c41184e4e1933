//! Lifecycle management for the menu engine.
//!
//! Startup seeds an empty store with the configured default language and
//! initial administrator, so a fresh install can log in and serve a menu.

use super::{EngineError, MenuEngine};
use menu_types::{CreateLanguageRequest, CreateUserRequest, Role, TextDirection};

impl MenuEngine {
	/// Performs any initialization required before running.
	pub async fn initialize(&self) -> Result<(), EngineError> {
		tracing::info!(service = %self.config.service.id, "Initializing menu engine");

		let languages = self
			.language_handler
			.list()
			.await
			.map_err(|e| EngineError::Handler(e.to_string()))?;
		if languages.is_empty() {
			let seed = &self.config.bootstrap.default_language;
			self.language_handler
				.create(CreateLanguageRequest {
					code: seed.code.clone(),
					name: seed.name.clone(),
					native_name: seed.native_name.clone(),
					direction: TextDirection::Ltr,
					is_default: true,
					is_active: true,
					sort_order: 0,
				})
				.await
				.map_err(|e| EngineError::Handler(format!("Failed to seed language: {}", e)))?;
			tracing::info!(code = %seed.code, "Seeded default language");
		}

		let user_count = self
			.user_handler
			.count()
			.await
			.map_err(|e| EngineError::Handler(e.to_string()))?;
		if user_count == 0 {
			match &self.config.bootstrap.admin {
				Some(admin) => {
					self.user_handler
						.create(CreateUserRequest {
							username: admin.username.clone(),
							password: admin.password.clone(),
							email: None,
							full_name: None,
							role: Role::Admin,
							is_active: true,
						})
						.await
						.map_err(|e| EngineError::Handler(format!("Failed to seed admin: {}", e)))?;
					tracing::info!(user = %admin.username, "Seeded initial administrator");
				}
				None => {
					tracing::warn!("No users exist and no bootstrap admin is configured");
				}
			}
		}

		Ok(())
	}

	/// Performs cleanup operations.
	pub async fn shutdown(&self) -> Result<(), EngineError> {
		tracing::info!("Shutting down menu engine");

		match self.storage.cleanup_expired().await {
			Ok(count) if count > 0 => {
				tracing::debug!("Storage cleanup on shutdown removed {} entries", count);
			}
			Err(e) => {
				return Err(EngineError::Service(e.to_string()));
			}
			_ => {}
		}

		Ok(())
	}
}
