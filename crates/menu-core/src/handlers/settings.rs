//! Restaurant settings: read, partial update and reset.

use super::{check_image_size, language, HandlerError};
use crate::engine::event_bus::EventBus;
use menu_storage::{StorageError, StorageService};
use menu_types::{MenuEvent, Settings, SettingsEvent, StorageKey};
use std::sync::Arc;

const SETTINGS_ID: &str = "current";

pub struct SettingsHandler {
	storage: Arc<StorageService>,
	event_bus: EventBus,
	max_image_bytes: usize,
}

impl SettingsHandler {
	pub fn new(storage: Arc<StorageService>, event_bus: EventBus, max_image_bytes: usize) -> Self {
		Self {
			storage,
			event_bus,
			max_image_bytes,
		}
	}

	/// Returns the stored settings, or the defaults when none were saved.
	pub async fn get(&self) -> Result<Settings, HandlerError> {
		match self
			.storage
			.retrieve(StorageKey::Settings.as_str(), SETTINGS_ID)
			.await
		{
			Ok(settings) => Ok(settings),
			Err(StorageError::NotFound) => Ok(Settings::default()),
			Err(e) => Err(e.into()),
		}
	}

	/// Applies a partial JSON patch.
	///
	/// Keys must name existing settings; the merged record must pass
	/// [`Settings::validate`]. Changing `default_language` also makes that
	/// language the default one.
	pub async fn update(&self, patch: serde_json::Value) -> Result<Settings, HandlerError> {
		let serde_json::Value::Object(patch) = patch else {
			return Err(HandlerError::Validation(
				"settings patch must be a JSON object".into(),
			));
		};

		let current = self.get().await?;
		let mut merged = serde_json::to_value(&current)
			.map_err(|e| HandlerError::Storage(e.to_string()))?;
		let fields = merged
			.as_object_mut()
			.ok_or_else(|| HandlerError::Storage("settings are not an object".into()))?;

		for (key, value) in patch {
			if !fields.contains_key(&key) {
				return Err(HandlerError::Validation(format!("unknown setting '{}'", key)));
			}
			fields.insert(key, value);
		}

		let updated: Settings = serde_json::from_value(merged)
			.map_err(|e| HandlerError::Validation(e.to_string()))?;
		updated.validate().map_err(HandlerError::Validation)?;
		check_image_size(updated.logo_url.as_deref(), self.max_image_bytes)?;

		if updated.default_language != current.default_language {
			language::make_default(&self.storage, &updated.default_language).await?;
		}

		self.save(&updated).await?;
		tracing::info!(restaurant = %updated.restaurant_name, "Settings updated");
		self.event_bus
			.publish(MenuEvent::Settings(SettingsEvent::Updated));
		Ok(updated)
	}

	/// Restores every field to [`Settings::default`].
	///
	/// The default language flag follows when that language exists and is
	/// active; otherwise the languages are left as they are.
	pub async fn reset(&self) -> Result<Settings, HandlerError> {
		let defaults = Settings::default();
		self.save(&defaults).await?;
		match language::make_default(&self.storage, &defaults.default_language).await {
			Ok(()) => {}
			Err(e @ (HandlerError::NotFound { .. } | HandlerError::Unprocessable(_))) => {
				tracing::warn!(
					code = %defaults.default_language,
					error = %e,
					"Default language not flagged after reset"
				);
			}
			Err(e) => return Err(e),
		}
		tracing::info!("Settings reset to defaults");
		self.event_bus.publish(MenuEvent::Settings(SettingsEvent::Reset));
		Ok(defaults)
	}

	/// Mirrors the default language chosen on the languages page.
	pub(crate) async fn sync_default_language(&self, code: &str) -> Result<(), HandlerError> {
		let mut settings = self.get().await?;
		if settings.default_language != code {
			settings.default_language = code.to_string();
			self.save(&settings).await?;
		}
		Ok(())
	}

	async fn save(&self, settings: &Settings) -> Result<(), HandlerError> {
		self.storage
			.store(StorageKey::Settings.as_str(), SETTINGS_ID, settings)
			.await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handlers::test_support::{bus, storage};
	use serde_json::json;

	fn handler() -> SettingsHandler {
		SettingsHandler::new(storage(), bus(), 1024)
	}

	#[tokio::test]
	async fn test_defaults_when_nothing_stored() {
		assert_eq!(handler().get().await.unwrap(), Settings::default());
	}

	#[tokio::test]
	async fn test_partial_update_keeps_other_fields() {
		let handler = handler();
		let updated = handler
			.update(json!({"restaurant_name": "Chez Nous", "show_prices": false}))
			.await
			.unwrap();
		assert_eq!(updated.restaurant_name, "Chez Nous");
		assert!(!updated.show_prices);
		assert_eq!(updated.currency, Settings::default().currency);
		assert_eq!(handler.get().await.unwrap(), updated);
	}

	#[tokio::test]
	async fn test_update_rejects_unknown_and_invalid() {
		let handler = handler();
		assert!(matches!(
			handler.update(json!({"wine_list": true})).await,
			Err(HandlerError::Validation(_))
		));
		assert!(matches!(
			handler.update(json!({"primary_color": "blue"})).await,
			Err(HandlerError::Validation(_))
		));
		assert!(matches!(
			handler.update(json!({"qr_size": "big"})).await,
			Err(HandlerError::Validation(_))
		));
		assert!(matches!(
			handler.update(json!(["not", "an", "object"])).await,
			Err(HandlerError::Validation(_))
		));
		assert_eq!(handler.get().await.unwrap(), Settings::default());
	}

	#[tokio::test]
	async fn test_inline_logo_is_size_limited() {
		let handler = handler();
		let logo = format!("data:image/png;base64,{}", "A".repeat(2048));
		assert!(matches!(
			handler.update(json!({ "logo_url": logo })).await,
			Err(HandlerError::Validation(_))
		));
	}

	#[tokio::test]
	async fn test_reset_restores_literal_defaults() {
		let handler = handler();
		handler
			.update(json!({"restaurant_name": "Chez Nous", "tax_rate": "8.5", "qr_size": 512}))
			.await
			.unwrap();

		let reset = handler.reset().await.unwrap();
		assert_eq!(reset, Settings::default());
		assert_eq!(handler.get().await.unwrap(), Settings::default());
	}

	#[tokio::test]
	async fn test_default_language_must_exist() {
		let handler = handler();
		assert!(matches!(
			handler.update(json!({"default_language": "fr"})).await,
			Err(HandlerError::NotFound { .. })
		));
	}
}
