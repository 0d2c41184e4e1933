//! Languages available to the public menu.
//!
//! Exactly one language is the default. The first language created becomes
//! the default; choosing another default clears the previous one. The
//! default language can be neither deleted nor deactivated.

use super::{load, settings::SettingsHandler, HandlerError};
use crate::engine::event_bus::EventBus;
use menu_storage::StorageService;
use menu_types::{
	current_timestamp, CatalogEntity, CatalogEvent, CreateLanguageRequest, Language, MenuEvent,
	StorageKey, UpdateLanguageRequest,
};
use std::sync::Arc;
use validator::Validate;

const ENTITY: &str = "Language";

/// Makes `code` the only default language.
pub(crate) async fn make_default(storage: &StorageService, code: &str) -> Result<(), HandlerError> {
	let target: Language = load(storage, StorageKey::Languages.as_str(), ENTITY, code).await?;
	if !target.is_active {
		return Err(HandlerError::Unprocessable(format!(
			"language '{}' is inactive and cannot be the default",
			code
		)));
	}

	let now = current_timestamp();
	let languages: Vec<Language> = storage.list(StorageKey::Languages.as_str()).await?;
	for mut language in languages {
		let should_be_default = language.code == code;
		if language.is_default != should_be_default {
			language.is_default = should_be_default;
			language.updated_at = now;
			storage
				.store(StorageKey::Languages.as_str(), &language.code, &language)
				.await?;
		}
	}
	Ok(())
}

pub struct LanguageHandler {
	storage: Arc<StorageService>,
	settings: Arc<SettingsHandler>,
	event_bus: EventBus,
}

impl LanguageHandler {
	pub fn new(
		storage: Arc<StorageService>,
		settings: Arc<SettingsHandler>,
		event_bus: EventBus,
	) -> Self {
		Self {
			storage,
			settings,
			event_bus,
		}
	}

	/// All languages by sort order, then code.
	pub async fn list(&self) -> Result<Vec<Language>, HandlerError> {
		let mut languages: Vec<Language> = self.storage.list(StorageKey::Languages.as_str()).await?;
		languages.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.code.cmp(&b.code)));
		Ok(languages)
	}

	pub async fn get(&self, code: &str) -> Result<Language, HandlerError> {
		load(&self.storage, StorageKey::Languages.as_str(), ENTITY, code).await
	}

	/// The default language, if any language exists.
	pub async fn default_language(&self) -> Result<Option<Language>, HandlerError> {
		Ok(self.list().await?.into_iter().find(|l| l.is_default))
	}

	pub async fn create(&self, request: CreateLanguageRequest) -> Result<Language, HandlerError> {
		request.validate()?;

		let code = request.code.trim().to_string();
		let existing = self.list().await?;
		if existing.iter().any(|l| l.code.eq_ignore_ascii_case(&code)) {
			return Err(HandlerError::Conflict(format!(
				"language '{}' already exists",
				code
			)));
		}

		let is_first = existing.is_empty();
		let is_default = request.is_default || is_first;
		if is_default && !request.is_active {
			return Err(HandlerError::Validation(
				"the default language must be active".into(),
			));
		}

		let now = current_timestamp();
		let language = Language {
			code,
			name: request.name,
			native_name: request.native_name,
			direction: request.direction,
			is_default: false,
			is_active: request.is_active,
			sort_order: request.sort_order,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Languages.as_str(), &language.code, &language)
			.await?;

		if is_default {
			self.set_default(&language.code).await?;
		}

		tracing::info!(code = %language.code, default = is_default, "Language created");
		self.publish_upsert(&language.code);
		self.get(&language.code).await
	}

	pub async fn update(
		&self,
		code: &str,
		request: UpdateLanguageRequest,
	) -> Result<Language, HandlerError> {
		request.validate()?;

		let mut language = self.get(code).await?;
		if language.is_default && !request.is_default {
			return Err(HandlerError::Conflict(
				"choose another default language instead of unsetting this one".into(),
			));
		}
		if (language.is_default || request.is_default) && !request.is_active {
			return Err(HandlerError::Conflict(
				"the default language cannot be deactivated".into(),
			));
		}

		let becomes_default = request.is_default && !language.is_default;
		language.name = request.name;
		language.native_name = request.native_name;
		language.direction = request.direction;
		language.is_active = request.is_active;
		language.sort_order = request.sort_order;
		language.updated_at = current_timestamp();
		self.storage
			.store(StorageKey::Languages.as_str(), &language.code, &language)
			.await?;

		if becomes_default {
			self.set_default(&language.code).await?;
		}

		self.publish_upsert(&language.code);
		self.get(code).await
	}

	pub async fn delete(&self, code: &str) -> Result<(), HandlerError> {
		let language = self.get(code).await?;
		if language.is_default || self.settings.get().await?.default_language == code {
			return Err(HandlerError::Conflict(
				"the default language cannot be deleted".into(),
			));
		}

		self.storage
			.remove(StorageKey::Languages.as_str(), code)
			.await?;
		tracing::info!(code = %code, "Language deleted");
		self.event_bus.publish(MenuEvent::Catalog(CatalogEvent::Deleted {
			entity: CatalogEntity::Language,
			id: code.to_string(),
		}));
		Ok(())
	}

	async fn set_default(&self, code: &str) -> Result<(), HandlerError> {
		make_default(&self.storage, code).await?;
		self.settings.sync_default_language(code).await
	}

	fn publish_upsert(&self, code: &str) {
		self.event_bus.publish(MenuEvent::Catalog(CatalogEvent::Upserted {
			entity: CatalogEntity::Language,
			id: code.to_string(),
		}));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handlers::test_support::{bus, storage};
	use menu_types::TextDirection;

	fn handler() -> LanguageHandler {
		let storage = storage();
		let bus = bus();
		let settings = Arc::new(SettingsHandler::new(storage.clone(), bus.clone(), 1024));
		LanguageHandler::new(storage, settings, bus)
	}

	fn create(code: &str, is_default: bool) -> CreateLanguageRequest {
		CreateLanguageRequest {
			code: code.into(),
			name: code.to_uppercase(),
			native_name: None,
			direction: TextDirection::Ltr,
			is_default,
			is_active: true,
			sort_order: 0,
		}
	}

	fn update(is_default: bool, is_active: bool) -> UpdateLanguageRequest {
		UpdateLanguageRequest {
			name: "Updated".into(),
			native_name: None,
			direction: TextDirection::Rtl,
			is_default,
			is_active,
			sort_order: 1,
		}
	}

	#[tokio::test]
	async fn test_first_language_becomes_default() {
		let handler = handler();
		let en = handler.create(create("en", false)).await.unwrap();
		assert!(en.is_default);
		assert_eq!(handler.settings.get().await.unwrap().default_language, "en");

		let tr = handler.create(create("tr", false)).await.unwrap();
		assert!(!tr.is_default);
	}

	#[tokio::test]
	async fn test_new_default_clears_previous() {
		let handler = handler();
		handler.create(create("en", true)).await.unwrap();
		handler.create(create("ar", true)).await.unwrap();

		let defaults: Vec<_> = handler
			.list()
			.await
			.unwrap()
			.into_iter()
			.filter(|l| l.is_default)
			.map(|l| l.code)
			.collect();
		assert_eq!(defaults, vec!["ar".to_string()]);
		assert_eq!(handler.settings.get().await.unwrap().default_language, "ar");
	}

	#[tokio::test]
	async fn test_duplicate_code_conflicts() {
		let handler = handler();
		handler.create(create("en", false)).await.unwrap();
		assert!(matches!(
			handler.create(create("EN", false)).await,
			Err(HandlerError::Conflict(_))
		));
	}

	#[tokio::test]
	async fn test_default_language_cannot_be_deleted_or_deactivated() {
		let handler = handler();
		handler.create(create("en", false)).await.unwrap();
		handler.create(create("fr", false)).await.unwrap();

		assert!(matches!(
			handler.delete("en").await,
			Err(HandlerError::Conflict(_))
		));
		assert!(matches!(
			handler.update("en", update(true, false)).await,
			Err(HandlerError::Conflict(_))
		));
		assert!(matches!(
			handler.update("en", update(false, true)).await,
			Err(HandlerError::Conflict(_))
		));

		handler.delete("fr").await.unwrap();
		assert!(matches!(
			handler.get("fr").await,
			Err(HandlerError::NotFound { .. })
		));
	}

	#[tokio::test]
	async fn test_settings_reset_moves_default_back() {
		let handler = handler();
		handler.create(create("en", false)).await.unwrap();
		handler.create(create("fr", true)).await.unwrap();
		assert!(!handler.get("en").await.unwrap().is_default);

		handler.settings.reset().await.unwrap();

		assert!(handler.get("en").await.unwrap().is_default);
		assert!(!handler.get("fr").await.unwrap().is_default);
		assert!(matches!(
			handler.delete("en").await,
			Err(HandlerError::Conflict(_))
		));
		handler.delete("fr").await.unwrap();
	}

	#[tokio::test]
	async fn test_settings_default_cannot_be_deleted() {
		let handler = handler();
		handler.create(create("fr", false)).await.unwrap();
		handler.create(create("en", false)).await.unwrap();
		handler.settings.reset().await.unwrap();

		// Flags were synced, but the guard also reads settings directly.
		let mut en = handler.get("en").await.unwrap();
		en.is_default = false;
		handler
			.storage
			.store(StorageKey::Languages.as_str(), "en", &en)
			.await
			.unwrap();

		assert!(matches!(
			handler.delete("en").await,
			Err(HandlerError::Conflict(_))
		));
	}

	#[tokio::test]
	async fn test_update_can_move_default() {
		let handler = handler();
		handler.create(create("en", false)).await.unwrap();
		handler.create(create("he", false)).await.unwrap();

		let he = handler.update("he", update(true, true)).await.unwrap();
		assert!(he.is_default);
		assert_eq!(he.direction, TextDirection::Rtl);
		assert!(!handler.get("en").await.unwrap().is_default);
		handler.delete("en").await.unwrap();
	}

	#[tokio::test]
	async fn test_settings_default_language_switches_language() {
		let handler = handler();
		handler.create(create("en", false)).await.unwrap();
		handler.create(create("de", false)).await.unwrap();

		handler
			.settings
			.update(serde_json::json!({"default_language": "de"}))
			.await
			.unwrap();
		assert!(handler.get("de").await.unwrap().is_default);
		assert!(!handler.get("en").await.unwrap().is_default);
	}
}
