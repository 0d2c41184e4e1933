//! Handlers for the back-office areas and the order workflow.
//!
//! Each handler validates requests, enforces the cross-record rules of its
//! area, persists through [`StorageService`] and publishes change events.

pub mod branch;
pub mod catalog;
pub mod display;
pub mod language;
pub mod order;
pub mod settings;
pub mod user;

pub use branch::BranchHandler;
pub use catalog::CatalogHandler;
pub use display::DisplayHandler;
pub use language::LanguageHandler;
pub use order::OrderHandler;
pub use settings::SettingsHandler;
pub use user::UserHandler;

use crate::state::OrderStateError;
use menu_storage::{StorageError, StorageService};
use menu_types::TotalsOverflow;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
	#[error("{entity} not found: {id}")]
	NotFound { entity: &'static str, id: String },
	/// Request body failed its field rules.
	#[error("Invalid request: {0}")]
	InvalidInput(validator::ValidationErrors),
	#[error("Invalid request: {0}")]
	Validation(String),
	/// The request conflicts with existing records.
	#[error("Conflict: {0}")]
	Conflict(String),
	/// The request is well-formed but cannot be applied as given.
	#[error("Unprocessable: {0}")]
	Unprocessable(String),
	/// The feature is switched off in settings.
	#[error("Disabled: {0}")]
	Disabled(String),
	#[error("Invalid credentials")]
	InvalidCredentials,
	#[error("Invalid transition: {0}")]
	InvalidTransition(String),
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<validator::ValidationErrors> for HandlerError {
	fn from(errors: validator::ValidationErrors) -> Self {
		HandlerError::InvalidInput(errors)
	}
}

impl From<TotalsOverflow> for HandlerError {
	fn from(err: TotalsOverflow) -> Self {
		HandlerError::Validation(err.to_string())
	}
}

impl From<StorageError> for HandlerError {
	fn from(err: StorageError) -> Self {
		HandlerError::Storage(err.to_string())
	}
}

impl From<OrderStateError> for HandlerError {
	fn from(err: OrderStateError) -> Self {
		match err {
			OrderStateError::OrderNotFound(id) => HandlerError::NotFound { entity: "Order", id },
			OrderStateError::ItemNotFound(id) => HandlerError::NotFound {
				entity: "Order item",
				id,
			},
			OrderStateError::InvalidTransition { from, to } => {
				HandlerError::InvalidTransition(format!("cannot move from {} to {}", from, to))
			}
			OrderStateError::Storage(message) => HandlerError::Storage(message),
		}
	}
}

/// Loads one record, turning a storage miss into a typed `NotFound`.
pub(crate) async fn load<T: DeserializeOwned>(
	storage: &StorageService,
	namespace: &str,
	entity: &'static str,
	id: &str,
) -> Result<T, HandlerError> {
	storage
		.retrieve(namespace, id)
		.await
		.map_err(|e| match e {
			StorageError::NotFound => HandlerError::NotFound {
				entity,
				id: id.to_string(),
			},
			other => other.into(),
		})
}

/// Checks that an inline `data:` image fits the configured size limit.
pub(crate) fn check_image_size(
	image_url: Option<&str>,
	max_image_bytes: usize,
) -> Result<(), HandlerError> {
	match image_url {
		Some(url) if url.starts_with("data:") && url.len() > max_image_bytes => {
			Err(HandlerError::Validation(format!(
				"image upload is {} bytes, the limit is {}",
				url.len(),
				max_image_bytes
			)))
		}
		_ => Ok(()),
	}
}

pub(crate) fn new_id() -> String {
	uuid::Uuid::new_v4().to_string()
}
