//! The restaurant settings record.

use super::{api_error, ApiResult};
use crate::server::AppState;
use axum::{extract::State, response::Json};
use menu_types::Settings;

pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
	let settings = state.engine.settings().get().await.map_err(api_error)?;
	Ok(Json(settings))
}

/// Applies a partial update. Unknown fields and values of the wrong type
/// are rejected before anything is stored.
pub async fn update_settings(
	State(state): State<AppState>,
	Json(patch): Json<serde_json::Value>,
) -> ApiResult<Json<Settings>> {
	let settings = state
		.engine
		.settings()
		.update(patch)
		.await
		.map_err(api_error)?;
	Ok(Json(settings))
}

pub async fn reset_settings(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
	let settings = state.engine.settings().reset().await.map_err(api_error)?;
	Ok(Json(settings))
}
