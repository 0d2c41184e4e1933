//! Menu language endpoints. Languages are addressed by their code.

use super::{api_error, created, ApiResult};
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Json},
};
use menu_types::{CreateLanguageRequest, Language, UpdateLanguageRequest};

pub async fn list_languages(State(state): State<AppState>) -> ApiResult<Json<Vec<Language>>> {
	let languages = state.engine.languages().list().await.map_err(api_error)?;
	Ok(Json(languages))
}

pub async fn get_language(
	State(state): State<AppState>,
	Path(code): Path<String>,
) -> ApiResult<Json<Language>> {
	let language = state
		.engine
		.languages()
		.get(&code)
		.await
		.map_err(api_error)?;
	Ok(Json(language))
}

pub async fn create_language(
	State(state): State<AppState>,
	Json(request): Json<CreateLanguageRequest>,
) -> ApiResult<impl IntoResponse> {
	let language = state
		.engine
		.languages()
		.create(request)
		.await
		.map_err(api_error)?;
	Ok(created(language))
}

pub async fn update_language(
	State(state): State<AppState>,
	Path(code): Path<String>,
	Json(request): Json<UpdateLanguageRequest>,
) -> ApiResult<Json<Language>> {
	let language = state
		.engine
		.languages()
		.update(&code, request)
		.await
		.map_err(api_error)?;
	Ok(Json(language))
}

/// The default language cannot be deleted (409).
pub async fn delete_language(
	State(state): State<AppState>,
	Path(code): Path<String>,
) -> ApiResult<StatusCode> {
	state
		.engine
		.languages()
		.delete(&code)
		.await
		.map_err(api_error)?;
	Ok(StatusCode::NO_CONTENT)
}
