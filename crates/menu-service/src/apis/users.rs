//! Staff accounts, the role catalogue and credential checks.
//!
//! Responses never carry password hashes; every user is returned as a
//! [`UserView`].

use super::{api_error, created, ApiResult};
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Json},
};
use menu_types::{CreateUserRequest, LoginRequest, RoleInfo, UpdateUserRequest, UserView};

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserView>>> {
	let users = state.engine.users().list().await.map_err(api_error)?;
	Ok(Json(users))
}

pub async fn get_user(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<UserView>> {
	let user = state.engine.users().get(&id).await.map_err(api_error)?;
	Ok(Json(user))
}

pub async fn create_user(
	State(state): State<AppState>,
	Json(request): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
	let user = state
		.engine
		.users()
		.create(request)
		.await
		.map_err(api_error)?;
	Ok(created(user))
}

pub async fn update_user(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserView>> {
	let user = state
		.engine
		.users()
		.update(&id, request)
		.await
		.map_err(api_error)?;
	Ok(Json(user))
}

pub async fn delete_user(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<StatusCode> {
	state.engine.users().delete(&id).await.map_err(api_error)?;
	Ok(StatusCode::NO_CONTENT)
}

pub async fn list_roles(State(state): State<AppState>) -> Json<Vec<RoleInfo>> {
	Json(state.engine.users().roles())
}

/// Checks a username and password. Unknown users and wrong passwords are
/// indistinguishable (401).
pub async fn login(
	State(state): State<AppState>,
	Json(request): Json<LoginRequest>,
) -> ApiResult<Json<UserView>> {
	let user = state
		.engine
		.users()
		.login(request)
		.await
		.map_err(api_error)?;
	tracing::info!(user = %user.username, "Staff login");
	Ok(Json(user))
}
