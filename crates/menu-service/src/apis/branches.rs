//! Branch and table endpoints, plus the QR menu link of a table.

use super::{api_error, created, ApiResult};
use crate::server::AppState;
use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Json},
};
use menu_types::{Branch, BranchFilter, BranchRequest, MenuLink, Table, TableRequest};

pub async fn list_branches(State(state): State<AppState>) -> ApiResult<Json<Vec<Branch>>> {
	let branches = state
		.engine
		.branches()
		.list_branches()
		.await
		.map_err(api_error)?;
	Ok(Json(branches))
}

pub async fn get_branch(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<Branch>> {
	let branch = state
		.engine
		.branches()
		.get_branch(&id)
		.await
		.map_err(api_error)?;
	Ok(Json(branch))
}

pub async fn create_branch(
	State(state): State<AppState>,
	Json(request): Json<BranchRequest>,
) -> ApiResult<impl IntoResponse> {
	let branch = state
		.engine
		.branches()
		.create_branch(request)
		.await
		.map_err(api_error)?;
	Ok(created(branch))
}

pub async fn update_branch(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<BranchRequest>,
) -> ApiResult<Json<Branch>> {
	let branch = state
		.engine
		.branches()
		.update_branch(&id, request)
		.await
		.map_err(api_error)?;
	Ok(Json(branch))
}

/// Removes the branch together with its tables.
pub async fn delete_branch(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<StatusCode> {
	state
		.engine
		.branches()
		.delete_branch(&id)
		.await
		.map_err(api_error)?;
	Ok(StatusCode::NO_CONTENT)
}

pub async fn list_tables(
	State(state): State<AppState>,
	Query(filter): Query<BranchFilter>,
) -> ApiResult<Json<Vec<Table>>> {
	let tables = state
		.engine
		.branches()
		.list_tables(filter.branch_id.as_deref())
		.await
		.map_err(api_error)?;
	Ok(Json(tables))
}

pub async fn get_table(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<Table>> {
	let table = state
		.engine
		.branches()
		.get_table(&id)
		.await
		.map_err(api_error)?;
	Ok(Json(table))
}

pub async fn create_table(
	State(state): State<AppState>,
	Json(request): Json<TableRequest>,
) -> ApiResult<impl IntoResponse> {
	let table = state
		.engine
		.branches()
		.create_table(request)
		.await
		.map_err(api_error)?;
	Ok(created(table))
}

pub async fn update_table(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<TableRequest>,
) -> ApiResult<Json<Table>> {
	let table = state
		.engine
		.branches()
		.update_table(&id, request)
		.await
		.map_err(api_error)?;
	Ok(Json(table))
}

pub async fn delete_table(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<StatusCode> {
	state
		.engine
		.branches()
		.delete_table(&id)
		.await
		.map_err(api_error)?;
	Ok(StatusCode::NO_CONTENT)
}

/// URL and QR styling a printed table card should encode.
pub async fn menu_link(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<MenuLink>> {
	let link = state
		.engine
		.branches()
		.menu_link(&id)
		.await
		.map_err(api_error)?;
	Ok(Json(link))
}
