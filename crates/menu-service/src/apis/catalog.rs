//! Menu taxonomy endpoints: categories, items, food types and materials.

use super::{api_error, created, ApiResult};
use crate::server::AppState;
use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Json},
};
use menu_types::{
	Category, CategoryFilter, CategoryRequest, FoodType, FoodTypeRequest, Material,
	MaterialRequest, MenuItem, MenuItemRequest,
};

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
	let categories = state
		.engine
		.catalog()
		.list_categories()
		.await
		.map_err(api_error)?;
	Ok(Json(categories))
}

pub async fn get_category(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
	let category = state
		.engine
		.catalog()
		.get_category(&id)
		.await
		.map_err(api_error)?;
	Ok(Json(category))
}

pub async fn create_category(
	State(state): State<AppState>,
	Json(request): Json<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
	let category = state
		.engine
		.catalog()
		.create_category(request)
		.await
		.map_err(api_error)?;
	Ok(created(category))
}

pub async fn update_category(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<CategoryRequest>,
) -> ApiResult<Json<Category>> {
	let category = state
		.engine
		.catalog()
		.update_category(&id, request)
		.await
		.map_err(api_error)?;
	Ok(Json(category))
}

/// A category that still holds items cannot be deleted (409).
pub async fn delete_category(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<StatusCode> {
	state
		.engine
		.catalog()
		.delete_category(&id)
		.await
		.map_err(api_error)?;
	Ok(StatusCode::NO_CONTENT)
}

pub async fn list_items(
	State(state): State<AppState>,
	Query(filter): Query<CategoryFilter>,
) -> ApiResult<Json<Vec<MenuItem>>> {
	let items = state
		.engine
		.catalog()
		.list_items(filter.category_id.as_deref())
		.await
		.map_err(api_error)?;
	Ok(Json(items))
}

pub async fn get_item(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<MenuItem>> {
	let item = state
		.engine
		.catalog()
		.get_item(&id)
		.await
		.map_err(api_error)?;
	Ok(Json(item))
}

/// Referenced category, food types and materials must exist (422).
pub async fn create_item(
	State(state): State<AppState>,
	Json(request): Json<MenuItemRequest>,
) -> ApiResult<impl IntoResponse> {
	let item = state
		.engine
		.catalog()
		.create_item(request)
		.await
		.map_err(api_error)?;
	Ok(created(item))
}

pub async fn update_item(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<MenuItemRequest>,
) -> ApiResult<Json<MenuItem>> {
	let item = state
		.engine
		.catalog()
		.update_item(&id, request)
		.await
		.map_err(api_error)?;
	Ok(Json(item))
}

pub async fn delete_item(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<StatusCode> {
	state
		.engine
		.catalog()
		.delete_item(&id)
		.await
		.map_err(api_error)?;
	Ok(StatusCode::NO_CONTENT)
}

pub async fn list_food_types(State(state): State<AppState>) -> ApiResult<Json<Vec<FoodType>>> {
	let food_types = state
		.engine
		.catalog()
		.list_food_types()
		.await
		.map_err(api_error)?;
	Ok(Json(food_types))
}

pub async fn get_food_type(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<FoodType>> {
	let food_type = state
		.engine
		.catalog()
		.get_food_type(&id)
		.await
		.map_err(api_error)?;
	Ok(Json(food_type))
}

pub async fn create_food_type(
	State(state): State<AppState>,
	Json(request): Json<FoodTypeRequest>,
) -> ApiResult<impl IntoResponse> {
	let food_type = state
		.engine
		.catalog()
		.create_food_type(request)
		.await
		.map_err(api_error)?;
	Ok(created(food_type))
}

pub async fn update_food_type(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<FoodTypeRequest>,
) -> ApiResult<Json<FoodType>> {
	let food_type = state
		.engine
		.catalog()
		.update_food_type(&id, request)
		.await
		.map_err(api_error)?;
	Ok(Json(food_type))
}

/// Also detaches the food type from every item.
pub async fn delete_food_type(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<StatusCode> {
	state
		.engine
		.catalog()
		.delete_food_type(&id)
		.await
		.map_err(api_error)?;
	Ok(StatusCode::NO_CONTENT)
}

pub async fn list_materials(State(state): State<AppState>) -> ApiResult<Json<Vec<Material>>> {
	let materials = state
		.engine
		.catalog()
		.list_materials()
		.await
		.map_err(api_error)?;
	Ok(Json(materials))
}

pub async fn get_material(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<Material>> {
	let material = state
		.engine
		.catalog()
		.get_material(&id)
		.await
		.map_err(api_error)?;
	Ok(Json(material))
}

pub async fn create_material(
	State(state): State<AppState>,
	Json(request): Json<MaterialRequest>,
) -> ApiResult<impl IntoResponse> {
	let material = state
		.engine
		.catalog()
		.create_material(request)
		.await
		.map_err(api_error)?;
	Ok(created(material))
}

pub async fn update_material(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<MaterialRequest>,
) -> ApiResult<Json<Material>> {
	let material = state
		.engine
		.catalog()
		.update_material(&id, request)
		.await
		.map_err(api_error)?;
	Ok(Json(material))
}

pub async fn delete_material(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<StatusCode> {
	state
		.engine
		.catalog()
		.delete_material(&id)
		.await
		.map_err(api_error)?;
	Ok(StatusCode::NO_CONTENT)
}
