//! Staff-side order endpoints: placement, listing and the kitchen workflow.

use super::{api_error, created, ApiResult};
use crate::server::AppState;
use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Json},
};
use menu_types::{
	CreateOrderRequest, Order, OrderQuery, UpdateItemStatusRequest, UpdateOrderStatusRequest,
};
use tracing::info;

/// Orders, newest first, optionally filtered by status and branch.
pub async fn list_orders(
	State(state): State<AppState>,
	Query(query): Query<OrderQuery>,
) -> ApiResult<Json<Vec<Order>>> {
	let orders = state
		.engine
		.orders()
		.list(&query)
		.await
		.map_err(api_error)?;
	Ok(Json(orders))
}

pub async fn get_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
	let order = state.engine.orders().get(&id).await.map_err(api_error)?;
	Ok(Json(order))
}

/// Places an order on behalf of a guest. Works even when public ordering
/// is switched off.
pub async fn create_order(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
	let order = state
		.engine
		.orders()
		.create(request)
		.await
		.map_err(api_error)?;
	Ok(created(order))
}

pub async fn delete_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<StatusCode> {
	state.engine.orders().delete(&id).await.map_err(api_error)?;
	Ok(StatusCode::NO_CONTENT)
}

/// Moves every line that can still advance to the requested status.
pub async fn update_order_status(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(request): Json<UpdateOrderStatusRequest>,
) -> ApiResult<Json<Order>> {
	info!(order_id = %id, status = ?request.status, "Order status update requested");
	let order = state
		.engine
		.orders()
		.transition_order(&id, request.status)
		.await
		.map_err(api_error)?;
	Ok(Json(order))
}

pub async fn cancel_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
	let order = state.engine.orders().cancel(&id).await.map_err(api_error)?;
	Ok(Json(order))
}

pub async fn update_item_status(
	State(state): State<AppState>,
	Path((id, item_id)): Path<(String, String)>,
	Json(request): Json<UpdateItemStatusRequest>,
) -> ApiResult<Json<Order>> {
	let order = state
		.engine
		.orders()
		.transition_item(&id, &item_id, request.status)
		.await
		.map_err(api_error)?;
	Ok(Json(order))
}
