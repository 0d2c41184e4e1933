//! Customer-facing endpoints reached from a table's QR code.
//!
//! Nothing here exposes staff data: orders are returned as
//! [`PublicOrderStatus`] and tables as a [`TableLanding`].

use super::{api_error, created, ApiResult};
use crate::server::AppState;
use axum::{
	extract::{Path, Query, State},
	response::{IntoResponse, Json},
};
use menu_types::{CreateOrderRequest, MenuQuery, PublicMenu, PublicOrderStatus, TableLanding};

/// The menu in the requested language, shaped by the display toggles.
pub async fn menu(
	State(state): State<AppState>,
	Query(query): Query<MenuQuery>,
) -> ApiResult<Json<PublicMenu>> {
	let menu = state
		.engine
		.displays()
		.public_menu(&query)
		.await
		.map_err(api_error)?;
	Ok(Json(menu))
}

pub async fn table_landing(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<TableLanding>> {
	let landing = state
		.engine
		.branches()
		.table_landing(&id)
		.await
		.map_err(api_error)?;
	Ok(Json(landing))
}

/// Places an order from the guest's cart; 403 while ordering is disabled.
pub async fn place_order(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
	let order = state
		.engine
		.orders()
		.create_public(request)
		.await
		.map_err(api_error)?;
	Ok(created(PublicOrderStatus::from(order)))
}

pub async fn order_status(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Json<PublicOrderStatus>> {
	let status = state
		.engine
		.orders()
		.public_status(&id)
		.await
		.map_err(api_error)?;
	Ok(Json(status))
}
