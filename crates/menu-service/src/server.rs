//! HTTP server for the menu API.
//!
//! [`build_router`] returns the bare router so tests can drive it in
//! process; [`start_server`] adds CORS, tracing, body limits and timeouts
//! and binds the listener.

use crate::apis::{
	branches, catalog, displays, languages, orders, public, settings, users,
};
use axum::{
	extract::{DefaultBodyLimit, State},
	http::{HeaderValue, StatusCode},
	response::{IntoResponse, Json},
	routing::{get, post, put},
	Router,
};
use menu_config::{ApiConfig, CorsConfig};
use menu_core::MenuEngine;
use menu_types::StorageKey;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub engine: Arc<MenuEngine>,
}

/// Builds the complete router with every route under `/api` plus `/health`.
pub fn build_router(engine: Arc<MenuEngine>) -> Router {
	let api = Router::new()
		// Branches and tables
		.route(
			"/branches",
			get(branches::list_branches).post(branches::create_branch),
		)
		.route(
			"/branches/{id}",
			get(branches::get_branch)
				.put(branches::update_branch)
				.delete(branches::delete_branch),
		)
		.route("/tables", get(branches::list_tables).post(branches::create_table))
		.route(
			"/tables/{id}",
			get(branches::get_table)
				.put(branches::update_table)
				.delete(branches::delete_table),
		)
		.route("/tables/{id}/menu-link", get(branches::menu_link))
		// Catalog
		.route(
			"/categories",
			get(catalog::list_categories).post(catalog::create_category),
		)
		.route(
			"/categories/{id}",
			get(catalog::get_category)
				.put(catalog::update_category)
				.delete(catalog::delete_category),
		)
		.route("/items", get(catalog::list_items).post(catalog::create_item))
		.route(
			"/items/{id}",
			get(catalog::get_item)
				.put(catalog::update_item)
				.delete(catalog::delete_item),
		)
		.route(
			"/food-types",
			get(catalog::list_food_types).post(catalog::create_food_type),
		)
		.route(
			"/food-types/{id}",
			get(catalog::get_food_type)
				.put(catalog::update_food_type)
				.delete(catalog::delete_food_type),
		)
		.route(
			"/materials",
			get(catalog::list_materials).post(catalog::create_material),
		)
		.route(
			"/materials/{id}",
			get(catalog::get_material)
				.put(catalog::update_material)
				.delete(catalog::delete_material),
		)
		// Languages
		.route(
			"/languages",
			get(languages::list_languages).post(languages::create_language),
		)
		.route(
			"/languages/{code}",
			get(languages::get_language)
				.put(languages::update_language)
				.delete(languages::delete_language),
		)
		// Users
		.route("/users", get(users::list_users).post(users::create_user))
		.route(
			"/users/{id}",
			get(users::get_user)
				.put(users::update_user)
				.delete(users::delete_user),
		)
		.route("/roles", get(users::list_roles))
		.route("/auth/login", post(users::login))
		// Settings
		.route(
			"/settings",
			get(settings::get_settings).patch(settings::update_settings),
		)
		.route("/settings/reset", post(settings::reset_settings))
		// Orders
		.route("/orders", get(orders::list_orders).post(orders::create_order))
		.route(
			"/orders/{id}",
			get(orders::get_order).delete(orders::delete_order),
		)
		.route("/orders/{id}/status", put(orders::update_order_status))
		.route("/orders/{id}/cancel", post(orders::cancel_order))
		.route(
			"/orders/{id}/items/{item_id}/status",
			put(orders::update_item_status),
		)
		// Displays
		.route("/kitchen", get(displays::kitchen))
		.route("/kitchen/stream", get(displays::kitchen_stream))
		.route("/status-screen", get(displays::status_screen))
		.route("/status-screen/stream", get(displays::status_screen_stream))
		.route("/dashboard", get(displays::dashboard))
		// Public, customer-facing
		.route("/public/menu", get(public::menu))
		.route("/public/tables/{id}", get(public::table_landing))
		.route("/public/orders", post(public::place_order))
		.route("/public/orders/{id}", get(public::order_status));

	Router::new()
		.route("/health", get(health))
		.nest("/api", api)
		.with_state(AppState { engine })
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<MenuEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(engine).layer(
		ServiceBuilder::new()
			.layer(TraceLayer::new_for_http())
			.layer(cors_layer(api_config.cors.as_ref()))
			.layer(DefaultBodyLimit::max(api_config.max_request_size))
			.layer(TimeoutLayer::new(Duration::from_secs(
				api_config.timeout_seconds,
			))),
	);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Menu API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

fn cors_layer(cors: Option<&CorsConfig>) -> CorsLayer {
	let Some(cors) = cors else {
		return CorsLayer::permissive();
	};

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match origin.parse() {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(%origin, "Ignoring invalid CORS origin");
				None
			}
		})
		.collect();
	CorsLayer::permissive().allow_origin(origins)
}

/// Liveness plus a storage round trip; 503 when storage is unreachable.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
	let service = state.engine.config().service.id.clone();
	match state
		.engine
		.storage()
		.exists(StorageKey::Settings.as_str(), "current")
		.await
	{
		Ok(_) => (
			StatusCode::OK,
			Json(serde_json::json!({ "status": "ok", "service": service })),
		),
		Err(e) => {
			tracing::warn!(error = %e, "Health check failed");
			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(serde_json::json!({ "status": "unavailable", "service": service })),
			)
		}
	}
}
