//! Scenario tests for the HTTP API.
//!
//! Every test builds a fresh engine over in-memory storage and drives the
//! bare router in process with `oneshot`; no socket is opened.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use menu_config::Config;
use menu_service::{factory_registry::build_engine_from_config, server::build_router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn app() -> Router {
	let config: Config = r#"
[service]
id = "api-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[bootstrap.admin]
username = "admin"
password = "admin123"
"#
	.parse()
	.unwrap();

	let engine = build_engine_from_config(config).await.unwrap();
	engine.initialize().await.unwrap();
	build_router(Arc::new(engine))
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
	let builder = Request::builder().method(method).uri(uri);
	let req = match body {
		Some(body) => builder
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap(),
		None => builder.body(Body::empty()).unwrap(),
	};

	let resp = router.clone().oneshot(req).await.unwrap();
	let status = resp.status();
	let bytes = resp.into_body().collect().await.unwrap().to_bytes();
	let json = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).unwrap()
	};
	(status, json)
}

struct Fixture {
	branch_id: String,
	table_id: String,
	category_id: String,
	item_id: String,
}

/// One branch with one table, and a burger in a mains category.
async fn seed(router: &Router) -> Fixture {
	let (status, branch) = call(
		router,
		"POST",
		"/api/branches",
		Some(json!({ "name": "Downtown" })),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	let branch_id = branch["id"].as_str().unwrap().to_string();

	let (status, table) = call(
		router,
		"POST",
		"/api/tables",
		Some(json!({ "branch_id": branch_id, "number": "T1", "capacity": 4 })),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, category) = call(
		router,
		"POST",
		"/api/categories",
		Some(json!({ "name": { "en": "Mains" } })),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	let category_id = category["id"].as_str().unwrap().to_string();

	let (status, item) = call(
		router,
		"POST",
		"/api/items",
		Some(json!({
			"category_id": category_id,
			"name": { "en": "Burger", "fr": "Hamburger" },
			"price": "12.50",
		})),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);

	Fixture {
		branch_id,
		table_id: table["id"].as_str().unwrap().to_string(),
		category_id,
		item_id: item["id"].as_str().unwrap().to_string(),
	}
}

async fn place_order(router: &Router, fixture: &Fixture) -> Value {
	let (status, order) = call(
		router,
		"POST",
		"/api/orders",
		Some(json!({
			"table_id": fixture.table_id,
			"items": [{ "menu_item_id": fixture.item_id, "quantity": 2 }],
		})),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED, "order rejected: {}", order);
	order
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
	let router = app().await;
	let (status, body) = call(&router, "GET", "/health", None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], "ok");
	assert_eq!(body["service"], "api-test");
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn category_with_items_cannot_be_deleted() {
	let router = app().await;
	let fixture = seed(&router).await;

	let uri = format!("/api/items?category_id={}", fixture.category_id);
	let (status, items) = call(&router, "GET", &uri, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(items.as_array().unwrap().len(), 1);

	let category_uri = format!("/api/categories/{}", fixture.category_id);
	let (status, body) = call(&router, "DELETE", &category_uri, None).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"], "CONFLICT");

	let item_uri = format!("/api/items/{}", fixture.item_id);
	let (status, _) = call(&router, "DELETE", &item_uri, None).await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, _) = call(&router, "DELETE", &category_uri, None).await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, body) = call(&router, "GET", &category_uri, None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn item_with_unknown_category_is_unprocessable() {
	let router = app().await;
	let (status, body) = call(
		&router,
		"POST",
		"/api/items",
		Some(json!({ "category_id": "missing", "name": { "en": "Soup" }, "price": "4" })),
	)
	.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(body["error"], "UNPROCESSABLE");
}

#[tokio::test]
async fn item_price_out_of_range_is_rejected() {
	let router = app().await;
	let fixture = seed(&router).await;

	for price in ["79228162514264337593543950335", "1000000.01", "4.999"] {
		let (status, body) = call(
			&router,
			"POST",
			"/api/items",
			Some(json!({
				"category_id": fixture.category_id,
				"name": { "en": "Caviar" },
				"price": price,
			})),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST, "price {}", price);
		assert_eq!(body["error"], "VALIDATION_ERROR");
	}
}

#[tokio::test]
async fn invalid_body_fails_validation() {
	let router = app().await;
	let (status, body) = call(
		&router,
		"POST",
		"/api/categories",
		Some(json!({ "name": { "en": "  " } })),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "VALIDATION_ERROR");
	assert!(body["details"]["name"].is_array());
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn order_moves_through_the_kitchen() {
	let router = app().await;
	let fixture = seed(&router).await;
	let order = place_order(&router, &fixture).await;

	assert_eq!(order["number"], 1);
	assert_eq!(order["status"], "pending");
	assert_eq!(order["branch_id"], fixture.branch_id.as_str());
	assert_eq!(order["items"][0]["name"], "Burger");
	let order_id = order["id"].as_str().unwrap();
	let item_id = order["items"][0]["id"].as_str().unwrap();

	let (status, tickets) = call(&router, "GET", "/api/kitchen", None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(tickets[0]["number"], 1);
	assert_eq!(tickets[0]["table_number"], "T1");

	let (status, order) = call(
		&router,
		"PUT",
		&format!("/api/orders/{}/status", order_id),
		Some(json!({ "status": "preparing" })),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(order["status"], "preparing");

	// Lines advance one step at a time.
	let item_uri = format!("/api/orders/{}/items/{}/status", order_id, item_id);
	let (status, body) = call(&router, "PUT", &item_uri, Some(json!({ "status": "served" }))).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"], "INVALID_TRANSITION");

	let (status, order) = call(&router, "PUT", &item_uri, Some(json!({ "status": "ready" }))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(order["status"], "ready");

	let (_, screen) = call(&router, "GET", "/api/status-screen", None).await;
	assert_eq!(screen["preparing"].as_array().unwrap().len(), 0);
	assert_eq!(screen["ready"][0]["number"], 1);

	let (status, order) = call(&router, "PUT", &item_uri, Some(json!({ "status": "served" }))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(order["status"], "served");

	let (_, tickets) = call(&router, "GET", "/api/kitchen", None).await;
	assert!(tickets.as_array().unwrap().is_empty());

	let (status, _) = call(
		&router,
		"POST",
		&format!("/api/orders/{}/cancel", order_id),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn orders_are_listed_by_status() {
	let router = app().await;
	let fixture = seed(&router).await;
	let first = place_order(&router, &fixture).await;
	let second = place_order(&router, &fixture).await;
	assert_eq!(second["number"], 2);

	let (status, _) = call(
		&router,
		"POST",
		&format!("/api/orders/{}/cancel", first["id"].as_str().unwrap()),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (_, all) = call(&router, "GET", "/api/orders", None).await;
	assert_eq!(all[0]["number"], 2);
	assert_eq!(all[1]["number"], 1);

	let (_, cancelled) = call(&router, "GET", "/api/orders?status=cancelled", None).await;
	let cancelled = cancelled.as_array().unwrap();
	assert_eq!(cancelled.len(), 1);
	assert_eq!(cancelled[0]["id"], first["id"]);

	let (_, dashboard) = call(&router, "GET", "/api/dashboard", None).await;
	assert_eq!(dashboard["counts"]["items"], 1);
	assert_eq!(dashboard["active_orders"], 1);
}

#[tokio::test]
async fn unavailable_item_cannot_be_ordered() {
	let router = app().await;
	let fixture = seed(&router).await;

	let (status, _) = call(
		&router,
		"PUT",
		&format!("/api/items/{}", fixture.item_id),
		Some(json!({
			"category_id": fixture.category_id,
			"name": { "en": "Burger" },
			"price": "12.50",
			"is_available": false,
		})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = call(
		&router,
		"POST",
		"/api/orders",
		Some(json!({ "items": [{ "menu_item_id": fixture.item_id, "quantity": 1 }] })),
	)
	.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(body["error"], "UNPROCESSABLE");
}

#[tokio::test]
async fn empty_cart_is_rejected() {
	let router = app().await;
	let (status, body) = call(&router, "POST", "/api/orders", Some(json!({ "items": [] }))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Public menu and ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn public_menu_falls_back_to_default_language() {
	let router = app().await;
	let fixture = seed(&router).await;

	let uri = format!("/api/public/menu?lang=de&branch_id={}", fixture.branch_id);
	let (status, menu) = call(&router, "GET", &uri, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(menu["language"], "en");
	assert_eq!(menu["branch"]["name"], "Downtown");
	assert_eq!(menu["categories"][0]["items"][0]["name"], "Burger");

	let (status, _) = call(&router, "GET", "/api/public/menu?branch_id=nowhere", None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_ordering_follows_settings() {
	let router = app().await;
	let fixture = seed(&router).await;
	let cart = json!({
		"table_id": fixture.table_id,
		"items": [{ "menu_item_id": fixture.item_id, "quantity": 1 }],
	});

	let (status, placed) = call(&router, "POST", "/api/public/orders", Some(cart.clone())).await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(placed["status"], "pending");
	assert!(placed.get("table_id").is_none());

	let (status, tracked) = call(
		&router,
		"GET",
		&format!("/api/public/orders/{}", placed["id"].as_str().unwrap()),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(tracked["number"], placed["number"]);

	let (status, settings) = call(
		&router,
		"PATCH",
		"/api/settings",
		Some(json!({ "enable_ordering": false })),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(settings["enable_ordering"], false);

	let (status, body) = call(&router, "POST", "/api/public/orders", Some(cart.clone())).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["error"], "FEATURE_DISABLED");

	// Staff can still take orders.
	let (status, _) = call(&router, "POST", "/api/orders", Some(cart)).await;
	assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn table_menu_link_and_landing() {
	let router = app().await;
	let fixture = seed(&router).await;

	let (status, link) = call(
		&router,
		"GET",
		&format!("/api/tables/{}/menu-link", fixture.table_id),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	let url = link["url"].as_str().unwrap();
	assert!(url.ends_with(&format!("table={}", fixture.table_id)));
	assert_eq!(link["qr"]["size"], 256);

	let (status, landing) = call(
		&router,
		"GET",
		&format!("/api/public/tables/{}", fixture.table_id),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(landing["table"]["number"], "T1");
	assert_eq!(landing["branch"]["id"], fixture.branch_id.as_str());

	let (status, _) = call(
		&router,
		"DELETE",
		&format!("/api/branches/{}", fixture.branch_id),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (_, tables) = call(&router, "GET", "/api/tables", None).await;
	assert!(tables.as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Settings, users, languages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn settings_reject_unknown_keys_and_reset() {
	let router = app().await;

	let (status, body) = call(
		&router,
		"PATCH",
		"/api/settings",
		Some(json!({ "wifi_password": "secret" })),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "INVALID_REQUEST");

	let (status, _) = call(
		&router,
		"PATCH",
		"/api/settings",
		Some(json!({ "restaurant_name": "Chez Nous" })),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, settings) = call(&router, "POST", "/api/settings/reset", None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(settings["restaurant_name"], "My Restaurant");
}

#[tokio::test]
async fn login_checks_credentials() {
	let router = app().await;

	let (status, user) = call(
		&router,
		"POST",
		"/api/auth/login",
		Some(json!({ "username": "admin", "password": "admin123" })),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(user["role"], "admin");
	assert!(user.get("password_hash").is_none());

	let (status, body) = call(
		&router,
		"POST",
		"/api/auth/login",
		Some(json!({ "username": "admin", "password": "wrong-password" })),
	)
	.await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(body["error"], "INVALID_CREDENTIALS");

	let (status, roles) = call(&router, "GET", "/api/roles", None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(roles.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn default_language_cannot_be_deleted() {
	let router = app().await;

	let (status, _) = call(
		&router,
		"POST",
		"/api/languages",
		Some(json!({ "code": "ar", "name": "Arabic", "direction": "rtl" })),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, _) = call(&router, "DELETE", "/api/languages/en", None).await;
	assert_eq!(status, StatusCode::CONFLICT);

	let (status, _) = call(&router, "DELETE", "/api/languages/ar", None).await;
	assert_eq!(status, StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Display streams
// ---------------------------------------------------------------------------

#[tokio::test]
async fn kitchen_stream_respects_toggle() {
	let router = app().await;

	let req = Request::builder()
		.uri("/api/kitchen/stream")
		.body(Body::empty())
		.unwrap();
	let resp = router.clone().oneshot(req).await.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(
		resp.headers()[header::CONTENT_TYPE],
		"text/event-stream"
	);

	let (status, _) = call(
		&router,
		"PATCH",
		"/api/settings",
		Some(json!({ "enable_kitchen_display": false })),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = call(&router, "GET", "/api/kitchen/stream", None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["error"], "FEATURE_DISABLED");

	let (status, _) = call(&router, "GET", "/api/kitchen", None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}
