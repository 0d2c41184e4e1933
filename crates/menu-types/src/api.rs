//! API types for the menu service HTTP API.
//!
//! Request bodies carry `validator` rules so every handler rejects malformed
//! input the same way; [`APIError`] maps failures onto HTTP statuses with a
//! JSON [`ErrorResponse`] body.

use crate::{ItemStatus, LocalizedText, OrderStatus, Role, SecretString, TextDirection};
use axum::{http::StatusCode, response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use validator::Validate;

fn default_true() -> bool {
	true
}

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> validator::ValidationError {
	validator::ValidationError::new(code).with_message(message.into())
}

/// At least one translation must be non-empty, and language codes must be sane.
fn validate_localized_name(text: &LocalizedText) -> Result<(), validator::ValidationError> {
	if text.values().all(|value| value.trim().is_empty()) {
		return Err(invalid("localized_empty", "at least one translation is required"));
	}
	validate_localized(text)
}

fn validate_localized(text: &LocalizedText) -> Result<(), validator::ValidationError> {
	if let Some(code) = text
		.keys()
		.find(|code| code.is_empty() || code.len() > 10)
	{
		return Err(invalid(
			"language_code",
			format!("invalid language code '{}'", code),
		));
	}
	Ok(())
}

/// Upper bound for a single menu item price.
pub const MAX_ITEM_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

fn validate_price(price: &Decimal) -> Result<(), validator::ValidationError> {
	if price.is_sign_negative() {
		return Err(invalid("price", "price cannot be negative"));
	}
	if *price > MAX_ITEM_PRICE {
		return Err(invalid(
			"price",
			format!("price cannot exceed {}", MAX_ITEM_PRICE),
		));
	}
	if price.normalize().scale() > 2 {
		return Err(invalid("price", "price allows at most 2 decimal places"));
	}
	Ok(())
}

/// Images are either links or uploaded inline as `data:image/...` URLs.
fn validate_image_ref(image: &str) -> Result<(), validator::ValidationError> {
	let accepted = image.starts_with("https://")
		|| image.starts_with("http://")
		|| image.starts_with('/')
		|| (image.starts_with("data:image/") && image.contains(";base64,"));
	if accepted {
		Ok(())
	} else {
		Err(invalid(
			"image",
			"image must be an http(s) URL, an absolute path or a base64 data:image URL",
		))
	}
}

fn validate_password(password: &SecretString) -> Result<(), validator::ValidationError> {
	if password.len() < 6 {
		return Err(invalid("password", "password must be at least 6 characters"));
	}
	Ok(())
}

fn validate_language_code(code: &str) -> Result<(), validator::ValidationError> {
	let valid = !code.is_empty()
		&& code.len() <= 10
		&& code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
	if valid {
		Ok(())
	} else {
		Err(invalid("language_code", "language code must be alphanumeric, '-' or '_'"))
	}
}

/// Create or replace a branch.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BranchRequest {
	#[validate(length(min = 1, max = 120))]
	pub name: String,
	#[validate(length(max = 255))]
	pub address: Option<String>,
	#[validate(length(max = 40))]
	pub phone: Option<String>,
	#[serde(default = "default_true")]
	pub is_active: bool,
}

/// Create or replace a table.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TableRequest {
	#[validate(length(min = 1))]
	pub branch_id: String,
	#[validate(length(min = 1, max = 40))]
	pub number: String,
	#[validate(range(min = 1, max = 100))]
	pub capacity: u32,
	#[serde(default = "default_true")]
	pub is_active: bool,
}

/// Create or replace a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryRequest {
	#[validate(custom(function = "validate_localized_name"))]
	pub name: LocalizedText,
	#[serde(default)]
	#[validate(custom(function = "validate_localized"))]
	pub description: LocalizedText,
	#[validate(custom(function = "validate_image_ref"))]
	pub image_url: Option<String>,
	#[serde(default)]
	pub sort_order: i32,
	#[serde(default = "default_true")]
	pub is_active: bool,
}

/// Create or replace a menu item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuItemRequest {
	#[validate(length(min = 1))]
	pub category_id: String,
	#[validate(custom(function = "validate_localized_name"))]
	pub name: LocalizedText,
	#[serde(default)]
	#[validate(custom(function = "validate_localized"))]
	pub description: LocalizedText,
	#[validate(custom(function = "validate_price"))]
	pub price: Decimal,
	#[validate(custom(function = "validate_image_ref"))]
	pub image_url: Option<String>,
	#[serde(default)]
	pub food_type_ids: Vec<String>,
	#[serde(default)]
	pub material_ids: Vec<String>,
	#[validate(range(max = 10000))]
	pub calories: Option<u32>,
	#[validate(range(max = 600))]
	pub preparation_minutes: Option<u32>,
	#[serde(default = "default_true")]
	pub is_available: bool,
	#[serde(default)]
	pub is_featured: bool,
	#[serde(default)]
	pub sort_order: i32,
}

/// Create or replace a food type.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FoodTypeRequest {
	#[validate(custom(function = "validate_localized_name"))]
	pub name: LocalizedText,
	#[validate(length(max = 64))]
	pub icon: Option<String>,
	#[validate(length(max = 16))]
	pub color: Option<String>,
	#[serde(default)]
	pub sort_order: i32,
}

/// Create or replace a material.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MaterialRequest {
	#[validate(custom(function = "validate_localized_name"))]
	pub name: LocalizedText,
	#[serde(default)]
	pub is_allergen: bool,
}

/// Add a language.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLanguageRequest {
	#[validate(custom(function = "validate_language_code"))]
	pub code: String,
	#[validate(length(min = 1, max = 64))]
	pub name: String,
	#[validate(length(max = 64))]
	pub native_name: Option<String>,
	#[serde(default)]
	pub direction: TextDirection,
	#[serde(default)]
	pub is_default: bool,
	#[serde(default = "default_true")]
	pub is_active: bool,
	#[serde(default)]
	pub sort_order: i32,
}

/// Replace a language's editable fields. The code is immutable.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateLanguageRequest {
	#[validate(length(min = 1, max = 64))]
	pub name: String,
	#[validate(length(max = 64))]
	pub native_name: Option<String>,
	#[serde(default)]
	pub direction: TextDirection,
	#[serde(default)]
	pub is_default: bool,
	#[serde(default = "default_true")]
	pub is_active: bool,
	#[serde(default)]
	pub sort_order: i32,
}

/// Create a staff account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
	#[validate(length(min = 3, max = 64))]
	pub username: String,
	#[validate(custom(function = "validate_password"))]
	pub password: SecretString,
	#[validate(email)]
	pub email: Option<String>,
	#[validate(length(max = 120))]
	pub full_name: Option<String>,
	pub role: Role,
	#[serde(default = "default_true")]
	pub is_active: bool,
}

/// Replace a staff account's profile; the password changes only when given.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
	#[validate(custom(function = "validate_password"))]
	pub password: Option<SecretString>,
	#[validate(email)]
	pub email: Option<String>,
	#[validate(length(max = 120))]
	pub full_name: Option<String>,
	pub role: Role,
	#[serde(default = "default_true")]
	pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
	#[validate(length(min = 1))]
	pub username: String,
	pub password: SecretString,
}

/// One cart line.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderLineRequest {
	#[validate(length(min = 1))]
	pub menu_item_id: String,
	#[validate(range(min = 1))]
	pub quantity: u32,
	#[validate(length(max = 255))]
	pub notes: Option<String>,
}

/// Place an order from a cart.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
	pub branch_id: Option<String>,
	pub table_id: Option<String>,
	#[validate(length(max = 80))]
	pub customer_name: Option<String>,
	#[validate(length(max = 500))]
	pub notes: Option<String>,
	#[validate(length(min = 1), nested)]
	pub items: Vec<OrderLineRequest>,
}

/// Move one order line to a new status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateItemStatusRequest {
	pub status: ItemStatus,
}

/// Move every line of an order forward to a status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
	pub status: ItemStatus,
}

/// Filters for listing orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
	pub status: Option<OrderStatus>,
	pub branch_id: Option<String>,
}

/// Optional branch filter shared by the display endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchFilter {
	pub branch_id: Option<String>,
}

/// Optional category filter for listing items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryFilter {
	pub category_id: Option<String>,
}

/// Query of the public menu.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuQuery {
	pub lang: Option<String>,
	pub branch_id: Option<String>,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed or invalid input (400)
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Bad credentials (401)
	Unauthorized { error_type: String, message: String },
	/// Feature switched off in settings (403)
	Forbidden { error_type: String, message: String },
	/// Missing record (404)
	NotFound { error_type: String, message: String },
	/// Rule violation such as an illegal status transition (409)
	Conflict { error_type: String, message: String },
	/// Well-formed request that cannot be applied, such as ordering an unavailable item (422)
	UnprocessableEntity { error_type: String, message: String },
	/// Storage backend unavailable (503)
	ServiceUnavailable { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			APIError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			APIError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
			APIError::Forbidden { .. } => StatusCode::FORBIDDEN,
			APIError::NotFound { .. } => StatusCode::NOT_FOUND,
			APIError::Conflict { .. } => StatusCode::CONFLICT,
			APIError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
			APIError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
			APIError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error_type, message, details) = match self {
			APIError::BadRequest {
				error_type,
				message,
				details,
			} => (error_type, message, details.clone()),
			APIError::Unauthorized { error_type, message }
			| APIError::Forbidden { error_type, message }
			| APIError::NotFound { error_type, message }
			| APIError::Conflict { error_type, message }
			| APIError::UnprocessableEntity { error_type, message }
			| APIError::ServiceUnavailable { error_type, message }
			| APIError::InternalServerError { error_type, message } => (error_type, message, None),
		};
		ErrorResponse {
			error: error_type.clone(),
			message: message.clone(),
			details,
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let response = self.to_error_response();
		write!(f, "{} ({}): {}", self.status_code(), response.error, response.message)
	}
}

impl std::error::Error for APIError {}

impl IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		(self.status_code(), Json(self.to_error_response())).into_response()
	}
}
