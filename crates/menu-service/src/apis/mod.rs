//! HTTP handlers of the menu API, grouped by back-office area.
//!
//! Handlers are thin: they extract the request, call the matching engine
//! handler and map [`HandlerError`] onto an [`APIError`] response.

pub mod branches;
pub mod catalog;
pub mod displays;
pub mod languages;
pub mod orders;
pub mod public;
pub mod settings;
pub mod users;

use axum::{http::StatusCode, response::IntoResponse, Json};
use menu_core::HandlerError;
use menu_types::APIError;
use serde::Serialize;

pub type ApiResult<T> = Result<T, APIError>;

/// Maps engine errors onto HTTP errors.
pub fn api_error(err: HandlerError) -> APIError {
	match err {
		HandlerError::NotFound { .. } => APIError::NotFound {
			error_type: "NOT_FOUND".into(),
			message: err.to_string(),
		},
		HandlerError::InvalidInput(errors) => APIError::BadRequest {
			error_type: "VALIDATION_ERROR".into(),
			message: "Request failed validation".into(),
			details: serde_json::to_value(&errors).ok(),
		},
		HandlerError::Validation(message) => APIError::BadRequest {
			error_type: "INVALID_REQUEST".into(),
			message,
			details: None,
		},
		HandlerError::Conflict(message) => APIError::Conflict {
			error_type: "CONFLICT".into(),
			message,
		},
		HandlerError::InvalidTransition(message) => APIError::Conflict {
			error_type: "INVALID_TRANSITION".into(),
			message,
		},
		HandlerError::Unprocessable(message) => APIError::UnprocessableEntity {
			error_type: "UNPROCESSABLE".into(),
			message,
		},
		HandlerError::Disabled(message) => APIError::Forbidden {
			error_type: "FEATURE_DISABLED".into(),
			message,
		},
		HandlerError::InvalidCredentials => APIError::Unauthorized {
			error_type: "INVALID_CREDENTIALS".into(),
			message: err.to_string(),
		},
		HandlerError::Storage(message) => {
			tracing::error!(error = %message, "Storage failure while handling request");
			APIError::InternalServerError {
				error_type: "STORAGE_ERROR".into(),
				message,
			}
		}
	}
}

/// `201 Created` with the new record as body.
pub(crate) fn created<T: Serialize>(value: T) -> impl IntoResponse {
	(StatusCode::CREATED, Json(value))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		let cases = [
			(
				HandlerError::NotFound {
					entity: "Order",
					id: "o1".into(),
				},
				StatusCode::NOT_FOUND,
			),
			(HandlerError::Validation("bad".into()), StatusCode::BAD_REQUEST),
			(HandlerError::Conflict("taken".into()), StatusCode::CONFLICT),
			(
				HandlerError::InvalidTransition("served to pending".into()),
				StatusCode::CONFLICT,
			),
			(
				HandlerError::Unprocessable("unavailable".into()),
				StatusCode::UNPROCESSABLE_ENTITY,
			),
			(HandlerError::Disabled("off".into()), StatusCode::FORBIDDEN),
			(HandlerError::InvalidCredentials, StatusCode::UNAUTHORIZED),
			(
				HandlerError::Storage("disk".into()),
				StatusCode::INTERNAL_SERVER_ERROR,
			),
		];

		for (err, status) in cases {
			assert_eq!(api_error(err).status_code(), status);
		}
	}
}
