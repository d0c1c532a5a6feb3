//! Error type shared by every Canopy crate.
//!
//! Handlers return `ClResult<T>`; the `IntoResponse` impl turns an error into
//! a JSON body of the form `{ "error": { "code": ..., "message": ... } }`.
//! Every authorization failure maps to the same 403 body, whichever rule
//! denied it.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	Unauthorized,
	ValidationError(String),
	Conflict(String),
	DbError,
	/// Transient store failure (busy database, pool timeout). Callers may retry.
	ServiceUnavailable(String),
	Internal(String),
	Parse,

	// externals
	Io(std::io::Error),
}

impl Error {
	/// True for failures the caller may retry without changing the request.
	pub fn is_transient(&self) -> bool {
		matches!(self, Error::ServiceUnavailable(_))
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::Conflict(msg) => write!(f, "conflict: {}", msg),
			Error::DbError => write!(f, "database error"),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Parse => write!(f, "parse error"),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(_err: serde_json::Error) -> Self {
		Self::Parse
	}
}

impl From<std::num::ParseIntError> for Error {
	fn from(_err: std::num::ParseIntError) -> Self {
		Self::Parse
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let (status, code, message) = match &self {
			Error::NotFound => (StatusCode::NOT_FOUND, "E-NOT-FOUND", "not found".to_string()),
			Error::PermissionDenied => {
				(StatusCode::FORBIDDEN, "E-PERMISSION-DENIED", "permission denied".to_string())
			}
			Error::Unauthorized => {
				(StatusCode::UNAUTHORIZED, "E-UNAUTHORIZED", "authentication required".to_string())
			}
			Error::ValidationError(msg) => (StatusCode::BAD_REQUEST, "E-VALIDATION", msg.clone()),
			Error::Parse => (StatusCode::BAD_REQUEST, "E-PARSE", "malformed request".to_string()),
			Error::Conflict(msg) => (StatusCode::CONFLICT, "E-CONFLICT", msg.clone()),
			Error::ServiceUnavailable(_) => (
				StatusCode::SERVICE_UNAVAILABLE,
				"E-UNAVAILABLE",
				"temporarily unavailable, please retry".to_string(),
			),
			Error::DbError | Error::Internal(_) | Error::Io(_) => {
				tracing::error!(error = %self, "Internal error while handling request");
				(StatusCode::INTERNAL_SERVER_ERROR, "E-INTERNAL", "internal error".to_string())
			}
		};

		let body = serde_json::json!({
			"error": {
				"code": code,
				"message": message,
			}
		});
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_transient_classification() {
		assert!(Error::ServiceUnavailable("busy".into()).is_transient());
		assert!(!Error::DbError.is_transient());
		assert!(!Error::NotFound.is_transient());
	}

	#[test]
	fn test_status_codes() {
		assert_eq!(Error::PermissionDenied.into_response().status(), StatusCode::FORBIDDEN);
		assert_eq!(Error::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			Error::ServiceUnavailable("pool timeout".into()).into_response().status(),
			StatusCode::SERVICE_UNAVAILABLE
		);
		assert_eq!(
			Error::ValidationError("bad".into()).into_response().status(),
			StatusCode::BAD_REQUEST
		);
	}
}

// vim: ts=4
