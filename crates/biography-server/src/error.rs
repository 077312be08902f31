//! Mapping of domain failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use biography_core::{BiographyError, ErrorKind};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// The route needs a viewer and none was supplied.
    Unauthorized,
    /// The request body or query string could not be read.
    BadRequest(String),
    Domain(BiographyError),
}

impl From<BiographyError> for ApiError {
    fn from(err: BiographyError) -> Self {
        Self::Domain(err)
    }
}

fn status_of(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::DependencyInconsistency | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized".to_string(),
                "sign-in required".to_string(),
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorKind::ValidationError.to_string(),
                message,
            ),
            ApiError::Domain(err) => {
                let kind = err.kind();
                let status = status_of(kind);
                let message = match kind {
                    // Store and cache text never reaches the client.
                    ErrorKind::Internal => {
                        tracing::error!("[Http] Internal error: {}", err);
                        "internal server error".to_string()
                    }
                    ErrorKind::DependencyInconsistency => {
                        tracing::error!("[Http] Dependency inconsistency: {}", err);
                        err.to_string()
                    }
                    _ => err.to_string(),
                };
                (status, kind.to_string(), message)
            }
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (BiographyError::not_found("Biography", "x"), StatusCode::NOT_FOUND),
            (BiographyError::validation("name is required"), StatusCode::BAD_REQUEST),
            (BiographyError::forbidden("no"), StatusCode::FORBIDDEN),
            (BiographyError::conflict("dup"), StatusCode::CONFLICT),
            (
                BiographyError::dependency_inconsistency("no profile"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (BiographyError::data_access("disk I/O error"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
