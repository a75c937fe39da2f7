use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_core::CatalogError;
use catalog_model::ModelError;
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

/// Non-standard "client closed request" status, used when a request's
/// cancellation token fired before the handler finished.
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn client_closed(message: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
            .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
        Self::new(status, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(msg) => Self::bad_request(msg),
            CatalogError::Connectivity { attempts, message } => {
                tracing::error!(attempts, error = %message, "catalog store unreachable");
                Self::service_unavailable("Catalog store is temporarily unavailable")
            }
            CatalogError::Cancelled(operation) => {
                tracing::debug!(operation = %operation, "request cancelled");
                Self::client_closed("Request cancelled")
            }
            other => {
                tracing::error!(error = %other, "catalog request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_errors_map_to_statuses() {
        let cases = [
            (CatalogError::Validation("bad".into()), 400),
            (
                CatalogError::Connectivity {
                    attempts: 16,
                    message: "refused".into(),
                },
                503,
            ),
            (CatalogError::cancelled("read"), 499),
            (CatalogError::Database("syntax".into()), 500),
            (CatalogError::Configuration("missing".into()), 500),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status.as_u16(), status);
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = AppError::from(CatalogError::Database("relation secret_table".into()));
        assert!(!err.message.contains("secret_table"));
    }
}
