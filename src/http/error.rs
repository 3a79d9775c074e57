//! Mapping of service errors and extractor rejections onto HTTP responses.

use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::service::ServiceError;

/// Error returned by every handler. Bodies are `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// Body extraction failed; keeps the extractor's status code.
    Rejected { status: StatusCode, detail: String },
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Service(ServiceError::Validation(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Service(ServiceError::Storage(_) | ServiceError::Internal(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Rejected { status, .. } => *status,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Service(ServiceError::NotFound(_)) => "Item not found".to_string(),
            ApiError::Service(ServiceError::Validation(message)) => message.clone(),
            ApiError::Service(_) => "Internal server error".to_string(),
            ApiError::Rejected { detail, .. } => detail.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Service(ServiceError::Storage(err)) if err.is_corrupted() => {
                tracing::error!(error = %err, "tree_items rows do not form a forest");
            }
            ApiError::Service(err) if err.is_client_error() => {
                tracing::debug!(error = %err, %status, "request rejected");
            }
            ApiError::Service(err) => tracing::error!(error = %err, "request failed"),
            ApiError::Rejected { detail, .. } => tracing::debug!(%detail, %status, "bad request body"),
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
