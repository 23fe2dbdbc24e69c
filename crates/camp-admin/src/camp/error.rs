use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::store::RepositoryError;

/// Error raised by the camp services.
#[derive(Debug, thiserror::Error)]
pub enum CampError {
    #[error("{0}")]
    Validation(String),
    #[error(
        "room '{room}' has capacity {capacity}: {retained} remaining occupant(s) plus {requested} requested would exceed it"
    )]
    CapacityExceeded {
        room: String,
        capacity: u32,
        retained: u32,
        requested: u32,
    },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl CampError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code returned alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            CampError::Validation(_) => "validation_error",
            CampError::CapacityExceeded { .. } => "capacity_exceeded",
            CampError::NotFound { .. } => "not_found",
            CampError::Conflict(_) => "conflict",
            CampError::Store(RepositoryError::Unavailable(_)) => "store_unavailable",
            CampError::Store(_) => "store_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CampError::Validation(_) => StatusCode::BAD_REQUEST,
            CampError::CapacityExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CampError::NotFound { .. } => StatusCode::NOT_FOUND,
            CampError::Conflict(_) => StatusCode::CONFLICT,
            CampError::Store(RepositoryError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            CampError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CampError {
    fn into_response(self) -> Response {
        if let CampError::Store(err) = &self {
            tracing::error!(error = %err, "camp store failure");
        }

        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
