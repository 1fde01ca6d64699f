use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Body of every `/submit` response.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusBody {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusBody {
    pub fn ok() -> StatusBody {
        StatusBody {
            status: "ok",
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> StatusBody {
        StatusBody {
            status: "error",
            error: Some(message.into()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Logged in full, reported to the client without details.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Internal(err) => {
                error!("Internal error: {err:#}");
                StatusBody::error("Internal server error")
            }
            err => StatusBody::error(err.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
