//! API error type: every failure becomes a JSON body with a status code

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::extractor::ExtractError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid {0} URL")]
    InvalidUrl(&'static str),

    #[error("no playable formats found")]
    NoFormats,

    #[error(transparent)]
    Extraction(#[from] ExtractError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::NoFormats => StatusCode::NOT_FOUND,
            Self::Extraction(e) => match e {
                ExtractError::PrivateContent | ExtractError::GeoBlocked => StatusCode::FORBIDDEN,
                ExtractError::Unavailable => StatusCode::NOT_FOUND,
                ExtractError::UnsupportedUrl => StatusCode::BAD_REQUEST,
                ExtractError::RateLimited => StatusCode::SERVICE_UNAVAILABLE,
                ExtractError::NetworkTimeout => StatusCode::GATEWAY_TIMEOUT,
                ExtractError::ToolNotFound(_)
                | ExtractError::Parse(_)
                | ExtractError::Execution(_)
                | ExtractError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side failures keep their detail in the log only
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
