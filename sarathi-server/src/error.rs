use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sarathi_shared::ErrorBody;
use thiserror::Error;
use tracing::error;

use crate::provider::ProviderError;

/// Every failure a handler can report to the caller.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("provider request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{0}")]
    BadRequest(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Provider(_)
            | ServerError::MalformedRequest(_)
            | ServerError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
