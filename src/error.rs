use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Message carried by a failed lookup when the user does not exist. The
/// client matches on this exact text, so both sides must agree on it.
pub const NOT_FOUND_MESSAGE: &str = "Not Found";

/// Outcome of a failed call to the GitHub API, already classified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProcedureError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Body of a failed procedure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl ProcedureError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProcedureError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProcedureError::Upstream(UpstreamError::NotFound) => StatusCode::NOT_FOUND,
            ProcedureError::Upstream(UpstreamError::Other(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProcedureError::InvalidInput(_) => "BAD_REQUEST",
            ProcedureError::Upstream(UpstreamError::NotFound) => "NOT_FOUND",
            ProcedureError::Upstream(UpstreamError::Other(_)) => "UPSTREAM_ERROR",
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorBody {
                message: self.to_string(),
                code: Some(self.code().to_string()),
            },
        }
    }
}

impl IntoResponse for ProcedureError {
    fn into_response(self) -> Response {
        (self.status(), axum::Json(self.envelope())).into_response()
    }
}
