//! Typed errors and HTTP mapping.
//!
//! Expected conditions (missing id, unknown slug, invalid body) carry a short client-facing
//! message. Anything else is logged with its source and collapsed into `Failed to <action>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failures from the content facades and the stores behind them.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("slug '{0}' is already taken")]
    DuplicateSlug(String),
    #[error("invalid content: {0}")]
    Invalid(String),
    #[error("row decode: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ContentError {
    /// A client-supplied id that another row already uses.
    pub fn duplicate_id(id: &str) -> Self {
        ContentError::Invalid(format!("id '{}' already exists", id))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Failed to {action}")]
    Failed {
        action: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AppError {
    pub fn failed<E>(action: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AppError::Failed {
            action: action.into(),
            source: Box::new(source),
        }
    }
}

/// Attach the client-facing action to a facade result. Validation and slug conflicts keep
/// their own status; everything else becomes a generic failure.
pub trait ContentResultExt<T> {
    fn or_failed_to(self, action: &str) -> Result<T, AppError>;
}

impl<T> ContentResultExt<T> for Result<T, ContentError> {
    fn or_failed_to(self, action: &str) -> Result<T, AppError> {
        self.map_err(|e| match e {
            ContentError::Invalid(msg) => AppError::BadRequest(msg),
            ContentError::DuplicateSlug(slug) => {
                AppError::Conflict(format!("slug '{}' is already in use", slug))
            }
            other => AppError::failed(action, other),
        })
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Config(_) | AppError::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        };
        let message = match &self {
            AppError::Failed { action, source } => {
                tracing::error!(error = %source, "failed to {}", action);
                self.to_string()
            }
            AppError::Config(e) => {
                tracing::error!(error = %e, "configuration error");
                "Server misconfigured".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
