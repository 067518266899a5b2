//! Error taxonomy shared by the registry, document model, store adapter and routes.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::blocks::registry::ValidationError;
use crate::routes::ErrorResponse;

/// Result type for CMS operations.
pub type CmsResult<T> = Result<T, CmsError>;

/// Errors raised by the CMS core and surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum CmsError {
    /// Block type tag not present in the schema registry.
    #[error("unknown block type: {0}")]
    UnknownBlockType(String),

    /// Document model operation referenced a block id that is not in the page.
    #[error("block not found: {0}")]
    NotFound(String),

    /// Patch target is not one of the block type's editable elements.
    #[error("invalid path '{path}' for block type '{block_type}'")]
    InvalidPath { block_type: String, path: String },

    /// Props failed the structural check for their block type.
    #[error("validation failed: {}", join_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    /// Two blocks of one page share an id.
    #[error("duplicate block id: {0}")]
    DuplicateBlockId(String),

    /// Write attempted without an authenticated user.
    #[error("authentication required")]
    Unauthorized,

    #[error("page not found: {0}")]
    PageNotFound(String),

    #[error("unknown brand: {0}")]
    UnknownBrand(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Backing store call failed. Transient; the caller may retry.
    #[error("content store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

fn join_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CmsError {
    pub fn invalid_path(block_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self::InvalidPath {
            block_type: block_type.into(),
            path: path.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CmsError::UnknownBlockType(_)
            | CmsError::InvalidPath { .. }
            | CmsError::Validation(_)
            | CmsError::DuplicateBlockId(_)
            | CmsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CmsError::NotFound(_) | CmsError::PageNotFound(_) | CmsError::UnknownBrand(_) => {
                StatusCode::NOT_FOUND
            }
            CmsError::Unauthorized => StatusCode::UNAUTHORIZED,
            CmsError::Conflict(_) => StatusCode::CONFLICT,
            CmsError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CmsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the admin UI.
    pub fn code(&self) -> &'static str {
        match self {
            CmsError::UnknownBlockType(_) => "unknown_block_type",
            CmsError::NotFound(_) => "not_found",
            CmsError::InvalidPath { .. } => "invalid_path",
            CmsError::Validation(_) => "validation_error",
            CmsError::DuplicateBlockId(_) => "duplicate_block_id",
            CmsError::Unauthorized => "unauthorized",
            CmsError::PageNotFound(_) => "page_not_found",
            CmsError::UnknownBrand(_) => "unknown_brand",
            CmsError::Conflict(_) => "conflict",
            CmsError::InvalidInput(_) => "invalid_input",
            CmsError::StoreUnavailable(_) => "store_unavailable",
            CmsError::Internal(_) => "internal_error",
        }
    }
}

impl From<sqlx::Error> for CmsError {
    fn from(e: sqlx::Error) -> Self {
        CmsError::StoreUnavailable(e.to_string())
    }
}

impl IntoResponse for CmsError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }

        let details = match &self {
            CmsError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.code().to_string(),
                message: Some(self.to_string()),
                details,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            CmsError::UnknownBlockType("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CmsError::NotFound("b1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(CmsError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            CmsError::StoreUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_validation_message_lists_every_error() {
        let err = CmsError::Validation(vec![
            ValidationError::new("headline", "is required"),
            ValidationError::new("alignment", "must be one of: left, center, right"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("headline: is required"));
        assert!(msg.contains("alignment: must be one of"));
    }
}
