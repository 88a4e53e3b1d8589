//! Request failure kinds and their HTTP mapping

use hyper::StatusCode;
use serde_json::{json, Value};

use crate::store::StoreError;

/// Everything that can end a request early. The `Display` text is the
/// client-facing `error` message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid item ID")]
    InvalidId,
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error("Failed to read request body")]
    BodyRead,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("Item not found")]
    ItemNotFound,
    #[error("Not found")]
    RouteNotFound,
    #[error("Internal server error")]
    Storage(#[from] StoreError),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::InvalidJson | Self::Validation(_) | Self::BodyRead => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ItemNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            Self::Validation(details) => json!({ "error": self.to_string(), "details": details }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body_lists_details() {
        let err = ApiError::Validation(vec!["Name is required".to_string()]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.body(),
            json!({"error": "Validation failed", "details": ["Name is required"]})
        );
    }

    #[test]
    fn test_storage_error_hides_cause() {
        let err = ApiError::from(StoreError::Disposed);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body(), json!({"error": "Internal server error"}));
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("store has been disposed".to_string())
        );
    }

    #[test]
    fn test_not_found_kinds() {
        assert_eq!(ApiError::ItemNotFound.body(), json!({"error": "Item not found"}));
        assert_eq!(ApiError::RouteNotFound.body(), json!({"error": "Not found"}));
        assert_eq!(ApiError::RouteNotFound.status(), StatusCode::NOT_FOUND);
    }
}
