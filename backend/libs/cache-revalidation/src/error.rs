//! Error types for revalidation operations

use thiserror::Error;

/// Revalidation errors
#[derive(Error, Debug)]
pub enum RevalidationError {
    /// Redis connection or operation error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Message serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid message format received
    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    /// Callback execution failed
    #[error("Callback execution failed: {0}")]
    CallbackFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RevalidationError::InvalidMessage("test".to_string());
        assert_eq!(err.to_string(), "Invalid message format: test");

        let err = RevalidationError::CallbackFailed("callback error".to_string());
        assert_eq!(err.to_string(), "Callback execution failed: callback error");
    }

    #[test]
    fn test_error_from_serde() {
        let json_err = serde_json::from_str::<String>("invalid json");
        assert!(json_err.is_err());

        let err: RevalidationError = json_err.unwrap_err().into();
        assert!(matches!(err, RevalidationError::Serialization(_)));
    }
}
