//! HTTP route handlers.

pub mod air_quality;
pub mod alerts;
pub mod auth;
pub mod health;
pub mod news;
pub mod newsletter;
pub mod reports;
pub mod settings;
pub mod status;
pub mod system_settings;
pub mod upload;
pub mod users;

use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Deserializes a body whose shape depends on the `action` query parameter.
pub(crate) fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::LoginRequest;
    use serde_json::json;

    #[test]
    fn test_parse_body_accepts_matching_shape() {
        let request: LoginRequest =
            parse_body(json!({"username": "alice", "password": "secret123"})).unwrap();
        assert_eq!(request.username, "alice");
    }

    #[test]
    fn test_parse_body_rejects_wrong_shape() {
        let err = parse_body::<LoginRequest>(json!({"username": 5})).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
