use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uniform envelope wrapping every JSON response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Machine-readable failure payload; callers branch on `code`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Wire codes for every failure shape the service produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidBody,
    BadJson,
    UserNotFound,
    TooFrequent,
    EmptyPool,
    DbError,
    Unknown,
}

/// Submit success payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitData {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_serialize_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::InvalidBody).unwrap(),
            "\"INVALID_BODY\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::BadJson).unwrap(),
            "\"BAD_JSON\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::TooFrequent).unwrap(),
            "\"TOO_FREQUENT\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::EmptyPool).unwrap(),
            "\"EMPTY_POOL\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::DbError).unwrap(),
            "\"DB_ERROR\""
        );
    }

    #[test]
    fn test_success_envelope_omits_error() {
        let response = ApiResponse::ok(SubmitData {
            user_id: Uuid::new_v4(),
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert!(json["data"]["userId"].is_string());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_envelope_omits_data() {
        let response = ApiResponse::<()>::failure(ApiError::new(
            ErrorCode::UserNotFound,
            "User not found",
        ));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "USER_NOT_FOUND");
        assert_eq!(json["error"]["message"], "User not found");
    }
}
