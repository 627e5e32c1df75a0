// Route exports
pub mod matchmaking;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};

use crate::models::{ApiError, ApiResponse, ErrorCode};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(matchmaking::configure);
}

/// Unparseable request body, rendered in the response envelope
#[derive(Debug)]
pub struct BadJsonError {
    message: String,
}

impl std::fmt::Display for BadJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BadJsonError {}

impl error::ResponseError for BadJsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::BadRequest().json(ApiResponse::<()>::failure(ApiError::new(
            ErrorCode::BadJson,
            self.message.clone(),
        )))
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    BadJsonError {
        message: format!("Request body is not valid JSON: {}", err),
    }
    .into()
}
