use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::{validate_submission, DrawEngine, DrawError};
use crate::models::{
    ApiError, ApiResponse, DrawRequest, ErrorCode, HealthResponse, SubmitData, SubmitRequest,
};
use crate::services::{PostgresClient, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub engine: DrawEngine,
}

/// Configure all matchmaking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/submit", web::post().to(submit_profile))
        .route("/draw", web::post().to(draw_match));
}

fn failure(code: ErrorCode, message: impl Into<String>) -> ApiResponse<()> {
    ApiResponse::failure(ApiError::new(code, message))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Profile submission endpoint
///
/// POST /submit
///
/// Request body:
/// ```json
/// {
///   "nickname": "string",
///   "age": 25,
///   "gender": "male|female",
///   "contact_handle": "string"
/// }
/// ```
async fn submit_profile(
    state: web::Data<AppState>,
    req: web::Json<SubmitRequest>,
) -> impl Responder {
    let draft = match validate_submission(&req) {
        Ok(draft) => draft,
        Err(e) => {
            tracing::info!("Rejected submission: {}", e);
            return HttpResponse::BadRequest().json(failure(
                ErrorCode::InvalidBody,
                format!("Invalid input, please check the form ({})", e),
            ));
        }
    };

    match state.postgres.insert_profile(&draft).await {
        Ok(id) => HttpResponse::Ok().json(ApiResponse::ok(SubmitData { user_id: id })),
        Err(e @ StoreError::Sqlx(_)) => {
            tracing::error!("Failed to insert profile: {}", e);
            HttpResponse::InternalServerError().json(failure(
                ErrorCode::DbError,
                "Could not save your profile, please retry later",
            ))
        }
        Err(e) => {
            tracing::error!("Unexpected store failure on submit: {}", e);
            HttpResponse::InternalServerError().json(failure(
                ErrorCode::Unknown,
                "Unexpected service error, please retry later",
            ))
        }
    }
}

/// Draw endpoint
///
/// POST /draw
///
/// Request body:
/// ```json
/// {
///   "user_id": "uuid"
/// }
/// ```
async fn draw_match(
    state: web::Data<AppState>,
    req: web::Json<DrawRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let user_id = match req.user_id.as_deref().map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        _ => {
            tracing::info!("Rejected draw request without a valid user_id");
            return HttpResponse::BadRequest().json(failure(
                ErrorCode::InvalidBody,
                "user_id must be a valid UUID",
            ));
        }
    };

    let fingerprint = request_fingerprint(&http_req);

    match state.engine.draw(user_id, fingerprint).await {
        Ok(matched) => HttpResponse::Ok().json(ApiResponse::ok(matched)),
        Err(e) => draw_error_response(e),
    }
}

/// Map a draw failure onto its envelope code and HTTP status.
///
/// `EmptyPool` is HTTP 200 on purpose: an empty opposite-gender pool is a
/// legitimate "try later" outcome, shaped as success:false so callers
/// branch on the code rather than the status line.
fn draw_error_response(err: DrawError) -> HttpResponse {
    match err {
        DrawError::UserNotFound => HttpResponse::NotFound().json(failure(
            ErrorCode::UserNotFound,
            "User not found, please submit your profile again",
        )),
        DrawError::RateLimited { .. } => HttpResponse::TooManyRequests().json(failure(
            ErrorCode::TooFrequent,
            "Too many draws, please wait a moment and retry",
        )),
        DrawError::EmptyPool => HttpResponse::Ok().json(failure(
            ErrorCode::EmptyPool,
            "No opposite-gender profiles available yet, try again later",
        )),
        DrawError::Store(e) => {
            tracing::error!("Draw failed on store access: {}", e);
            HttpResponse::InternalServerError().json(failure(
                ErrorCode::DbError,
                "Service error, please retry later",
            ))
        }
    }
}

/// SHA-256 of the request origin, truncated to 32 hex chars.
///
/// Prefers the first x-forwarded-for hop, falling back to the peer
/// address. Stored alongside the draw log for abuse diagnostics only;
/// never consulted by the matching logic.
fn request_fingerprint(req: &HttpRequest) -> Option<String> {
    let origin = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))?;

    let mut fingerprint = hex::encode(Sha256::digest(origin.as_bytes()));
    fingerprint.truncate(32);
    Some(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    #[test]
    fn test_fingerprint_from_forwarded_header() {
        let proxied = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.9, 10.0.0.1"))
            .to_http_request();
        let fingerprint = request_fingerprint(&proxied).unwrap();

        assert_eq!(fingerprint.len(), 32);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));

        // Only the first hop counts
        let direct = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.9"))
            .to_http_request();
        assert_eq!(request_fingerprint(&direct).unwrap(), fingerprint);
    }

    #[test]
    fn test_fingerprint_falls_back_to_peer_addr() {
        let req = TestRequest::default()
            .peer_addr("198.51.100.7:443".parse().unwrap())
            .to_http_request();
        let fingerprint = request_fingerprint(&req).unwrap();

        assert_eq!(fingerprint.len(), 32);
    }

    #[test]
    fn test_fingerprint_absent_without_origin() {
        let req = TestRequest::default().to_http_request();

        assert!(request_fingerprint(&req).is_none());
    }

    #[test]
    fn test_draw_error_statuses() {
        assert_eq!(
            draw_error_response(DrawError::UserNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            draw_error_response(DrawError::RateLimited {
                elapsed_secs: 3,
                cooldown_secs: 30
            })
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        // Empty pool is a soft outcome, not an error status
        assert_eq!(
            draw_error_response(DrawError::EmptyPool).status(),
            StatusCode::OK
        );
        assert_eq!(
            draw_error_response(DrawError::Store(StoreError::Sqlx(sqlx::Error::RowNotFound)))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
