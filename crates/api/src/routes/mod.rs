//! API route definitions.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use hearth_core::booking::BookingError;
use hearth_shared::AppError;

use crate::AppState;

pub mod bookings;
pub mod health;
pub mod listings;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(listings::routes())
        .merge(bookings::routes())
}

/// Maps a booking error onto the JSON error envelope.
///
/// Business-rule rejections pass through with their own status; only
/// storage-level failures are logged as errors and masked.
pub(crate) fn error_response(e: &BookingError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %e, "booking operation failed");
        return (
            status,
            Json(json!({
                "error": "INTERNAL_ERROR",
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}

/// Maps a transport-level error (malformed query/body values the domain
/// never sees) onto the same JSON envelope.
pub(crate) fn app_error_response(e: &AppError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}
