use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use lintas_core::error::ReservationError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    SeatConflict(Vec<i32>),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": msg }))
            }
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::SeatConflict(seats) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "seats unavailable",
                    "conflicting_seats": seats,
                }),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::Validation(msg) => AppError::ValidationError(msg),
            ReservationError::SeatsUnavailable(seats) => AppError::SeatConflict(seats),
            ReservationError::Conflict(msg) => AppError::ConflictError(msg),
            ReservationError::Unauthorized(msg) => AppError::AuthorizationError(msg),
            ReservationError::NotFound(what) => AppError::NotFoundError(format!("{what} not found")),
            ReservationError::TokenNotFound => {
                AppError::NotFoundError("unknown ticket token".to_string())
            }
            ReservationError::Store(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
