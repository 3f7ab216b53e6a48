use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::CustomerClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateHoldRequest {
    pub trip_id: Uuid,
    pub pickup: String,
    pub dropoff: String,
    pub seats: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct CreateHoldResponse {
    pub booking_id: Uuid,
    pub ticket_token: String,
    pub hold_expires_at: DateTime<Utc>,
}

pub async fn create_hold(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<CreateHoldRequest>,
) -> Result<Json<CreateHoldResponse>, AppError> {
    let owner_id = claims.user_id()?;

    let receipt = state
        .holds
        .create_hold(owner_id, req.trip_id, &req.pickup, &req.dropoff, &req.seats)
        .await?;

    Ok(Json(CreateHoldResponse {
        booking_id: receipt.booking_id,
        ticket_token: receipt.ticket_token,
        hold_expires_at: receipt.hold_expires_at,
    }))
}
