use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lintas_core::booking::BookingStatus;

use crate::error::AppError;
use crate::middleware::auth::CustomerClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmBookingRequest {
    pub booking_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ConfirmBookingResponse {
    pub success: bool,
}

pub async fn confirm_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<ConfirmBookingRequest>,
) -> Result<Json<ConfirmBookingResponse>, AppError> {
    let owner_id = claims.user_id()?;

    state.confirmations.confirm(req.booking_id, owner_id).await?;

    Ok(Json(ConfirmBookingResponse { success: true }))
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub trip_id: Uuid,
    pub pickup: String,
    pub dropoff: String,
    pub total_price_amount: i32,
    pub total_price_currency: String,
    pub ticket_token: String,
    pub status: BookingStatus,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let owner_id = claims.user_id()?;

    let booking = state
        .store
        .find_booking(booking_id)
        .await?
        // Other users' bookings are indistinguishable from missing ones
        .filter(|b| b.user_id == owner_id)
        .ok_or_else(|| AppError::NotFoundError("booking not found".to_string()))?;

    Ok(Json(BookingResponse {
        booking_id: booking.id,
        trip_id: booking.trip_id,
        pickup: booking.pickup,
        dropoff: booking.dropoff,
        total_price_amount: booking.total_price_amount,
        total_price_currency: booking.total_price_currency,
        ticket_token: booking.ticket_token,
        status: booking.status,
        hold_expires_at: booking.hold_expires_at,
        created_at: booking.created_at,
    }))
}
