use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use lintas_core::booking::ReservedSeat;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SeatStatusResponse {
    pub reserved_seats: Vec<ReservedSeat>,
}

/// Public seat map: no auth, read-only. Gender is advisory data for the
/// client's seating UI.
pub async fn trip_seat_status(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<SeatStatusResponse>, AppError> {
    let reserved_seats = state.seat_status.seat_status(trip_id).await?;
    Ok(Json(SeatStatusResponse { reserved_seats }))
}
