use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lintas_core::booking::BookingStatus;
use lintas_core::store::ScanOutcome;

use crate::error::AppError;
use crate::middleware::auth::AgentClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScanTicketRequest {
    pub ticket_token: String,
}

#[derive(Debug, Serialize)]
pub struct ScanTicketResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub async fn scan_ticket(
    State(state): State<AppState>,
    Extension(_claims): Extension<AgentClaims>,
    Json(req): Json<ScanTicketRequest>,
) -> Result<Json<ScanTicketResponse>, AppError> {
    let outcome = state.tickets.scan(&req.ticket_token).await?;

    let response = match outcome {
        ScanOutcome::Valid { booking_id } => ScanTicketResponse {
            valid: true,
            booking_id: Some(booking_id),
            reason: None,
        },
        ScanOutcome::Rejected { booking_id, status } => ScanTicketResponse {
            valid: false,
            booking_id: Some(booking_id),
            reason: Some(rejection_reason(status).to_string()),
        },
    };

    Ok(Json(response))
}

fn rejection_reason(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Used => "already used",
        BookingStatus::Held => "not confirmed",
        BookingStatus::Released => "hold released",
        // A confirmed booking would have been consumed, not rejected
        BookingStatus::Confirmed => "not boardable",
    }
}
