use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use lintas_core::error::ReservationError;
use lintas_core::store::{NewHold, ReservationStore};
use lintas_core::token::generate_ticket_token;

/// Tunables for hold creation, mapped from `BusinessRules` at boot.
#[derive(Debug, Clone)]
pub struct HoldPolicy {
    pub hold_ttl: Duration,
    pub base_fare_amount: i32,
    pub fare_currency: String,
}

#[derive(Debug, Clone)]
pub struct HoldReceipt {
    pub booking_id: Uuid,
    pub ticket_token: String,
    pub hold_expires_at: DateTime<Utc>,
}

/// Allocates a set of seats to a short-lived, unconfirmed booking.
pub struct HoldManager {
    store: Arc<dyn ReservationStore>,
    policy: HoldPolicy,
}

impl HoldManager {
    pub fn new(store: Arc<dyn ReservationStore>, policy: HoldPolicy) -> Self {
        Self { store, policy }
    }

    /// Create a time-bounded hold on `seat_numbers` for `trip_id`.
    ///
    /// Input is validated before any store call. Price, ticket token and
    /// expiry are fixed here, once; the store applies the reclaim pass,
    /// conflict check and allocation as a single atomic unit, so two
    /// concurrent calls sharing a seat can never both succeed.
    pub async fn create_hold(
        &self,
        owner_id: Uuid,
        trip_id: Uuid,
        pickup: &str,
        dropoff: &str,
        seat_numbers: &[i32],
    ) -> Result<HoldReceipt, ReservationError> {
        validate_seats(seat_numbers)?;
        if pickup.trim().is_empty() {
            return Err(ReservationError::Validation(
                "pickup must not be empty".to_string(),
            ));
        }
        if dropoff.trim().is_empty() {
            return Err(ReservationError::Validation(
                "dropoff must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let hold_expires_at = now + self.policy.hold_ttl;
        let booking_id = Uuid::new_v4();
        let ticket_token = generate_ticket_token();

        let hold = NewHold {
            booking_id,
            user_id: owner_id,
            trip_id,
            pickup: pickup.to_string(),
            dropoff: dropoff.to_string(),
            seat_numbers: seat_numbers.to_vec(),
            total_price_amount: self.policy.base_fare_amount * seat_numbers.len() as i32,
            total_price_currency: self.policy.fare_currency.clone(),
            ticket_token: ticket_token.clone(),
            hold_expires_at,
        };

        self.store.create_hold(hold, now).await?;

        tracing::info!(
            booking_id = %booking_id,
            trip_id = %trip_id,
            seats = seat_numbers.len(),
            "Hold created"
        );

        Ok(HoldReceipt {
            booking_id,
            ticket_token,
            hold_expires_at,
        })
    }
}

fn validate_seats(seat_numbers: &[i32]) -> Result<(), ReservationError> {
    if seat_numbers.is_empty() {
        return Err(ReservationError::Validation(
            "at least one seat is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for seat in seat_numbers {
        if *seat < 1 {
            return Err(ReservationError::Validation(format!(
                "invalid seat number {seat}"
            )));
        }
        if !seen.insert(*seat) {
            return Err(ReservationError::Validation(format!(
                "duplicate seat number {seat}"
            )));
        }
    }

    Ok(())
}
