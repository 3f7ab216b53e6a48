use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use lintas_core::booking::{Booking, BookingStatus, Gender, ReservedSeat, ScanRecord};
use lintas_core::error::ReservationError;
use lintas_core::store::{NewHold, ReservationStore, ScanOutcome};

/// In-memory reservation store for tests and local development.
///
/// One mutex guards all state, so every operation is a single critical
/// section: the same serializability the Postgres store gets from its
/// transactions, without a database.
#[derive(Default)]
pub struct MemoryReservationStore {
    state: Mutex<MemState>,
}

#[derive(Default)]
struct MemState {
    bookings: HashMap<Uuid, Booking>,
    // (trip_id, seat_number) -> booking owning the live allocation
    allocations: HashMap<(Uuid, i32), Uuid>,
    scans: Vec<ScanRecord>,
    user_genders: HashMap<Uuid, Gender>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the external users reference consumed by the seat-status
    /// projection.
    pub async fn register_user_gender(&self, user_id: Uuid, gender: Gender) {
        self.state.lock().await.user_genders.insert(user_id, gender);
    }

    /// Audit-trail inspection for tests; the engine itself never reads
    /// scan records back.
    pub async fn scan_records(&self) -> Vec<ScanRecord> {
        self.state.lock().await.scans.clone()
    }
}

impl MemState {
    fn release_expired(&mut self, now: DateTime<Utc>) -> u64 {
        let expired: Vec<Uuid> = self
            .bookings
            .values()
            .filter(|b| b.status == BookingStatus::Held && !b.hold_is_live(now))
            .map(|b| b.id)
            .collect();

        for id in &expired {
            if let Some(booking) = self.bookings.get_mut(id) {
                booking.status = BookingStatus::Released;
                booking.updated_at = now;
            }
            self.allocations.retain(|_, owner| owner != id);
        }

        expired.len() as u64
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn create_hold(&self, hold: NewHold, now: DateTime<Utc>) -> Result<(), ReservationError> {
        let mut state = self.state.lock().await;

        // 1. Reclaim pass
        state.release_expired(now);

        // 2. Conflict check
        let mut conflicting: Vec<i32> = hold
            .seat_numbers
            .iter()
            .copied()
            .filter(|seat| state.allocations.contains_key(&(hold.trip_id, *seat)))
            .collect();
        if !conflicting.is_empty() {
            conflicting.sort_unstable();
            return Err(ReservationError::SeatsUnavailable(conflicting));
        }

        // 3. Allocate
        for seat in &hold.seat_numbers {
            state
                .allocations
                .insert((hold.trip_id, *seat), hold.booking_id);
        }
        state.bookings.insert(
            hold.booking_id,
            Booking {
                id: hold.booking_id,
                user_id: hold.user_id,
                trip_id: hold.trip_id,
                pickup: hold.pickup,
                dropoff: hold.dropoff,
                total_price_amount: hold.total_price_amount,
                total_price_currency: hold.total_price_currency,
                ticket_token: hold.ticket_token,
                status: BookingStatus::Held,
                hold_expires_at: Some(hold.hold_expires_at),
                created_at: now,
                updated_at: now,
            },
        );

        Ok(())
    }

    async fn release_expired(&self, now: DateTime<Utc>) -> Result<u64, ReservationError> {
        Ok(self.state.lock().await.release_expired(now))
    }

    async fn confirm(
        &self,
        booking_id: Uuid,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationError> {
        let mut state = self.state.lock().await;

        let booking = state
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(expired_or_missing)?;

        if booking.user_id != owner_id {
            return Err(ReservationError::Unauthorized(
                "booking belongs to another user".to_string(),
            ));
        }
        if !booking.hold_is_live(now) {
            return Err(expired_or_missing());
        }

        booking.status = BookingStatus::Confirmed;
        booking.updated_at = now;
        Ok(())
    }

    async fn consume_ticket(
        &self,
        ticket_token: &str,
        now: DateTime<Utc>,
    ) -> Result<ScanOutcome, ReservationError> {
        let mut state = self.state.lock().await;

        let booking_id = state
            .bookings
            .values()
            .find(|b| b.ticket_token == ticket_token)
            .map(|b| b.id)
            .ok_or(ReservationError::TokenNotFound)?;

        let booking = state
            .bookings
            .get_mut(&booking_id)
            .ok_or(ReservationError::TokenNotFound)?;

        if booking.status != BookingStatus::Confirmed {
            return Ok(ScanOutcome::Rejected {
                booking_id,
                status: booking.status,
            });
        }

        booking.status = BookingStatus::Used;
        booking.updated_at = now;
        state.scans.push(ScanRecord {
            booking_id,
            scanned_at: now,
        });

        Ok(ScanOutcome::Valid { booking_id })
    }

    async fn seat_status(
        &self,
        trip_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReservedSeat>, ReservationError> {
        let state = self.state.lock().await;

        let mut seats: Vec<ReservedSeat> = state
            .allocations
            .iter()
            .filter(|((trip, _), _)| *trip == trip_id)
            .filter_map(|((_, seat_number), booking_id)| {
                let booking = state.bookings.get(booking_id)?;
                booking.is_live(now).then(|| ReservedSeat {
                    seat_number: *seat_number,
                    gender: state.user_genders.get(&booking.user_id).copied(),
                })
            })
            .collect();

        seats.sort_by_key(|s| s.seat_number);
        Ok(seats)
    }

    async fn find_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, ReservationError> {
        Ok(self.state.lock().await.bookings.get(&booking_id).cloned())
    }
}

fn expired_or_missing() -> ReservationError {
    ReservationError::Conflict("hold expired or not found".to_string())
}
