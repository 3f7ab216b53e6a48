use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus, ReservedSeat};
use crate::error::ReservationError;

/// A fully prepared hold, ready to be inserted. The engine computes price,
/// token and expiry up front; the store only has to apply it atomically.
#[derive(Debug, Clone)]
pub struct NewHold {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub trip_id: Uuid,
    pub pickup: String,
    pub dropoff: String,
    pub seat_numbers: Vec<i32>,
    pub total_price_amount: i32,
    pub total_price_currency: String,
    pub ticket_token: String,
    pub hold_expires_at: DateTime<Utc>,
}

/// Result of consuming a ticket. `Rejected` is a successful scan of a real
/// booking that is not currently boardable (held, released, or already
/// used); an unknown token surfaces as `ReservationError::TokenNotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Valid { booking_id: Uuid },
    Rejected { booking_id: Uuid, status: BookingStatus },
}

/// The Trip/Seat Store collaborator.
///
/// Seat exclusivity lives entirely behind this trait: each mutating method
/// is one atomic observe-then-mutate unit, and implementations must
/// serialize conflicting units (two holds on the same seat, two scans of
/// the same token) so that at most one succeeds. The engine adds no
/// in-process locking of its own.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Atomically: release expired holds, check the requested seats for
    /// live allocations, then insert the booking and its seat rows.
    /// `SeatsUnavailable` reports exactly the conflicting seats and leaves
    /// no mutation behind.
    async fn create_hold(&self, hold: NewHold, now: DateTime<Utc>) -> Result<(), ReservationError>;

    /// Transition every expired Held booking to Released and free its
    /// seats. Idempotent. Returns the number of bookings released.
    async fn release_expired(&self, now: DateTime<Utc>) -> Result<u64, ReservationError>;

    /// Promote a live hold owned by `owner_id` to Confirmed. Fails with
    /// `Conflict` if the hold expired, was released, or never existed, and
    /// with `Unauthorized` if it belongs to someone else.
    async fn confirm(
        &self,
        booking_id: Uuid,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationError>;

    /// Consume a ticket exactly once: the Confirmed -> Used transition and
    /// the scan-record append happen atomically, and concurrent scans of
    /// the same token see exactly one `Valid`.
    async fn consume_ticket(
        &self,
        ticket_token: &str,
        now: DateTime<Utc>,
    ) -> Result<ScanOutcome, ReservationError>;

    /// Every seat of the trip currently under a live allocation, with the
    /// owning user's declared gender. Read-only.
    async fn seat_status(
        &self,
        trip_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReservedSeat>, ReservationError>;

    /// Plain booking lookup for the read surface.
    async fn find_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, ReservationError>;
}
