use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub trip_id: Uuid,
    pub pickup: String,
    pub dropoff: String,
    pub total_price_amount: i32,
    pub total_price_currency: String,
    pub ticket_token: String,
    pub status: BookingStatus,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// A hold is live while its expiry is strictly in the future. Only
    /// meaningful for `Held` bookings; confirmed and used bookings ignore
    /// the expiry entirely.
    pub fn hold_is_live(&self, now: DateTime<Utc>) -> bool {
        match (&self.status, self.hold_expires_at) {
            (BookingStatus::Held, Some(expires_at)) => expires_at > now,
            _ => false,
        }
    }

    /// Live bookings are the ones whose seat allocations count against
    /// seat exclusivity: unexpired holds, confirmed, and used.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            BookingStatus::Held => self.hold_is_live(now),
            BookingStatus::Confirmed | BookingStatus::Used => true,
            BookingStatus::Released => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Held,
    Confirmed,
    Used,
    Released,
}

impl BookingStatus {
    /// One-way lifecycle: Held -> Confirmed -> Used, or Held -> Released.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Held, BookingStatus::Confirmed)
                | (BookingStatus::Held, BookingStatus::Released)
                | (BookingStatus::Confirmed, BookingStatus::Used)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Held => "HELD",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Used => "USED",
            BookingStatus::Released => "RELEASED",
        }
    }

    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "HELD" => Some(BookingStatus::Held),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "USED" => Some(BookingStatus::Used),
            "RELEASED" => Some(BookingStatus::Released),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per reserved seat, created atomically with its booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAllocation {
    pub trip_id: Uuid,
    pub seat_number: i32,
    pub booking_id: Uuid,
}

/// Append-only audit record, written once per successful ticket scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub booking_id: Uuid,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Seat-status projection row: an occupied seat plus the owning user's
/// declared gender. Advisory data for seating policy rendering; the engine
/// never enforces adjacency rules on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservedSeat {
    pub seat_number: i32,
    pub gender: Option<Gender>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking_with(status: BookingStatus, expires_at: Option<DateTime<Utc>>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            pickup: "Blok M".to_string(),
            dropoff: "Bandung".to_string(),
            total_price_amount: 150000,
            total_price_currency: "IDR".to_string(),
            ticket_token: "tok".to_string(),
            status,
            hold_expires_at: expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_transitions_are_one_way() {
        assert!(BookingStatus::Held.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Held.can_transition_to(BookingStatus::Released));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Used));

        // No reversals, no skips
        assert!(!BookingStatus::Held.can_transition_to(BookingStatus::Used));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Held));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Released));
        assert!(!BookingStatus::Used.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Released.can_transition_to(BookingStatus::Held));
        assert!(!BookingStatus::Released.can_transition_to(BookingStatus::Confirmed));
    }

    #[test]
    fn test_hold_liveness() {
        let now = Utc::now();

        let live = booking_with(BookingStatus::Held, Some(now + Duration::minutes(3)));
        assert!(live.hold_is_live(now));
        assert!(live.is_live(now));

        let expired = booking_with(BookingStatus::Held, Some(now - Duration::seconds(1)));
        assert!(!expired.hold_is_live(now));
        assert!(!expired.is_live(now));

        // Expiry is ignored once the booking is past Held
        let confirmed = booking_with(BookingStatus::Confirmed, Some(now - Duration::minutes(10)));
        assert!(!confirmed.hold_is_live(now));
        assert!(confirmed.is_live(now));

        let released = booking_with(BookingStatus::Released, None);
        assert!(!released.is_live(now));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            BookingStatus::Held,
            BookingStatus::Confirmed,
            BookingStatus::Used,
            BookingStatus::Released,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("PENDING"), None);
    }
}
