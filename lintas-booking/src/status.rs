use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use lintas_core::booking::ReservedSeat;
use lintas_core::error::ReservationError;
use lintas_core::store::ReservationStore;

/// Read-only projection of the seats currently allocated on a trip.
pub struct SeatStatusQuery {
    store: Arc<dyn ReservationStore>,
}

impl SeatStatusQuery {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Every seat under a live allocation (unexpired hold, confirmed, or
    /// used), with the owning user's declared gender attribute. The gender
    /// is rendered by clients for seating policy; nothing here enforces it.
    pub async fn seat_status(&self, trip_id: Uuid) -> Result<Vec<ReservedSeat>, ReservationError> {
        self.store.seat_status(trip_id, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::ConfirmationService;
    use crate::holds::{HoldManager, HoldPolicy};
    use chrono::Duration;
    use lintas_core::booking::Gender;
    use lintas_store::MemoryReservationStore;

    fn hold_manager(store: Arc<MemoryReservationStore>, ttl: Duration) -> HoldManager {
        HoldManager::new(
            store,
            HoldPolicy {
                hold_ttl: ttl,
                base_fare_amount: 150000,
                fare_currency: "IDR".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_live_allocations_with_gender() {
        let store = Arc::new(MemoryReservationStore::new());
        let trip = Uuid::new_v4();

        let holder = Uuid::new_v4();
        store.register_user_gender(holder, Gender::Female).await;
        hold_manager(store.clone(), Duration::minutes(3))
            .create_hold(holder, trip, "Blok M", "Bandung", &[2])
            .await
            .unwrap();

        let confirmer = Uuid::new_v4();
        store.register_user_gender(confirmer, Gender::Male).await;
        let receipt = hold_manager(store.clone(), Duration::minutes(3))
            .create_hold(confirmer, trip, "Kuningan", "Bandung", &[7])
            .await
            .unwrap();
        ConfirmationService::new(store.clone())
            .confirm(receipt.booking_id, confirmer)
            .await
            .unwrap();

        let seats = SeatStatusQuery::new(store).seat_status(trip).await.unwrap();
        assert_eq!(seats.len(), 2);
        assert_eq!(seats[0].seat_number, 2);
        assert_eq!(seats[0].gender, Some(Gender::Female));
        assert_eq!(seats[1].seat_number, 7);
        assert_eq!(seats[1].gender, Some(Gender::Male));
    }

    #[tokio::test]
    async fn test_expired_hold_is_not_reported_even_before_sweep() {
        let store = Arc::new(MemoryReservationStore::new());
        let trip = Uuid::new_v4();

        hold_manager(store.clone(), Duration::zero())
            .create_hold(Uuid::new_v4(), trip, "Blok M", "Bandung", &[4])
            .await
            .unwrap();

        let seats = SeatStatusQuery::new(store).seat_status(trip).await.unwrap();
        assert!(seats.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_gender_is_none() {
        let store = Arc::new(MemoryReservationStore::new());
        let trip = Uuid::new_v4();

        hold_manager(store.clone(), Duration::minutes(3))
            .create_hold(Uuid::new_v4(), trip, "Blok M", "Bandung", &[1])
            .await
            .unwrap();

        let seats = SeatStatusQuery::new(store).seat_status(trip).await.unwrap();
        assert_eq!(seats.len(), 1);
        assert_eq!(seats[0].gender, None);
    }
}
