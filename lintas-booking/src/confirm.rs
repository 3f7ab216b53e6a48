use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use lintas_core::error::ReservationError;
use lintas_core::store::ReservationStore;

/// Promotes a live hold to a durable, terminal booking.
pub struct ConfirmationService {
    store: Arc<dyn ReservationStore>,
}

impl ConfirmationService {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Confirm `booking_id` on behalf of `owner_id`.
    ///
    /// The store verifies existence, ownership and liveness against a
    /// single clock reading and performs Held -> Confirmed atomically, so
    /// a hold the reaper released a moment earlier fails cleanly instead
    /// of confirming a freed seat.
    pub async fn confirm(&self, booking_id: Uuid, owner_id: Uuid) -> Result<(), ReservationError> {
        self.store.confirm(booking_id, owner_id, Utc::now()).await?;
        tracing::info!(booking_id = %booking_id, "Booking confirmed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holds::{HoldManager, HoldPolicy};
    use chrono::Duration;
    use lintas_core::booking::BookingStatus;
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
    async fn test_confirm_within_ttl() {
        let store = Arc::new(MemoryReservationStore::new());
        let user = Uuid::new_v4();

        let receipt = hold_manager(store.clone(), Duration::minutes(3))
            .create_hold(user, Uuid::new_v4(), "Blok M", "Bandung", &[3, 4])
            .await
            .unwrap();

        ConfirmationService::new(store.clone())
            .confirm(receipt.booking_id, user)
            .await
            .unwrap();

        let booking = store.find_booking(receipt.booking_id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_expired_hold_cannot_be_confirmed_without_sweep() {
        let store = Arc::new(MemoryReservationStore::new());
        let user = Uuid::new_v4();

        // TTL already elapsed; no reaper cycle has run.
        let receipt = hold_manager(store.clone(), Duration::zero())
            .create_hold(user, Uuid::new_v4(), "Blok M", "Bandung", &[3])
            .await
            .unwrap();

        let err = ConfirmationService::new(store)
            .confirm(receipt.booking_id, user)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_confirm_checks_ownership() {
        let store = Arc::new(MemoryReservationStore::new());

        let receipt = hold_manager(store.clone(), Duration::minutes(3))
            .create_hold(Uuid::new_v4(), Uuid::new_v4(), "Blok M", "Bandung", &[3])
            .await
            .unwrap();

        let err = ConfirmationService::new(store)
            .confirm(receipt.booking_id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_confirm_unknown_booking_is_conflict() {
        let store = Arc::new(MemoryReservationStore::new());
        let err = ConfirmationService::new(store)
            .confirm(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_confirm_after_release_fails_cleanly() {
        let store = Arc::new(MemoryReservationStore::new());
        let user = Uuid::new_v4();

        let receipt = hold_manager(store.clone(), Duration::zero())
            .create_hold(user, Uuid::new_v4(), "Blok M", "Bandung", &[3])
            .await
            .unwrap();

        // Reaper wins the race.
        store.release_expired(Utc::now()).await.unwrap();

        let err = ConfirmationService::new(store.clone())
            .confirm(receipt.booking_id, user)
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Conflict(_)));

        let booking = store.find_booking(receipt.booking_id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Released);
    }

    #[tokio::test]
    async fn test_double_confirm_is_conflict() {
        let store = Arc::new(MemoryReservationStore::new());
        let user = Uuid::new_v4();

        let receipt = hold_manager(store.clone(), Duration::minutes(3))
            .create_hold(user, Uuid::new_v4(), "Blok M", "Bandung", &[3])
            .await
            .unwrap();

        let service = ConfirmationService::new(store);
        service.confirm(receipt.booking_id, user).await.unwrap();

        let err = service.confirm(receipt.booking_id, user).await.unwrap_err();
        assert!(matches!(err, ReservationError::Conflict(_)));
    }
}
