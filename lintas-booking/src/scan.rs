use chrono::Utc;
use std::sync::Arc;

use lintas_core::error::ReservationError;
use lintas_core::store::{ReservationStore, ScanOutcome};

/// Consumes a confirmed booking's ticket exactly once at boarding time.
pub struct TicketValidator {
    store: Arc<dyn ReservationStore>,
}

impl TicketValidator {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Validate and consume a ticket token.
    ///
    /// The Confirmed -> Used transition and the scan-record append happen
    /// atomically in the store; under concurrent scans of the same token
    /// exactly one caller sees `Valid`, every other sees `Rejected` with
    /// the already-used status. Non-confirmed bookings are never mutated.
    pub async fn scan(&self, ticket_token: &str) -> Result<ScanOutcome, ReservationError> {
        let outcome = self.store.consume_ticket(ticket_token, Utc::now()).await?;
        match &outcome {
            ScanOutcome::Valid { booking_id } => {
                tracing::info!(booking_id = %booking_id, "Ticket consumed");
            }
            ScanOutcome::Rejected { booking_id, status } => {
                tracing::info!(booking_id = %booking_id, status = %status, "Ticket rejected");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::ConfirmationService;
    use crate::holds::{HoldManager, HoldPolicy};
    use chrono::Duration;
    use lintas_core::booking::BookingStatus;
    use lintas_store::MemoryReservationStore;
    use uuid::Uuid;

    async fn confirmed_booking(store: &Arc<MemoryReservationStore>) -> (Uuid, String) {
        let user = Uuid::new_v4();
        let receipt = HoldManager::new(
            store.clone(),
            HoldPolicy {
                hold_ttl: Duration::minutes(3),
                base_fare_amount: 150000,
                fare_currency: "IDR".to_string(),
            },
        )
        .create_hold(user, Uuid::new_v4(), "Blok M", "Bandung", &[3, 4])
        .await
        .unwrap();

        ConfirmationService::new(store.clone())
            .confirm(receipt.booking_id, user)
            .await
            .unwrap();

        (receipt.booking_id, receipt.ticket_token)
    }

    #[tokio::test]
    async fn test_scan_consumes_exactly_once() {
        let store = Arc::new(MemoryReservationStore::new());
        let (booking_id, token) = confirmed_booking(&store).await;

        let validator = TicketValidator::new(store.clone());

        let first = validator.scan(&token).await.unwrap();
        assert_eq!(first, ScanOutcome::Valid { booking_id });

        let second = validator.scan(&token).await.unwrap();
        assert_eq!(
            second,
            ScanOutcome::Rejected {
                booking_id,
                status: BookingStatus::Used,
            }
        );

        // Exactly one audit record for the one successful consumption
        let scans = store.scan_records().await;
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].booking_id, booking_id);
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let store = Arc::new(MemoryReservationStore::new());
        let err = TicketValidator::new(store)
            .scan("no-such-token")
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::TokenNotFound));
    }

    #[tokio::test]
    async fn test_scan_of_unconfirmed_hold_mutates_nothing() {
        let store = Arc::new(MemoryReservationStore::new());

        let receipt = HoldManager::new(
            store.clone(),
            HoldPolicy {
                hold_ttl: Duration::minutes(3),
                base_fare_amount: 150000,
                fare_currency: "IDR".to_string(),
            },
        )
        .create_hold(Uuid::new_v4(), Uuid::new_v4(), "Blok M", "Bandung", &[3])
        .await
        .unwrap();

        let outcome = TicketValidator::new(store.clone())
            .scan(&receipt.ticket_token)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::Rejected {
                booking_id: receipt.booking_id,
                status: BookingStatus::Held,
            }
        );

        let booking = store.find_booking(receipt.booking_id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Held);
        assert!(store.scan_records().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_scans_one_valid() {
        let store = Arc::new(MemoryReservationStore::new());
        let (_, token) = confirmed_booking(&store).await;

        let validator = Arc::new(TicketValidator::new(store.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let validator = validator.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move { validator.scan(&token).await }));
        }

        let mut valid = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                ScanOutcome::Valid { .. } => valid += 1,
                ScanOutcome::Rejected { .. } => rejected += 1,
            }
        }

        assert_eq!(valid, 1);
        assert_eq!(rejected, 7);
        assert_eq!(store.scan_records().await.len(), 1);
    }
}
