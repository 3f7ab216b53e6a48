use std::sync::Arc;

use lintas_booking::{
    ConfirmationService, HoldManager, HoldPolicy, SeatStatusQuery, TicketValidator,
};
use lintas_core::store::ReservationStore;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReservationStore>,
    pub holds: Arc<HoldManager>,
    pub confirmations: Arc<ConfirmationService>,
    pub tickets: Arc<TicketValidator>,
    pub seat_status: Arc<SeatStatusQuery>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn ReservationStore>, policy: HoldPolicy, auth: AuthConfig) -> Self {
        Self {
            holds: Arc::new(HoldManager::new(store.clone(), policy)),
            confirmations: Arc::new(ConfirmationService::new(store.clone())),
            tickets: Arc::new(TicketValidator::new(store.clone())),
            seat_status: Arc::new(SeatStatusQuery::new(store.clone())),
            store,
            auth,
        }
    }
}
