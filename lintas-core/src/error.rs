use thiserror::Error;

/// Error taxonomy shared by the engine and the store implementations.
///
/// Every mutating store operation is all-or-nothing: any of these errors
/// means the transaction rolled back and no partial state is visible.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// Malformed or missing input, rejected before any transaction opens.
    #[error("invalid request: {0}")]
    Validation(String),

    /// One or more requested seats are already under a live allocation.
    /// Carries exactly the conflicting seat numbers so the caller can retry
    /// with a different selection.
    #[error("seats unavailable: {0:?}")]
    SeatsUnavailable(Vec<i32>),

    /// The hold expired or the booking is not in a state that permits the
    /// requested transition.
    #[error("{0}")]
    Conflict(String),

    /// The caller does not own the booking.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    /// Ticket token matches no booking at all.
    #[error("unknown ticket token")]
    TokenNotFound,

    /// Transient store failure; the transaction rolled back and the whole
    /// operation is safe to retry.
    #[error("store failure: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_seats() {
        let err = ReservationError::SeatsUnavailable(vec![3, 5]);
        assert_eq!(err.to_string(), "seats unavailable: [3, 5]");
    }
}
