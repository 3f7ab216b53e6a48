pub mod booking;
pub mod error;
pub mod store;
pub mod token;

pub use booking::{Booking, BookingStatus, Gender, ReservedSeat, ScanRecord, SeatAllocation};
pub use error::ReservationError;
pub use store::{NewHold, ReservationStore, ScanOutcome};
