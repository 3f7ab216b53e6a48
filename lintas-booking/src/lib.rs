pub mod confirm;
pub mod holds;
pub mod reaper;
pub mod scan;
pub mod status;

pub use confirm::ConfirmationService;
pub use holds::{HoldManager, HoldPolicy, HoldReceipt};
pub use reaper::Reaper;
pub use scan::TicketValidator;
pub use status::SeatStatusQuery;
