pub mod models;
pub mod manager;
pub mod expiry;

pub use models::{Booking, ReservationSettings, SeatLock};
pub use manager::ReservationManager;
pub use expiry::ExpiryReconciler;
