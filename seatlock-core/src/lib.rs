pub mod clock;
pub mod error;
pub mod seat;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ReservationError;
pub use seat::{ParseSeatIdError, SeatId, SeatSnapshot, SeatState, SeatStatus};

pub type CoreResult<T> = Result<T, ReservationError>;
