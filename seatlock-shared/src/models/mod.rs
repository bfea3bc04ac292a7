pub mod events;

pub use events::{SeatEvent, SeatEventKind};
