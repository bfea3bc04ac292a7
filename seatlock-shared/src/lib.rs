pub mod models;

pub use models::{SeatEvent, SeatEventKind};
