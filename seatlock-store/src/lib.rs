pub mod app_config;
pub mod events;
pub mod registry;

pub use events::EventProducer;
pub use registry::{SeatRecord, SeatRegistry};
