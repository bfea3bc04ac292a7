use chrono::{DateTime, Utc};
use seatlock_core::{SeatId, SeatStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a successful claim: the caller holds the lock until `expires_at`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatLock {
    pub seat_id: SeatId,
    pub owner: String,
    pub expires_at: DateTime<Utc>,
    /// True when an existing lock of the same owner was extended
    pub refreshed: bool,
}

impl SeatLock {
    pub fn status(&self) -> SeatStatus {
        SeatStatus::Locked
    }
}

/// Result of a successful confirmation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub seat_id: SeatId,
    pub owner: String,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn status(&self) -> SeatStatus {
        SeatStatus::Booked
    }
}

/// Tunables of the reservation manager
#[derive(Debug, Clone)]
pub struct ReservationSettings {
    /// Lease granted when the caller does not ask for a specific one
    pub default_lease: Duration,
    /// Delay past the deadline before a per-claim timer fires
    pub expiry_grace: Duration,
    /// When false, only the periodic sweep and lazy checks reclaim seats
    pub per_claim_timers: bool,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            default_lease: Duration::from_millis(60_000),
            expiry_grace: Duration::from_millis(5),
            per_claim_timers: true,
        }
    }
}
