use chrono::{DateTime, Utc};
use seatlock_core::{SeatId, SeatSnapshot, SeatStatus};
use seatlock_reservation::ReservationManager;
use seatlock_shared::SeatEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::AppError;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SeatActionRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LockResponse {
    pub seat_id: SeatId,
    pub status: SeatStatus,
    pub expires_at: DateTime<Utc>,
    pub refreshed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub seat_id: SeatId,
    pub status: SeatStatus,
    pub owner: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub seat_id: SeatId,
    pub status: SeatStatus,
}

// ============================================================================
// Facade
// ============================================================================

/// Request-level entry point to the reservation manager.
///
/// Checks the shape of the input and translates results; every decision about
/// seat state is made by the manager.
#[derive(Clone)]
pub struct SeatService {
    manager: ReservationManager,
}

impl SeatService {
    pub fn new(manager: ReservationManager) -> Self {
        Self { manager }
    }

    pub fn seat_count(&self) -> usize {
        self.manager.registry().seat_count()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SeatEvent> {
        self.manager.events().subscribe()
    }

    pub async fn lock(&self, raw_seat_id: &str, user_id: &str) -> Result<LockResponse, AppError> {
        let seat_id = parse_seat_id(raw_seat_id)?;
        let claimant = parse_claimant(user_id)?;

        let lock = self.manager.claim_default(seat_id, claimant).await?;
        Ok(LockResponse {
            seat_id: lock.seat_id,
            status: lock.status(),
            expires_at: lock.expires_at,
            refreshed: lock.refreshed,
        })
    }

    pub async fn confirm(&self, raw_seat_id: &str, user_id: &str) -> Result<ConfirmResponse, AppError> {
        let seat_id = parse_seat_id(raw_seat_id)?;
        let claimant = parse_claimant(user_id)?;

        let booking = self.manager.confirm(seat_id, claimant).await?;
        Ok(ConfirmResponse {
            seat_id: booking.seat_id,
            status: booking.status(),
            owner: booking.owner,
        })
    }

    pub async fn release(&self, raw_seat_id: &str, user_id: &str) -> Result<ReleaseResponse, AppError> {
        let seat_id = parse_seat_id(raw_seat_id)?;
        let claimant = parse_claimant(user_id)?;

        let seat = self.manager.release(seat_id, claimant).await?;
        Ok(ReleaseResponse {
            seat_id: seat.id,
            status: seat.status,
        })
    }

    pub async fn list(&self) -> Vec<SeatSnapshot> {
        self.manager.list().await
    }

    pub async fn get(&self, raw_seat_id: &str) -> Result<SeatSnapshot, AppError> {
        let seat_id = parse_seat_id(raw_seat_id)?;
        Ok(self.manager.seat(seat_id).await?)
    }
}

fn parse_seat_id(raw: &str) -> Result<SeatId, AppError> {
    raw.parse::<SeatId>()
        .map_err(|e| AppError::ValidationError(e.to_string()))
}

fn parse_claimant(raw: &str) -> Result<&str, AppError> {
    let claimant = raw.trim();
    if claimant.is_empty() {
        return Err(AppError::ValidationError("user_id must not be empty".to_string()));
    }
    Ok(claimant)
}
