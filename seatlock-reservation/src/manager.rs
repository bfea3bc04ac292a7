use crate::expiry;
use crate::models::{Booking, ReservationSettings, SeatLock};
use chrono::{DateTime, Utc};
use seatlock_core::{Clock, CoreResult, ReservationError, SeatId, SeatSnapshot, SeatState};
use seatlock_shared::{SeatEvent, SeatEventKind};
use seatlock_store::{EventProducer, SeatRecord, SeatRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Per-seat reservation state machine.
///
/// Every operation takes the seat's own lock for its whole duration, so for one
/// seat claim/confirm/release/expire are linearizable while different seats
/// proceed in parallel. Cloning is cheap and shares the same registry.
#[derive(Clone)]
pub struct ReservationManager {
    registry: Arc<SeatRegistry>,
    clock: Arc<dyn Clock>,
    events: EventProducer,
    settings: ReservationSettings,
}

impl ReservationManager {
    pub fn new(
        registry: Arc<SeatRegistry>,
        clock: Arc<dyn Clock>,
        events: EventProducer,
        settings: ReservationSettings,
    ) -> Self {
        Self {
            registry,
            clock,
            events,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<SeatRegistry> {
        &self.registry
    }

    pub fn events(&self) -> &EventProducer {
        &self.events
    }

    /// Claim with the configured default lease
    pub async fn claim_default(&self, seat_id: SeatId, claimant: &str) -> CoreResult<SeatLock> {
        self.claim(seat_id, claimant, self.settings.default_lease).await
    }

    /// Transition: Available → Locked, or Locked → Locked (refresh by the same owner)
    ///
    /// A lock whose lease has lapsed is reclaimed inline before anything else,
    /// whether or not a timer or the sweep got to it first.
    pub async fn claim(&self, seat_id: SeatId, claimant: &str, lease: Duration) -> CoreResult<SeatLock> {
        let span = lease_span(lease)?;
        let mut record = self.registry.get(seat_id)?.lock().await;
        let now = self.clock.now();
        let expires_at = now.checked_add_signed(span).ok_or(ReservationError::InvalidLease)?;

        self.expire_if_lapsed(seat_id, &mut record, now);

        let refreshed = match record.state() {
            SeatState::Booked { .. } => return Err(ReservationError::AlreadyBooked(seat_id)),
            SeatState::Locked { owner, expires_at: held_until } if owner != claimant => {
                return Err(ReservationError::LockConflict {
                    seat_id,
                    holder: owner.clone(),
                    expires_at: *held_until,
                });
            }
            SeatState::Locked { .. } => true,
            SeatState::Available => false,
        };

        let timer = self.schedule_expiry(seat_id, lease);
        record.lock(claimant.to_string(), expires_at, timer);

        let kind = if refreshed {
            debug!("Seat {} lock refreshed by {} until {}", seat_id, claimant, expires_at);
            SeatEventKind::Refreshed
        } else {
            info!("Seat {} locked by {} until {}", seat_id, claimant, expires_at);
            SeatEventKind::Locked
        };
        self.events
            .publish(SeatEvent::new(seat_id.value(), kind, claimant, now).with_expiry(expires_at));

        Ok(SeatLock {
            seat_id,
            owner: claimant.to_string(),
            expires_at,
            refreshed,
        })
    }

    /// Transition: Locked → Booked (terminal)
    ///
    /// A lapsed lock is released as part of the failure, never confirmed. The
    /// holder of a lapsed lock sees `LockExpired` whether the seat was reclaimed
    /// here or earlier by a timer or the sweep.
    pub async fn confirm(&self, seat_id: SeatId, claimant: &str) -> CoreResult<Booking> {
        let mut record = self.registry.get(seat_id)?.lock().await;
        let now = self.clock.now();

        match record.state() {
            SeatState::Booked { .. } => return Err(ReservationError::AlreadyBooked(seat_id)),
            SeatState::Available if record.lapsed_owner() == Some(claimant) => {
                return Err(ReservationError::LockExpired(seat_id));
            }
            SeatState::Available => return Err(ReservationError::NotLocked(seat_id)),
            SeatState::Locked { owner, .. } if owner != claimant => {
                return Err(ReservationError::NotLockOwner {
                    seat_id,
                    holder: owner.clone(),
                });
            }
            SeatState::Locked { .. } => {}
        }

        if self.expire_if_lapsed(seat_id, &mut record, now) {
            return Err(ReservationError::LockExpired(seat_id));
        }

        let owner = record.book().ok_or(ReservationError::NotLocked(seat_id))?;
        info!("Seat {} booked by {}", seat_id, owner);
        self.events
            .publish(SeatEvent::new(seat_id.value(), SeatEventKind::Booked, owner.as_str(), now));

        Ok(Booking {
            seat_id,
            owner,
            booked_at: now,
        })
    }

    /// Transition: Locked → Available, by the lock owner
    pub async fn release(&self, seat_id: SeatId, claimant: &str) -> CoreResult<SeatSnapshot> {
        let mut record = self.registry.get(seat_id)?.lock().await;
        let now = self.clock.now();

        match record.state() {
            SeatState::Locked { owner, .. } if owner != claimant => {
                return Err(ReservationError::NotLockOwner {
                    seat_id,
                    holder: owner.clone(),
                });
            }
            SeatState::Locked { .. } => {}
            SeatState::Available | SeatState::Booked { .. } => {
                return Err(ReservationError::NotLocked(seat_id));
            }
        }

        record.release();
        info!("Seat {} released by {}", seat_id, claimant);
        self.events
            .publish(SeatEvent::new(seat_id.value(), SeatEventKind::Released, claimant, now));

        Ok(SeatSnapshot::of(seat_id, record.state()))
    }

    /// Transition: Locked (lapsed) → Available. Invoked by timers and the sweep.
    ///
    /// Returns whether the seat was reclaimed. Unknown seats, live leases and
    /// non-Locked seats are silent no-ops.
    pub async fn expire(&self, seat_id: SeatId) -> bool {
        let Ok(seat) = self.registry.get(seat_id) else {
            return false;
        };
        let mut record = seat.lock().await;
        let now = self.clock.now();
        self.expire_if_lapsed(seat_id, &mut record, now)
    }

    /// All seats in id order
    pub async fn list(&self) -> Vec<SeatSnapshot> {
        self.registry.snapshot().await
    }

    pub async fn seat(&self, seat_id: SeatId) -> CoreResult<SeatSnapshot> {
        self.registry.snapshot_one(seat_id).await
    }

    /// The single expiry transition, run with the seat lock held.
    fn expire_if_lapsed(&self, seat_id: SeatId, record: &mut SeatRecord, now: DateTime<Utc>) -> bool {
        if !record.state().lease_lapsed(now) {
            return false;
        }

        let previous = record.expire();
        let holder = previous.owner().unwrap_or_default();
        debug!("Seat {} lock of {} expired", seat_id, holder);
        self.events
            .publish(SeatEvent::new(seat_id.value(), SeatEventKind::Expired, holder, now));
        true
    }

    fn schedule_expiry(&self, seat_id: SeatId, lease: Duration) -> Option<JoinHandle<()>> {
        if !self.settings.per_claim_timers {
            return None;
        }
        Some(expiry::spawn_timer(self.clone(), seat_id, lease + self.settings.expiry_grace))
    }
}

fn lease_span(lease: Duration) -> CoreResult<chrono::Duration> {
    if lease.is_zero() {
        return Err(ReservationError::InvalidLease);
    }
    chrono::Duration::from_std(lease).map_err(|_| ReservationError::InvalidLease)
}
