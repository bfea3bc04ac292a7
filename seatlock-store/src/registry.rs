use chrono::{DateTime, Utc};
use seatlock_core::{CoreResult, ReservationError, SeatId, SeatSnapshot, SeatState};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

/// One seat plus its outstanding expiry timer.
///
/// State changes only go through the transition methods below, each of which
/// drops the previous timer, so a seat never has more than one pending expiry.
#[derive(Debug, Default)]
pub struct SeatRecord {
    state: SeatState,
    pending_expiry: Option<JoinHandle<()>>,
    /// Holder of the most recent lock that ran out, until the seat is locked again
    lapsed_owner: Option<String>,
}

impl SeatRecord {
    pub fn state(&self) -> &SeatState {
        &self.state
    }

    pub fn has_pending_expiry(&self) -> bool {
        self.pending_expiry.is_some()
    }

    pub fn lapsed_owner(&self) -> Option<&str> {
        self.lapsed_owner.as_deref()
    }

    /// Available/Locked -> Locked. Replaces any earlier timer with `timer`.
    pub fn lock(&mut self, owner: String, expires_at: DateTime<Utc>, timer: Option<JoinHandle<()>>) {
        self.cancel_expiry();
        self.lapsed_owner = None;
        self.state = SeatState::Locked { owner, expires_at };
        self.pending_expiry = timer;
    }

    /// Locked -> Booked, keeping the lock owner as the booking owner.
    ///
    /// Returns the owner, or `None` (and changes nothing) when the seat is not Locked.
    pub fn book(&mut self) -> Option<String> {
        let SeatState::Locked { owner, .. } = &self.state else {
            return None;
        };
        let owner = owner.clone();
        self.cancel_expiry();
        self.state = SeatState::Booked { owner: owner.clone() };
        Some(owner)
    }

    /// Locked -> Available. Returns the state the seat left.
    pub fn release(&mut self) -> SeatState {
        self.cancel_expiry();
        self.lapsed_owner = None;
        std::mem::take(&mut self.state)
    }

    /// Locked -> Available because the lease ran out. The previous holder is
    /// remembered so a late confirm can be told its lock expired.
    pub fn expire(&mut self) -> SeatState {
        self.cancel_expiry();
        let previous = std::mem::take(&mut self.state);
        self.lapsed_owner = previous.owner().map(str::to_string);
        previous
    }

    fn cancel_expiry(&mut self) {
        if let Some(handle) = self.pending_expiry.take() {
            handle.abort();
        }
    }
}

impl Drop for SeatRecord {
    fn drop(&mut self) {
        self.cancel_expiry();
    }
}

/// Fixed pool of seats, built once at startup.
///
/// Each seat sits behind its own mutex: calls for one seat are serialized,
/// calls for different seats never contend.
#[derive(Debug)]
pub struct SeatRegistry {
    seats: BTreeMap<SeatId, Mutex<SeatRecord>>,
}

impl SeatRegistry {
    /// Create `seat_count` Available seats with ids `1..=seat_count`.
    pub fn new(seat_count: u32) -> Self {
        let seats = (1..=seat_count)
            .map(|id| (SeatId::new(id), Mutex::new(SeatRecord::default())))
            .collect();
        info!("Seat registry initialized with {} seats", seat_count);
        Self { seats }
    }

    pub fn get(&self, id: SeatId) -> CoreResult<&Mutex<SeatRecord>> {
        self.seats.get(&id).ok_or(ReservationError::NotFound(id))
    }

    /// Seat ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.seats.keys().copied()
    }

    /// Size of the pool, fixed at construction
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub async fn snapshot_one(&self, id: SeatId) -> CoreResult<SeatSnapshot> {
        let record = self.get(id)?.lock().await;
        Ok(SeatSnapshot::of(id, record.state()))
    }

    /// Every seat in ascending id order. Seats are locked one at a time, so the
    /// result is per-seat consistent, not a global point-in-time view.
    pub async fn snapshot(&self) -> Vec<SeatSnapshot> {
        let mut out = Vec::with_capacity(self.seats.len());
        for (id, seat) in &self.seats {
            let record = seat.lock().await;
            out.push(SeatSnapshot::of(*id, record.state()));
        }
        out
    }
}
