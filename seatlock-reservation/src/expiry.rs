use crate::manager::ReservationManager;
use seatlock_core::SeatId;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Per-claim timer: sleeps past the lease deadline, then asks the manager to expire the seat.
///
/// The handle is stored on the seat record and aborted by any later transition.
/// If it fires anyway, `expire` re-checks the seat and does nothing unless the
/// lease really lapsed.
pub(crate) fn spawn_timer(manager: ReservationManager, seat_id: SeatId, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        time::sleep(delay).await;
        if manager.expire(seat_id).await {
            debug!("Expiry timer reclaimed seat {}", seat_id);
        }
    })
}

/// Periodic sweep over every seat.
///
/// Safety net for lost or delayed timers: a lapsed lock stays visible for at
/// most one interval.
pub struct ExpiryReconciler {
    manager: ReservationManager,
    interval: Duration,
}

/// Shortest sweep period; `interval_at` panics on zero
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

impl ExpiryReconciler {
    pub fn new(manager: ReservationManager, interval: Duration) -> Self {
        Self {
            manager,
            interval: interval.max(MIN_SWEEP_INTERVAL),
        }
    }

    /// Run one pass, returning how many seats were reclaimed.
    ///
    /// Seats are visited in id order and locked one at a time.
    pub async fn sweep_once(&self) -> usize {
        let ids: Vec<SeatId> = self.manager.registry().ids().collect();
        let mut reclaimed = 0;
        for id in ids {
            if self.manager.expire(id).await {
                reclaimed += 1;
            }
        }
        reclaimed
    }

    /// Sweep every interval until `shutdown` flips to true or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Expiry sweep started, interval {:?}", self.interval);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    let reclaimed = self.sweep_once().await;
                    if reclaimed > 0 {
                        info!("Expiry sweep reclaimed {} seats", reclaimed);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Expiry sweep stopped");
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
