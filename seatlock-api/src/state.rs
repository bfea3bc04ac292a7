use seatlock_reservation::ReservationManager;

use crate::service::SeatService;

#[derive(Clone)]
pub struct AppState {
    pub service: SeatService,
}

impl AppState {
    pub fn new(manager: ReservationManager) -> Self {
        Self {
            service: SeatService::new(manager),
        }
    }
}
