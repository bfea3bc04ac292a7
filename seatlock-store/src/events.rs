use seatlock_shared::SeatEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Fan-out of seat transitions to in-process subscribers (SSE streams, tests).
#[derive(Clone, Debug)]
pub struct EventProducer {
    tx: broadcast::Sender<SeatEvent>,
}

impl EventProducer {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SeatEvent> {
        self.tx.subscribe()
    }

    /// Publishing never fails the caller; with no subscribers the event is dropped.
    pub fn publish(&self, event: SeatEvent) {
        let kind = event.kind;
        let seat_id = event.seat_id;
        match self.tx.send(event) {
            Ok(receivers) => debug!("Published {:?} for seat {} to {} subscribers", kind, seat_id, receivers),
            Err(_) => debug!("No subscribers for {:?} on seat {}", kind, seat_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use seatlock_shared::SeatEventKind;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let producer = EventProducer::new(8);
        let mut rx = producer.subscribe();

        producer.publish(SeatEvent::new(7, SeatEventKind::Booked, "A", Utc::now()));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.seat_id, 7);
        assert_eq!(event.kind, SeatEventKind::Booked);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let producer = EventProducer::new(8);
        producer.publish(SeatEvent::new(1, SeatEventKind::Released, "A", Utc::now()));
    }
}
