use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What happened to a seat
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatEventKind {
    Locked,
    Refreshed,
    Booked,
    Released,
    Expired,
}

impl SeatEventKind {
    /// SSE event name
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatEventKind::Locked => "seat_locked",
            SeatEventKind::Refreshed => "seat_refreshed",
            SeatEventKind::Booked => "seat_booked",
            SeatEventKind::Released => "seat_released",
            SeatEventKind::Expired => "seat_expired",
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SeatEvent {
    pub event_id: Uuid,
    pub seat_id: u32,
    pub kind: SeatEventKind,
    /// Claimant that caused the transition, or the previous holder for expiries
    pub claimant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl SeatEvent {
    pub fn new(seat_id: u32, kind: SeatEventKind, claimant: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            seat_id,
            kind,
            claimant: claimant.into(),
            expires_at: None,
            timestamp: at,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let at = Utc::now();
        let event = SeatEvent::new(5, SeatEventKind::Locked, "A", at).with_expiry(at);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["seat_id"], 5);
        assert_eq!(json["kind"], "LOCKED");
        assert_eq!(json["claimant"], "A");
        assert!(json.get("expires_at").is_some());

        let released = serde_json::to_value(SeatEvent::new(5, SeatEventKind::Released, "A", at)).unwrap();
        assert!(released.get("expires_at").is_none());
    }
}
