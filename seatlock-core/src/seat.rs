use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a seat in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(u32);

impl SeatId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid seat id: {0:?}")]
pub struct ParseSeatIdError(String);

impl FromStr for SeatId {
    type Err = ParseSeatIdError;

    /// Seat ids are positive integers; `0`, signs and whitespace are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseSeatIdError(s.to_string()));
        }
        match s.parse::<u32>() {
            Ok(0) | Err(_) => Err(ParseSeatIdError(s.to_string())),
            Ok(v) => Ok(Self(v)),
        }
    }
}

/// Seat status as reported to callers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Locked,
    Booked,
}

/// Lifecycle state of a single seat.
///
/// Transitions:
/// - Available -> Locked (claim)
/// - Locked -> Locked (refresh by the same owner)
/// - Locked -> Available (release, expiry)
/// - Locked -> Booked (confirm, terminal)
///
/// Owner and deadline live inside the variants, so an Available seat can never
/// carry a stale owner and a Booked seat never carries a deadline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeatState {
    #[default]
    Available,
    Locked {
        owner: String,
        expires_at: DateTime<Utc>,
    },
    Booked {
        owner: String,
    },
}

impl SeatState {
    pub fn status(&self) -> SeatStatus {
        match self {
            SeatState::Available => SeatStatus::Available,
            SeatState::Locked { .. } => SeatStatus::Locked,
            SeatState::Booked { .. } => SeatStatus::Booked,
        }
    }

    /// Lock holder for Locked seats, confirmed owner for Booked seats
    pub fn owner(&self) -> Option<&str> {
        match self {
            SeatState::Available => None,
            SeatState::Locked { owner, .. } | SeatState::Booked { owner } => Some(owner.as_str()),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SeatState::Locked { expires_at, .. } => Some(*expires_at),
            _ => None,
        }
    }

    /// True when the seat is Locked and its lease deadline has been reached.
    ///
    /// This is the only expiry predicate; lazy checks, timers and the sweep all go through it.
    pub fn lease_lapsed(&self, now: DateTime<Utc>) -> bool {
        matches!(self, SeatState::Locked { expires_at, .. } if now >= *expires_at)
    }
}

/// Point-in-time view of a seat, as returned by enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatSnapshot {
    pub id: SeatId,
    pub status: SeatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SeatSnapshot {
    pub fn of(id: SeatId, state: &SeatState) -> Self {
        Self {
            id,
            status: state.status(),
            owner: state.owner().map(str::to_string),
            expires_at: state.expires_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_seat_id_parsing() {
        assert_eq!("5".parse::<SeatId>().unwrap(), SeatId::new(5));
        assert_eq!("0042".parse::<SeatId>().unwrap(), SeatId::new(42));
        assert!("0".parse::<SeatId>().is_err());
        assert!("-1".parse::<SeatId>().is_err());
        assert!("+3".parse::<SeatId>().is_err());
        assert!(" 3".parse::<SeatId>().is_err());
        assert!("abc".parse::<SeatId>().is_err());
        assert!("".parse::<SeatId>().is_err());
        assert!("99999999999".parse::<SeatId>().is_err());
    }

    #[test]
    fn test_owner_and_expiry_presence_follow_status() {
        let now = Utc::now();

        let available = SeatState::Available;
        assert_eq!(available.status(), SeatStatus::Available);
        assert!(available.owner().is_none());
        assert!(available.expires_at().is_none());

        let locked = SeatState::Locked { owner: "A".to_string(), expires_at: now };
        assert_eq!(locked.status(), SeatStatus::Locked);
        assert_eq!(locked.owner(), Some("A"));
        assert_eq!(locked.expires_at(), Some(now));

        let booked = SeatState::Booked { owner: "A".to_string() };
        assert_eq!(booked.status(), SeatStatus::Booked);
        assert_eq!(booked.owner(), Some("A"));
        assert!(booked.expires_at().is_none());
    }

    #[test]
    fn test_lease_lapsed_at_deadline() {
        let now = Utc::now();
        let state = SeatState::Locked { owner: "A".to_string(), expires_at: now };

        assert!(!state.lease_lapsed(now - Duration::milliseconds(1)));
        assert!(state.lease_lapsed(now));
        assert!(state.lease_lapsed(now + Duration::seconds(1)));

        // Only Locked seats can lapse
        assert!(!SeatState::Available.lease_lapsed(now));
        assert!(!SeatState::Booked { owner: "A".to_string() }.lease_lapsed(now));
    }

    #[test]
    fn test_snapshot_serialization_omits_absent_fields() {
        let json = serde_json::to_value(SeatSnapshot::of(SeatId::new(3), &SeatState::Available)).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 3, "status": "AVAILABLE" }));
    }
}
