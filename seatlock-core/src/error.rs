use chrono::{DateTime, Utc};

use crate::seat::SeatId;

/// Failures of the seat reservation operations.
///
/// All of them are local to one call and leave the process healthy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationError {
    #[error("Seat not found: {0}")]
    NotFound(SeatId),

    #[error("Seat {0} is already booked")]
    AlreadyBooked(SeatId),

    #[error("Seat {seat_id} is locked by {holder} until {expires_at}")]
    LockConflict {
        seat_id: SeatId,
        holder: String,
        expires_at: DateTime<Utc>,
    },

    #[error("Seat {0} has no active lock")]
    NotLocked(SeatId),

    #[error("Seat {seat_id} is locked by {holder}")]
    NotLockOwner { seat_id: SeatId, holder: String },

    #[error("Lock on seat {0} has expired")]
    LockExpired(SeatId),

    #[error("Lease duration must be positive")]
    InvalidLease,
}

impl ReservationError {
    /// Machine-readable kind, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            ReservationError::NotFound(_) => "NOT_FOUND",
            ReservationError::AlreadyBooked(_) => "ALREADY_BOOKED",
            ReservationError::LockConflict { .. } => "LOCK_CONFLICT",
            ReservationError::NotLocked(_) => "NOT_LOCKED",
            ReservationError::NotLockOwner { .. } => "NOT_LOCK_OWNER",
            ReservationError::LockExpired(_) => "LOCK_EXPIRED",
            ReservationError::InvalidLease => "INVALID_LEASE",
        }
    }

    /// Current holder of the seat, when the failure was caused by someone else's lock
    pub fn holder(&self) -> Option<&str> {
        match self {
            ReservationError::LockConflict { holder, .. }
            | ReservationError::NotLockOwner { holder, .. } => Some(holder.as_str()),
            _ => None,
        }
    }

    /// Whether a later claim by the same caller can succeed as-is
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReservationError::LockConflict { .. } | ReservationError::LockExpired(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        let seat = SeatId::new(1);
        let conflict = ReservationError::LockConflict {
            seat_id: seat,
            holder: "A".to_string(),
            expires_at: Utc::now(),
        };
        assert!(conflict.is_retryable());
        assert_eq!(conflict.holder(), Some("A"));
        assert!(ReservationError::LockExpired(seat).is_retryable());

        assert!(!ReservationError::NotFound(seat).is_retryable());
        assert!(!ReservationError::AlreadyBooked(seat).is_retryable());
        assert!(!ReservationError::NotLocked(seat).is_retryable());
        assert!(!ReservationError::NotLockOwner { seat_id: seat, holder: "B".to_string() }.is_retryable());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = ReservationError::NotLockOwner { seat_id: SeatId::new(5), holder: "A".to_string() };
        assert_eq!(err.to_string(), "Seat 5 is locked by A");
        assert_eq!(err.code(), "NOT_LOCK_OWNER");
    }
}
