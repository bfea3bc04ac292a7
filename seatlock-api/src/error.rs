use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use seatlock_core::ReservationError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    Reservation(ReservationError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Reservation(err) => match err {
                ReservationError::NotFound(_) => StatusCode::NOT_FOUND,
                ReservationError::InvalidLease => StatusCode::BAD_REQUEST,
                ReservationError::AlreadyBooked(_)
                | ReservationError::LockConflict { .. }
                | ReservationError::NotLocked(_) => StatusCode::CONFLICT,
                ReservationError::NotLockOwner { .. } => StatusCode::FORBIDDEN,
                ReservationError::LockExpired(_) => StatusCode::GONE,
            },
        }
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        AppError::Reservation(err)
    }
}

/// Malformed request bodies are reported like any other invalid input
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::ValidationError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::ValidationError(msg) => json!({
                "error": msg,
                "code": "INVALID_INPUT",
            }),
            AppError::Reservation(err) => {
                let mut body = json!({
                    "error": err.to_string(),
                    "code": err.code(),
                    "retryable": err.is_retryable(),
                });
                if let Some(holder) = err.holder() {
                    body["holder"] = json!(holder);
                }
                if let ReservationError::LockConflict { expires_at, .. } = &err {
                    body["expires_at"] = json!(expires_at);
                }
                body
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatlock_core::SeatId;

    #[test]
    fn test_status_mapping() {
        let seat = SeatId::new(1);
        assert_eq!(AppError::from(ReservationError::NotFound(seat)).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(ReservationError::AlreadyBooked(seat)).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::from(ReservationError::NotLocked(seat)).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(ReservationError::NotLockOwner { seat_id: seat, holder: "A".into() }).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::from(ReservationError::LockExpired(seat)).status(), StatusCode::GONE);
        assert_eq!(AppError::ValidationError("bad".into()).status(), StatusCode::BAD_REQUEST);
    }
}
