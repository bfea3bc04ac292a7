use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Router,
};
use futures_util::{Stream, StreamExt};
use seatlock_core::SeatSnapshot;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;

use crate::error::AppError;
use crate::service::{ConfirmResponse, LockResponse, ReleaseResponse, SeatActionRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/seats", get(list_seats))
        .route("/v1/seats/stream", get(seat_stream))
        .route("/v1/seats/{seat_id}", get(get_seat))
        .route("/v1/seats/{seat_id}/lock", post(lock_seat))
        .route("/v1/seats/{seat_id}/confirm", post(confirm_seat))
        .route("/v1/seats/{seat_id}/release", post(release_seat))
}

async fn list_seats(State(state): State<AppState>) -> Json<Vec<SeatSnapshot>> {
    Json(state.service.list().await)
}

async fn get_seat(
    State(state): State<AppState>,
    Path(seat_id): Path<String>,
) -> Result<Json<SeatSnapshot>, AppError> {
    Ok(Json(state.service.get(&seat_id).await?))
}

async fn lock_seat(
    State(state): State<AppState>,
    Path(seat_id): Path<String>,
    body: Result<Json<SeatActionRequest>, JsonRejection>,
) -> Result<Json<LockResponse>, AppError> {
    let Json(req) = body?;
    Ok(Json(state.service.lock(&seat_id, &req.user_id).await?))
}

async fn confirm_seat(
    State(state): State<AppState>,
    Path(seat_id): Path<String>,
    body: Result<Json<SeatActionRequest>, JsonRejection>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let Json(req) = body?;
    Ok(Json(state.service.confirm(&seat_id, &req.user_id).await?))
}

async fn release_seat(
    State(state): State<AppState>,
    Path(seat_id): Path<String>,
    body: Result<Json<SeatActionRequest>, JsonRejection>,
) -> Result<Json<ReleaseResponse>, AppError> {
    let Json(req) = body?;
    Ok(Json(state.service.release(&seat_id, &req.user_id).await?))
}

/// Live feed of seat transitions. Slow clients that lag behind the buffer skip
/// the missed events instead of being disconnected.
async fn seat_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.service.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => Event::default()
                .event(event.kind.as_str())
                .json_data(&event)
                .ok()
                .map(Ok),
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
