//! Queue API Handlers

use axum::{
    Json,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use shared::request::DateQuery;
use shared::response::{ClearQueueResponse, QueueResponse};

use crate::auth::StaffUser;
use crate::core::ServerState;
use crate::utils::{AppResult, time};

/// Tickets of a day ordered by `basePosition`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<QueueResponse>> {
    let date_key = time::resolve_date_key(query.date.as_deref(), state.manager.tz())?;
    let tickets = state.manager.list(&date_key)?;
    Ok(Json(QueueResponse { date_key, tickets }))
}

/// Remove every waiting ticket of today
pub async fn clear_today(
    State(state): State<ServerState>,
    user: StaffUser,
) -> AppResult<Json<ClearQueueResponse>> {
    let outcome = state.manager.clear_today()?;
    tracing::info!(
        staff_id = %user.id,
        date_key = %outcome.date_key,
        removed = outcome.removed,
        "Queue cleared"
    );
    Ok(Json(ClearQueueResponse {
        date_key: outcome.date_key,
        removed: outcome.removed,
        restored: outcome.restored,
    }))
}

/// Server-sent snapshots `{dateKey, tickets, settings}` of one day
///
/// The first event is the current snapshot. The stream holds a broadcaster
/// subscription; dropping it when the client goes away releases the sink.
pub async fn stream(
    State(state): State<ServerState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let date_key = time::resolve_date_key(query.date.as_deref(), state.manager.tz())?;
    let subscription = state.broadcaster.subscribe(&date_key)?;
    tracing::debug!(%date_key, "Queue stream opened");

    let events = futures::stream::unfold(subscription, |mut subscription| async move {
        let snapshot = subscription.recv().await?;
        Some((Event::default().json_data(&snapshot), subscription))
    })
    .take_until(state.shutdown.clone().cancelled_owned());

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
