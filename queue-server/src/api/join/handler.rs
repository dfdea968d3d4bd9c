//! Join API Handlers

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use shared::request::JoinRequest;
use shared::response::JoinResponse;

use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_IDEMPOTENCY_KEY_LEN, validate_optional_text};

/// Header form of the join dedup token
pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

/// Join today's queue
///
/// 201 for a new ticket, 200 when an earlier waiting ticket with the same
/// idempotency key is echoed back. The body key wins over the header.
pub async fn join(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(mut payload): Json<JoinRequest>,
) -> AppResult<(StatusCode, Json<JoinResponse>)> {
    if payload.idempotency_key.is_none() {
        payload.idempotency_key = headers
            .get(IDEMPOTENCY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }
    validate_optional_text(
        &payload.idempotency_key,
        "idempotencyKey",
        MAX_IDEMPOTENCY_KEY_LEN,
    )?;

    let outcome = state.manager.join(payload)?;
    let status = if outcome.existing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(JoinResponse::from_ticket(outcome.ticket, outcome.existing)),
    ))
}
