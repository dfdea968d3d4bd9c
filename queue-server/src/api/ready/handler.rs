//! Ready API Handlers

use axum::{Json, extract::State};
use shared::request::ReadyRequest;
use shared::response::ReadyResponse;

use crate::auth::StaffUser;
use crate::core::ServerState;
use crate::utils::validation::{MAX_ID_LEN, validate_required_text};
use crate::utils::{AppResult, time};

/// Mark a ticket ready and freeze its total
pub async fn mark_ready(
    State(state): State<ServerState>,
    user: StaffUser,
    Json(payload): Json<ReadyRequest>,
) -> AppResult<Json<ReadyResponse>> {
    validate_required_text(&payload.id, "id", MAX_ID_LEN)?;
    let date_key = time::date_key(time::parse_date(&payload.date_key)?);

    let ticket = state
        .manager
        .mark_ready(&date_key, &payload.id, &payload.status)?;
    tracing::info!(staff_id = %user.id, ticket_id = %ticket.id, "Ticket marked ready");

    Ok(Json(ReadyResponse {
        id: ticket.id,
        date_key: ticket.date_key,
        status: ticket.status,
        total: ticket.total,
    }))
}
