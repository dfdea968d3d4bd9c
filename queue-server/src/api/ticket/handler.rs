//! Ticket API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use shared::request::{EditTicketRequest, TicketQuery};
use shared::response::{DeleteTicketResponse, EditTicketResponse};

use crate::core::ServerState;
use crate::utils::validation::{MAX_ID_LEN, validate_required_text};
use crate::utils::{AppResult, time};

/// Replace the quantities of a waiting ticket
pub async fn edit(
    State(state): State<ServerState>,
    Json(payload): Json<EditTicketRequest>,
) -> AppResult<Json<EditTicketResponse>> {
    validate_required_text(&payload.id, "id", MAX_ID_LEN)?;
    let date_key = time::date_key(time::parse_date(&payload.date_key)?);

    let ticket = state.manager.edit(&date_key, &payload.id, &payload.items)?;
    Ok(Json(EditTicketResponse {
        id: ticket.id,
        date_key: ticket.date_key,
        items: ticket.items,
    }))
}

/// Remove a ticket and give its stock back
pub async fn delete(
    State(state): State<ServerState>,
    Query(query): Query<TicketQuery>,
) -> AppResult<Json<DeleteTicketResponse>> {
    validate_required_text(&query.id, "id", MAX_ID_LEN)?;
    let date_key = time::date_key(time::parse_date(&query.date)?);

    let ticket = state.manager.delete(&date_key, &query.id)?;
    Ok(Json(DeleteTicketResponse {
        id: ticket.id,
        date_key: ticket.date_key,
        deleted: true,
    }))
}
