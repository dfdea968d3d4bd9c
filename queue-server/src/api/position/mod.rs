//! Position API 模块

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use shared::request::TicketQuery;
use shared::response::PositionResponse;

use crate::core::ServerState;
use crate::utils::validation::{MAX_ID_LEN, validate_required_text};
use crate::utils::{AppResult, time};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/position", get(position))
}

/// Live rank of a ticket among the day's waiting tickets
async fn position(
    State(state): State<ServerState>,
    Query(query): Query<TicketQuery>,
) -> AppResult<Json<PositionResponse>> {
    validate_required_text(&query.id, "id", MAX_ID_LEN)?;
    let date_key = time::date_key(time::parse_date(&query.date)?);

    let found = state.manager.position(&date_key, &query.id)?;
    let ticket = found.ticket;
    Ok(Json(PositionResponse {
        id: ticket.id,
        status: ticket.status,
        position: found.position,
        base_position: ticket.base_position,
        name: ticket.name,
        items: ticket.items,
        paid: ticket.paid,
        total: ticket.total,
    }))
}
