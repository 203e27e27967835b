//! # Participations
//!
//! ## Endpoints
//!
//! - `POST /v1/raffles/{id}/participations` — enter a raffle
//! - `GET /v1/raffles/{id}/participations` — list entries in insertion order

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use raffle_core::{RaffleId, UserId};
use raffle_store::Participation;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Request to enter a raffle.
#[derive(Debug, Deserialize)]
pub struct ParticipateRequest {
    pub user_id: Uuid,
    /// Required for `selection_number` raffles, ignored otherwise.
    pub selected_number: Option<String>,
}

/// Build the participations router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/raffles/{id}/participations",
        get(list_participations).post(participate),
    )
}

/// POST /v1/raffles/{id}/participations — Enter a raffle.
async fn participate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<ParticipateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Participation>), AppError> {
    let req = extract_json(body)?;
    let participation = state.service.participate(
        RaffleId::from_uuid(id),
        UserId::from_uuid(req.user_id),
        req.selected_number.as_deref(),
    )?;
    Ok((StatusCode::CREATED, Json(participation)))
}

/// GET /v1/raffles/{id}/participations — List entries.
async fn list_participations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Participation>>, AppError> {
    Ok(Json(
        state.service.list_participants(RaffleId::from_uuid(id))?,
    ))
}
