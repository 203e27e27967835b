//! # Raffles
//!
//! Creation, queries, edits and lifecycle transitions.
//!
//! ## Endpoints
//!
//! - `POST /v1/raffles` — create a raffle in `draft`
//! - `GET /v1/raffles` — list raffles (`?creator_id=` filters by owner)
//! - `GET /v1/raffles/{id}` — get a raffle
//! - `PATCH /v1/raffles/{id}` — partial update
//! - `GET /v1/raffles/by-link/{link}` — get a raffle by share link
//! - `POST /v1/raffles/{id}/activate` — `draft → active`
//! - `POST /v1/raffles/{id}/cancel` — `draft | active → cancelled`
//! - `POST /v1/raffles/{id}/winner` — select the winner

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use raffle_core::{RaffleId, Timestamp, UserId};
use raffle_engine::{CreateRaffle, RaffleUpdate};
use raffle_state::SelectionMethod;
use raffle_store::{Raffle, RaffleConfiguration, RaffleMetadata};

use crate::error::AppError;
use crate::extractors::{extract_json, extract_optional_json, extract_validated_json, Validate};
use crate::state::AppState;

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to create a raffle.
#[derive(Debug, Deserialize)]
pub struct CreateRaffleRequest {
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_paid: bool,
    /// Entry price in minor currency units.
    pub price_cents: Option<u64>,
    /// RFC 3339 date-time of the draw.
    pub raffle_date: String,
    /// `HH:MM`.
    pub raffle_time: Option<String>,
    #[serde(default = "default_method")]
    pub selection_method: SelectionMethod,
    pub number_quantity: Option<u64>,
    pub number_digits: Option<u8>,
    #[serde(default)]
    pub use_lottery_integration: bool,
}

fn default_method() -> SelectionMethod {
    SelectionMethod::Random
}

impl Validate for CreateRaffleRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.raffle_date.trim().is_empty() {
            return Err("raffle_date must not be empty".to_string());
        }
        Ok(())
    }
}

impl CreateRaffleRequest {
    fn into_command(self) -> Result<CreateRaffle, AppError> {
        let raffle_date = Timestamp::parse_lenient(&self.raffle_date)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(CreateRaffle {
            creator_id: UserId::from_uuid(self.creator_id),
            metadata: RaffleMetadata {
                title: self.title,
                description: self.description,
                images: self.images,
                is_paid: self.is_paid,
                price_cents: self.price_cents,
                raffle_date,
                raffle_time: self.raffle_time,
            },
            configuration: RaffleConfiguration {
                selection_method: self.selection_method,
                number_quantity: self.number_quantity,
                number_digits: self.number_digits,
                use_lottery_integration: self.use_lottery_integration,
            },
        })
    }
}

/// Query parameters for listing raffles.
#[derive(Debug, Deserialize)]
pub struct ListRafflesQuery {
    pub creator_id: Option<Uuid>,
}

/// Optional body of `POST /v1/raffles/{id}/cancel`.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Optional body of `POST /v1/raffles/{id}/winner`.
#[derive(Debug, Deserialize)]
pub struct SelectWinnerRequest {
    pub winning_number: Option<String>,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the raffles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/raffles", get(list_raffles).post(create_raffle))
        .route("/v1/raffles/by-link/{link}", get(get_raffle_by_link))
        .route("/v1/raffles/{id}", get(get_raffle).patch(update_raffle))
        .route("/v1/raffles/{id}/activate", post(activate_raffle))
        .route("/v1/raffles/{id}/cancel", post(cancel_raffle))
        .route("/v1/raffles/{id}/winner", post(select_winner))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/raffles — Create a raffle.
async fn create_raffle(
    State(state): State<AppState>,
    body: Result<Json<CreateRaffleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Raffle>), AppError> {
    let command = extract_validated_json(body)?.into_command()?;
    let raffle = state.service.create_raffle(command)?;
    Ok((StatusCode::CREATED, Json(raffle)))
}

/// GET /v1/raffles — List raffles in creation order.
async fn list_raffles(
    State(state): State<AppState>,
    Query(query): Query<ListRafflesQuery>,
) -> Result<Json<Vec<Raffle>>, AppError> {
    let raffles = match query.creator_id {
        Some(creator) => state
            .service
            .list_raffles_by_creator(UserId::from_uuid(creator))?,
        None => state.service.list_raffles()?,
    };
    Ok(Json(raffles))
}

/// GET /v1/raffles/{id} — Get a raffle.
async fn get_raffle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Raffle>, AppError> {
    Ok(Json(state.service.get_raffle(RaffleId::from_uuid(id))?))
}

/// GET /v1/raffles/by-link/{link} — Get a raffle by its share link.
async fn get_raffle_by_link(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Json<Raffle>, AppError> {
    Ok(Json(state.service.get_raffle_by_link(&link)?))
}

/// PATCH /v1/raffles/{id} — Apply a partial update.
async fn update_raffle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<RaffleUpdate>, JsonRejection>,
) -> Result<Json<Raffle>, AppError> {
    let update = extract_json(body)?;
    Ok(Json(
        state
            .service
            .update_raffle(RaffleId::from_uuid(id), update)?,
    ))
}

/// POST /v1/raffles/{id}/activate — Open a draft raffle for entries.
async fn activate_raffle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Raffle>, AppError> {
    Ok(Json(state.service.activate_raffle(RaffleId::from_uuid(id))?))
}

/// POST /v1/raffles/{id}/cancel — Close a raffle without a winner.
async fn cancel_raffle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Raffle>, AppError> {
    let reason = extract_optional_json::<CancelRequest>(&body)?.and_then(|r| r.reason);
    Ok(Json(
        state
            .service
            .cancel_raffle(RaffleId::from_uuid(id), reason)?,
    ))
}

/// POST /v1/raffles/{id}/winner — Select the winner.
///
/// With `{"winning_number": "..."}` the holder of that number wins
/// (`selection_number` raffles only); otherwise the configured method draws.
async fn select_winner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Raffle>, AppError> {
    let raffle_id = RaffleId::from_uuid(id);
    let winning_number =
        extract_optional_json::<SelectWinnerRequest>(&body)?.and_then(|r| r.winning_number);
    let raffle = match winning_number {
        Some(number) => state
            .service
            .select_winner_with_number(raffle_id, &number)?,
        None => state.service.select_winner(raffle_id)?,
    };
    Ok(Json(raffle))
}
