//! # Users
//!
//! ## Endpoints
//!
//! - `POST /v1/users` — register a user
//! - `GET /v1/users` — list users
//! - `GET /v1/users/{id}` — get a user

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use raffle_core::UserId;
use raffle_engine::CreateUser;
use raffle_store::{User, UserRole};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to register a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    /// Defaults to `client`.
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Client
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() {
            return Err("email must not be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/users", get(list_users).post(create_user))
        .route("/v1/users/{id}", get(get_user))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/users — Register a user.
async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let req = extract_validated_json(body)?;
    let user = state.service.create_user(CreateUser {
        email: req.email,
        name: req.name,
        role: req.role,
    })?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /v1/users — List users in registration order.
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.service.list_users()?))
}

/// GET /v1/users/{id} — Get a user.
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.service.get_user(UserId::from_uuid(id))?))
}
