//! # Raffle Lifecycle
//!
//! Creation, editing and the non-selection status transitions
//! (`draft → active`, `draft | active → cancelled`).
//!
//! Every write is conditional. Transitions are guarded by the status they
//! were validated against; edits are guarded by the row version that was
//! read. When the guard fails the row is re-read: if the request is now
//! illegal the caller gets the business error, otherwise
//! `ConcurrencyConflict`.

use std::sync::Arc;

use chrono::NaiveTime;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Deserializer};

use raffle_core::{RaffleId, Timestamp, UserId};
use raffle_state::{validate_transition, RaffleStatus, SelectionMethod};
use raffle_store::{
    NewRaffle, Raffle, RaffleCondition, RaffleConfiguration, RaffleMetadata, RafflePatch,
    RaffleRepository, StoreError, UserRepository, RAFFLES_UNIQUE_LINK,
};

use crate::error::RaffleError;

/// Length of generated share links.
pub const LINK_LENGTH: usize = 10;

const LINK_ATTEMPTS: usize = 5;

/// Input to [`RaffleLifecycle::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRaffle {
    pub creator_id: UserId,
    pub metadata: RaffleMetadata,
    pub configuration: RaffleConfiguration,
}

/// Partial update of a raffle.
///
/// Absent fields are left unchanged. Clearable fields are doubly optional:
/// `Some(None)` (an explicit JSON `null`) clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RaffleUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub images: Option<Option<Vec<String>>>,
    pub is_paid: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub price_cents: Option<Option<u64>>,
    pub raffle_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "nullable")]
    pub raffle_time: Option<Option<String>>,
    pub selection_method: Option<SelectionMethod>,
    #[serde(default, deserialize_with = "nullable")]
    pub number_quantity: Option<Option<u64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub number_digits: Option<Option<u8>>,
    #[serde(default, deserialize_with = "nullable")]
    pub use_lottery_integration: Option<Option<bool>>,
    pub status: Option<RaffleStatus>,
}

/// A present field, `null` included, deserializes to `Some`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl RaffleUpdate {
    fn touches_metadata(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.images.is_some()
            || self.is_paid.is_some()
            || self.price_cents.is_some()
            || self.raffle_date.is_some()
            || self.raffle_time.is_some()
    }

    fn touches_configuration(&self) -> bool {
        self.selection_method.is_some()
            || self.number_quantity.is_some()
            || self.number_digits.is_some()
            || self.use_lottery_integration.is_some()
    }

    fn merge_metadata(&self, current: &RaffleMetadata) -> RaffleMetadata {
        RaffleMetadata {
            title: self.title.clone().unwrap_or_else(|| current.title.clone()),
            description: merge(&self.description, &current.description),
            images: match &self.images {
                Some(images) => images.clone().unwrap_or_default(),
                None => current.images.clone(),
            },
            is_paid: self.is_paid.unwrap_or(current.is_paid),
            price_cents: merge(&self.price_cents, &current.price_cents),
            raffle_date: self.raffle_date.unwrap_or(current.raffle_date),
            raffle_time: merge(&self.raffle_time, &current.raffle_time),
        }
    }

    fn merge_configuration(&self, current: &RaffleConfiguration) -> RaffleConfiguration {
        RaffleConfiguration {
            selection_method: self.selection_method.unwrap_or(current.selection_method),
            number_quantity: merge(&self.number_quantity, &current.number_quantity),
            number_digits: merge(&self.number_digits, &current.number_digits),
            use_lottery_integration: match self.use_lottery_integration {
                Some(flag) => flag.unwrap_or(false),
                None => current.use_lottery_integration,
            },
        }
    }
}

fn merge<T: Clone>(update: &Option<Option<T>>, current: &Option<T>) -> Option<T> {
    match update {
        Some(value) => value.clone(),
        None => current.clone(),
    }
}

/// Validate descriptive raffle fields.
pub fn validate_metadata(metadata: &RaffleMetadata) -> Result<(), RaffleError> {
    if metadata.title.trim().is_empty() {
        return Err(RaffleError::InvalidRaffle {
            field: "title",
            reason: "title must not be empty".to_string(),
        });
    }
    if metadata.price_cents == Some(0) {
        return Err(RaffleError::InvalidRaffle {
            field: "price_cents",
            reason: "price must be positive".to_string(),
        });
    }
    if let Some(time) = &metadata.raffle_time {
        NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| RaffleError::InvalidRaffle {
            field: "raffle_time",
            reason: format!("{time:?} is not a HH:MM time"),
        })?;
    }
    Ok(())
}

/// Validate the selection configuration.
pub fn validate_configuration(configuration: &RaffleConfiguration) -> Result<(), RaffleError> {
    configuration
        .number_space()
        .map(|_| ())
        .map_err(|e| RaffleError::InvalidSelectionMethod {
            reason: e.to_string(),
        })
}

/// Creates, edits and transitions raffles.
#[derive(Clone)]
pub struct RaffleLifecycle {
    users: Arc<dyn UserRepository>,
    raffles: Arc<dyn RaffleRepository>,
}

impl std::fmt::Debug for RaffleLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaffleLifecycle").finish_non_exhaustive()
    }
}

impl RaffleLifecycle {
    /// Create a lifecycle controller over the given repositories.
    pub fn new(users: Arc<dyn UserRepository>, raffles: Arc<dyn RaffleRepository>) -> Self {
        Self { users, raffles }
    }

    /// Create a raffle in `draft` with a freshly generated share link.
    pub fn create(&self, request: CreateRaffle) -> Result<Raffle, RaffleError> {
        if !self.users.exists(request.creator_id)? {
            return Err(RaffleError::UserNotFound {
                user_id: request.creator_id,
            });
        }
        validate_metadata(&request.metadata)?;
        validate_configuration(&request.configuration)?;

        for _ in 0..LINK_ATTEMPTS {
            let new = NewRaffle {
                creator_id: request.creator_id,
                metadata: request.metadata.clone(),
                configuration: request.configuration,
                unique_link: generate_link(),
            };
            match self.raffles.insert_raffle(new) {
                Ok(raffle) => {
                    tracing::info!(
                        raffle_id = %raffle.id,
                        creator_id = %raffle.creator_id,
                        method = %raffle.configuration.selection_method,
                        link = %raffle.unique_link,
                        "raffle created"
                    );
                    return Ok(raffle);
                }
                Err(StoreError::UniqueViolation { constraint })
                    if constraint == RAFFLES_UNIQUE_LINK =>
                {
                    tracing::debug!("share link collision, regenerating");
                }
                Err(other) => return Err(RaffleError::Storage(other)),
            }
        }
        Err(RaffleError::Storage(StoreError::UniqueViolation {
            constraint: RAFFLES_UNIQUE_LINK,
        }))
    }

    /// Move `draft → active`.
    pub fn activate(&self, raffle_id: RaffleId) -> Result<Raffle, RaffleError> {
        self.transition(raffle_id, RaffleStatus::Active, None)
    }

    /// Move `draft | active → cancelled`.
    pub fn cancel(&self, raffle_id: RaffleId, reason: Option<String>) -> Result<Raffle, RaffleError> {
        self.transition(raffle_id, RaffleStatus::Cancelled, reason)
    }

    /// Request a status change. `completed` is only reachable through
    /// winner selection and is always refused here.
    pub fn transition(
        &self,
        raffle_id: RaffleId,
        to: RaffleStatus,
        reason: Option<String>,
    ) -> Result<Raffle, RaffleError> {
        let current = self.load(raffle_id)?;
        check_transition(&current, to)?;

        let condition = RaffleCondition::any().with_status(current.status);
        let patch = RafflePatch::at(Timestamp::now()).transition(current.status, to, reason);
        match self.raffles.conditional_update(raffle_id, &condition, patch) {
            Ok(Some(updated)) => {
                tracing::info!(raffle_id = %raffle_id, from = %current.status, to = %to, "raffle transitioned");
                Ok(updated)
            }
            Ok(None) => {
                tracing::warn!(raffle_id = %raffle_id, to = %to, "transition lost a concurrent race");
                let now = self.load(raffle_id)?;
                check_transition(&now, to)?;
                Err(RaffleError::ConcurrencyConflict)
            }
            Err(StoreError::NotFound { .. }) => Err(RaffleError::RaffleNotFound {
                raffle_id: Some(raffle_id),
            }),
            Err(other) => Err(RaffleError::Storage(other)),
        }
    }

    /// Apply a partial update.
    ///
    /// Metadata is editable while `draft` or `active`; configuration only
    /// while `draft`. A `status` in the update is applied in the same write.
    pub fn update(&self, raffle_id: RaffleId, update: RaffleUpdate) -> Result<Raffle, RaffleError> {
        let current = self.load(raffle_id)?;
        if current.status.is_terminal() {
            return Err(RaffleError::ConfigurationLocked {
                status: current.status,
            });
        }
        if update.touches_configuration() && current.status != RaffleStatus::Draft {
            return Err(RaffleError::ConfigurationLocked {
                status: current.status,
            });
        }

        let mut patch = RafflePatch::at(Timestamp::now());
        let mut configuration = current.configuration;
        if update.touches_metadata() {
            let metadata = update.merge_metadata(&current.metadata);
            validate_metadata(&metadata)?;
            patch = patch.metadata(metadata);
        }
        if update.touches_configuration() {
            configuration = update.merge_configuration(&current.configuration);
            validate_configuration(&configuration)?;
            patch = patch.configuration(configuration);
        }
        if let Some(to) = update.status.filter(|to| *to != current.status) {
            check_transition(
                &Raffle {
                    configuration,
                    ..current.clone()
                },
                to,
            )?;
            patch = patch.transition(current.status, to, Some("status updated".to_string()));
        }
        if patch.metadata.is_none() && patch.configuration.is_none() && patch.status.is_none() {
            return Ok(current);
        }

        let condition = RaffleCondition::any().at_version(current.version);
        match self.raffles.conditional_update(raffle_id, &condition, patch) {
            Ok(Some(updated)) => {
                tracing::info!(raffle_id = %raffle_id, version = updated.version, "raffle updated");
                Ok(updated)
            }
            Ok(None) => {
                tracing::warn!(raffle_id = %raffle_id, version = current.version, "update lost a concurrent race");
                let now = self.load(raffle_id)?;
                if now.status.is_terminal()
                    || (update.touches_configuration() && now.status != RaffleStatus::Draft)
                {
                    return Err(RaffleError::ConfigurationLocked { status: now.status });
                }
                Err(RaffleError::ConcurrencyConflict)
            }
            Err(StoreError::NotFound { .. }) => Err(RaffleError::RaffleNotFound {
                raffle_id: Some(raffle_id),
            }),
            Err(other) => Err(RaffleError::Storage(other)),
        }
    }

    fn load(&self, raffle_id: RaffleId) -> Result<Raffle, RaffleError> {
        self.raffles
            .get(raffle_id)?
            .ok_or(RaffleError::RaffleNotFound {
                raffle_id: Some(raffle_id),
            })
    }
}

/// Reject illegal edges, `completed` requests, and activations whose
/// configuration cannot be drawn from.
fn check_transition(raffle: &Raffle, to: RaffleStatus) -> Result<(), RaffleError> {
    let illegal = RaffleError::InvalidTransition {
        from: raffle.status,
        to,
    };
    if to == RaffleStatus::Completed {
        return Err(illegal);
    }
    validate_transition(raffle.status, to).map_err(|_| illegal)?;
    if to == RaffleStatus::Active {
        validate_configuration(&raffle.configuration)?;
    }
    Ok(())
}

fn generate_link() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LINK_LENGTH)
        .map(char::from)
        .collect()
}
