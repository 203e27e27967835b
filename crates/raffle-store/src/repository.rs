//! # Repository Contracts
//!
//! Object-safe, synchronous traits the raffle engine holds as
//! `Arc<dyn …>`. Method names are distinct across the three traits so a
//! single backend type can implement all of them without call ambiguity.

use thiserror::Error;

use raffle_core::{RaffleId, UserId};

use crate::model::{
    NewParticipation, NewRaffle, NewUser, Participation, Raffle, RaffleCondition, RafflePatch,
    User,
};

/// Unique constraint on `users.email`.
pub const USERS_EMAIL: &str = "users_email";
/// Unique constraint on `participations(raffle_id, user_id)`.
pub const PARTICIPATIONS_RAFFLE_USER: &str = "participations_raffle_user";
/// Unique constraint on `participations(raffle_id, selected_number)`.
pub const PARTICIPATIONS_RAFFLE_NUMBER: &str = "participations_raffle_number";
/// Unique constraint on `raffles.unique_link`.
pub const RAFFLES_UNIQUE_LINK: &str = "raffles_unique_link";

/// Errors reported by a repository backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An insert collided with a unique constraint.
    #[error("unique constraint {constraint} violated")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: &'static str,
    },

    /// A conditional write found its precondition false.
    #[error("{entity} precondition no longer holds")]
    ConditionFailed {
        /// The entity whose precondition failed.
        entity: &'static str,
    },

    /// The addressed row does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// User rows.
pub trait UserRepository: Send + Sync {
    /// Whether a user with `id` exists.
    fn exists(&self, id: UserId) -> Result<bool, StoreError>;

    /// Fetch a user by id.
    fn find(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Insert a user, enforcing [`USERS_EMAIL`] case-insensitively.
    fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// All users in registration order.
    fn list_users(&self) -> Result<Vec<User>, StoreError>;
}

/// Raffle rows.
pub trait RaffleRepository: Send + Sync {
    /// Fetch a raffle by id.
    fn get(&self, id: RaffleId) -> Result<Option<Raffle>, StoreError>;

    /// Fetch a raffle by its shareable link.
    fn find_by_link(&self, link: &str) -> Result<Option<Raffle>, StoreError>;

    /// Insert a raffle in `draft`, enforcing [`RAFFLES_UNIQUE_LINK`].
    fn insert_raffle(&self, raffle: NewRaffle) -> Result<Raffle, StoreError>;

    /// All raffles in creation order.
    fn list_raffles(&self) -> Result<Vec<Raffle>, StoreError>;

    /// Raffles owned by `creator`, in creation order.
    fn list_by_creator(&self, creator: UserId) -> Result<Vec<Raffle>, StoreError>;

    /// Apply `patch` only if `condition` holds at write time.
    ///
    /// Returns `Ok(None)` when the condition was false (zero rows
    /// affected) and [`StoreError::NotFound`] when the raffle is missing.
    /// A committed write bumps `version` by one.
    fn conditional_update(
        &self,
        id: RaffleId,
        condition: &RaffleCondition,
        patch: RafflePatch,
    ) -> Result<Option<Raffle>, StoreError>;
}

/// Participation rows.
pub trait ParticipationRepository: Send + Sync {
    /// Whether `user` already entered `raffle`.
    fn exists_for(&self, raffle: RaffleId, user: UserId) -> Result<bool, StoreError>;

    /// Insert an entry atomically.
    ///
    /// Fails with [`StoreError::UniqueViolation`] on
    /// [`PARTICIPATIONS_RAFFLE_USER`] or [`PARTICIPATIONS_RAFFLE_NUMBER`],
    /// and with [`StoreError::ConditionFailed`] when the raffle is no longer
    /// `active` at insert time.
    fn insert_unique(&self, entry: NewParticipation) -> Result<Participation, StoreError>;

    /// Entries of `raffle` in insertion order.
    fn list_by_raffle(&self, raffle: RaffleId) -> Result<Vec<Participation>, StoreError>;

    /// Number of entries in `raffle`.
    fn count_for(&self, raffle: RaffleId) -> Result<usize, StoreError>;
}
