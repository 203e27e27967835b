//! # Raffle Service
//!
//! Single entry point for every raffle operation. Holds the repositories
//! and collaborators once and hands them to the admission, selection and
//! lifecycle components.

use std::sync::Arc;

use raffle_core::{RaffleId, UserId};
use raffle_store::{
    NewUser, Participation, ParticipationRepository, Raffle, RaffleRepository, StoreError, User,
    UserRepository, UserRole, USERS_EMAIL,
};

use crate::admission::AdmissionController;
use crate::entropy::EntropySource;
use crate::error::RaffleError;
use crate::lifecycle::{CreateRaffle, RaffleLifecycle, RaffleUpdate};
use crate::lottery::{LotteryDraw, NoLotteryDraw};
use crate::selection::WinnerSelector;

/// Input to [`RaffleService::create_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// Facade over the raffle engine.
#[derive(Clone)]
pub struct RaffleService {
    users: Arc<dyn UserRepository>,
    raffles: Arc<dyn RaffleRepository>,
    admission: AdmissionController,
    selector: WinnerSelector,
    lifecycle: RaffleLifecycle,
}

impl std::fmt::Debug for RaffleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaffleService").finish_non_exhaustive()
    }
}

impl RaffleService {
    /// Assemble a service from individual repositories and collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        raffles: Arc<dyn RaffleRepository>,
        participations: Arc<dyn ParticipationRepository>,
        entropy: Arc<dyn EntropySource>,
        lottery: Arc<dyn LotteryDraw>,
    ) -> Self {
        Self {
            admission: AdmissionController::new(
                users.clone(),
                raffles.clone(),
                participations.clone(),
            ),
            selector: WinnerSelector::new(raffles.clone(), participations, entropy, lottery),
            lifecycle: RaffleLifecycle::new(users.clone(), raffles.clone()),
            users,
            raffles,
        }
    }

    /// Assemble a service over one backend implementing every repository,
    /// with no lottery integration.
    pub fn with_store<S>(store: Arc<S>, entropy: Arc<dyn EntropySource>) -> Self
    where
        S: UserRepository + RaffleRepository + ParticipationRepository + 'static,
    {
        Self::new(
            store.clone(),
            store.clone(),
            store,
            entropy,
            Arc::new(NoLotteryDraw),
        )
    }

    // ─── Users ───────────────────────────────────────────────────────

    /// Register a user. Emails are unique, compared case-insensitively.
    pub fn create_user(&self, request: CreateUser) -> Result<User, RaffleError> {
        let email = request.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(RaffleError::InvalidUser {
                field: "email",
                reason: "email must contain '@'".to_string(),
            });
        }
        let name = request.name.trim();
        if name.is_empty() {
            return Err(RaffleError::InvalidUser {
                field: "name",
                reason: "name must not be empty".to_string(),
            });
        }

        let new = NewUser {
            email: email.to_string(),
            name: name.to_string(),
            role: request.role,
        };
        match self.users.insert_user(new) {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = ?user.role, "user registered");
                Ok(user)
            }
            Err(StoreError::UniqueViolation { constraint }) if constraint == USERS_EMAIL => {
                Err(RaffleError::EmailTaken)
            }
            Err(other) => Err(RaffleError::Storage(other)),
        }
    }

    /// Fetch a user.
    pub fn get_user(&self, user_id: UserId) -> Result<User, RaffleError> {
        self.users
            .find(user_id)?
            .ok_or(RaffleError::UserNotFound { user_id })
    }

    /// All users in registration order.
    pub fn list_users(&self) -> Result<Vec<User>, RaffleError> {
        Ok(self.users.list_users()?)
    }

    // ─── Raffles ─────────────────────────────────────────────────────

    /// Create a raffle in `draft`.
    pub fn create_raffle(&self, request: CreateRaffle) -> Result<Raffle, RaffleError> {
        self.lifecycle.create(request)
    }

    /// Fetch a raffle.
    pub fn get_raffle(&self, raffle_id: RaffleId) -> Result<Raffle, RaffleError> {
        self.raffles
            .get(raffle_id)?
            .ok_or(RaffleError::RaffleNotFound {
                raffle_id: Some(raffle_id),
            })
    }

    /// Fetch a raffle by share link.
    pub fn get_raffle_by_link(&self, link: &str) -> Result<Raffle, RaffleError> {
        self.raffles
            .find_by_link(link)?
            .ok_or(RaffleError::RaffleNotFound { raffle_id: None })
    }

    /// All raffles in creation order.
    pub fn list_raffles(&self) -> Result<Vec<Raffle>, RaffleError> {
        Ok(self.raffles.list_raffles()?)
    }

    /// Raffles owned by `creator_id` in creation order.
    pub fn list_raffles_by_creator(&self, creator_id: UserId) -> Result<Vec<Raffle>, RaffleError> {
        if !self.users.exists(creator_id)? {
            return Err(RaffleError::UserNotFound {
                user_id: creator_id,
            });
        }
        Ok(self.raffles.list_by_creator(creator_id)?)
    }

    /// Apply a partial update.
    pub fn update_raffle(
        &self,
        raffle_id: RaffleId,
        update: RaffleUpdate,
    ) -> Result<Raffle, RaffleError> {
        self.lifecycle.update(raffle_id, update)
    }

    /// Open a draft raffle for entries.
    pub fn activate_raffle(&self, raffle_id: RaffleId) -> Result<Raffle, RaffleError> {
        self.lifecycle.activate(raffle_id)
    }

    /// Close a raffle without a winner.
    pub fn cancel_raffle(
        &self,
        raffle_id: RaffleId,
        reason: Option<String>,
    ) -> Result<Raffle, RaffleError> {
        self.lifecycle.cancel(raffle_id, reason)
    }

    // ─── Entries & Winners ───────────────────────────────────────────

    /// Enter `user_id` into `raffle_id`.
    pub fn participate(
        &self,
        raffle_id: RaffleId,
        user_id: UserId,
        selected_number: Option<&str>,
    ) -> Result<Participation, RaffleError> {
        self.admission.submit(raffle_id, user_id, selected_number)
    }

    /// Entries of `raffle_id` in insertion order.
    pub fn list_participants(&self, raffle_id: RaffleId) -> Result<Vec<Participation>, RaffleError> {
        self.admission.list_participants(raffle_id)
    }

    /// Select the winner with the raffle's configured method.
    pub fn select_winner(&self, raffle_id: RaffleId) -> Result<Raffle, RaffleError> {
        self.selector.select_winner(raffle_id)
    }

    /// Select the winner of a `selection_number` raffle from a designated
    /// number.
    pub fn select_winner_with_number(
        &self,
        raffle_id: RaffleId,
        winning_number: &str,
    ) -> Result<Raffle, RaffleError> {
        self.selector
            .select_winner_with_number(raffle_id, winning_number)
    }
}
