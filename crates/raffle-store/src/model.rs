//! # Record Types
//!
//! Persisted shapes of users, raffles and participations, plus the insert
//! and conditional-update DTOs the repositories accept.

use serde::{Deserialize, Serialize};

use raffle_core::{
    NumberSpace, ParticipationId, RaffleId, Timestamp, UserId, ValidationError,
};
use raffle_state::{RaffleStatus, SelectionMethod, TransitionRecord};

// ─── Users ───────────────────────────────────────────────────────────

/// Role a user registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Creates and runs raffles.
    Creator,
    /// Enters raffles.
    Client,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: Timestamp,
}

/// Fields required to register a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

// ─── Raffles ─────────────────────────────────────────────────────────

/// Descriptive raffle fields with no bearing on the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleMetadata {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_paid: bool,
    /// Entry price in minor currency units.
    pub price_cents: Option<u64>,
    pub raffle_date: Timestamp,
    /// Local draw time, `HH:MM`.
    pub raffle_time: Option<String>,
}

/// Fields that decide how a winner is selected. Frozen once the raffle
/// leaves `draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleConfiguration {
    pub selection_method: SelectionMethod,
    pub number_quantity: Option<u64>,
    pub number_digits: Option<u8>,
    #[serde(default)]
    pub use_lottery_integration: bool,
}

impl RaffleConfiguration {
    /// Configuration for a uniform random draw.
    pub fn random() -> Self {
        Self {
            selection_method: SelectionMethod::Random,
            number_quantity: None,
            number_digits: None,
            use_lottery_integration: false,
        }
    }

    /// Configuration for a numbered raffle.
    pub fn selection_number(quantity: u64, digits: Option<u8>, use_lottery: bool) -> Self {
        Self {
            selection_method: SelectionMethod::SelectionNumber,
            number_quantity: Some(quantity),
            number_digits: digits,
            use_lottery_integration: use_lottery,
        }
    }

    /// The number space entrants pick from, or `None` for random raffles.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NumberSpace`] when a `selection_number`
    /// raffle lacks a usable quantity/width pair.
    pub fn number_space(&self) -> Result<Option<NumberSpace>, ValidationError> {
        match self.selection_method {
            SelectionMethod::Random => Ok(None),
            SelectionMethod::SelectionNumber => {
                let quantity = self.number_quantity.ok_or_else(|| {
                    ValidationError::NumberSpace(
                        "number_quantity is required for selection_number raffles".to_string(),
                    )
                })?;
                NumberSpace::new(quantity, self.number_digits).map(Some)
            }
        }
    }
}

/// A raffle row.
///
/// `winner_id` is `Some` exactly when `status` is `Completed`, and never
/// changes once set. `version` increases by one on every committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raffle {
    pub id: RaffleId,
    pub creator_id: UserId,
    #[serde(flatten)]
    pub metadata: RaffleMetadata,
    #[serde(flatten)]
    pub configuration: RaffleConfiguration,
    pub unique_link: String,
    pub status: RaffleStatus,
    pub winner_id: Option<UserId>,
    pub winner_number: Option<String>,
    pub version: u64,
    #[serde(default)]
    pub transition_log: Vec<TransitionRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields required to insert a raffle. Status always starts at `draft`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRaffle {
    pub creator_id: UserId,
    pub metadata: RaffleMetadata,
    pub configuration: RaffleConfiguration,
    pub unique_link: String,
}

impl NewRaffle {
    /// Materialize the row as first persisted.
    pub fn into_raffle(self, id: RaffleId, now: Timestamp) -> Raffle {
        Raffle {
            id,
            creator_id: self.creator_id,
            metadata: self.metadata,
            configuration: self.configuration,
            unique_link: self.unique_link,
            status: RaffleStatus::Draft,
            winner_id: None,
            winner_number: None,
            version: 0,
            transition_log: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Winner fields written by the selection commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerAssignment {
    pub winner_id: UserId,
    pub winner_number: Option<String>,
}

/// Preconditions a conditional raffle update requires at write time.
///
/// Every field that is set must match; unset fields are not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaffleCondition {
    pub status: Option<RaffleStatus>,
    pub winner_unset: bool,
    pub version: Option<u64>,
    pub entry_count: Option<usize>,
}

impl RaffleCondition {
    /// A condition that always holds.
    pub fn any() -> Self {
        Self::default()
    }

    /// Require the row to be in `status`.
    pub fn with_status(mut self, status: RaffleStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Require `winner_id IS NULL`.
    pub fn without_winner(mut self) -> Self {
        self.winner_unset = true;
        self
    }

    /// Require the row to still be at `version`.
    pub fn at_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Require the raffle to hold exactly `count` participations.
    pub fn with_entry_count(mut self, count: usize) -> Self {
        self.entry_count = Some(count);
        self
    }

    /// Evaluate the condition against a row and its current entry count.
    pub fn holds(&self, raffle: &Raffle, entries: usize) -> bool {
        self.status.map_or(true, |s| raffle.status == s)
            && (!self.winner_unset || raffle.winner_id.is_none())
            && self.version.map_or(true, |v| raffle.version == v)
            && self.entry_count.map_or(true, |n| entries == n)
    }
}

/// New field values for a conditional raffle update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RafflePatch {
    pub status: Option<RaffleStatus>,
    pub winner: Option<WinnerAssignment>,
    pub metadata: Option<RaffleMetadata>,
    pub configuration: Option<RaffleConfiguration>,
    pub transition: Option<TransitionRecord>,
    pub updated_at: Timestamp,
}

impl RafflePatch {
    /// An empty patch stamped `updated_at`.
    pub fn at(updated_at: Timestamp) -> Self {
        Self {
            status: None,
            winner: None,
            metadata: None,
            configuration: None,
            transition: None,
            updated_at,
        }
    }

    /// Move to `to`, logging the transition from `from`.
    pub fn transition(mut self, from: RaffleStatus, to: RaffleStatus, reason: Option<String>) -> Self {
        self.status = Some(to);
        self.transition = Some(TransitionRecord {
            from_state: from,
            to_state: to,
            timestamp: self.updated_at,
            reason,
        });
        self
    }

    /// Assign the winner.
    pub fn winner(mut self, winner: WinnerAssignment) -> Self {
        self.winner = Some(winner);
        self
    }

    /// Replace descriptive fields.
    pub fn metadata(mut self, metadata: RaffleMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Replace the selection configuration.
    pub fn configuration(mut self, configuration: RaffleConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Apply the patch to a row in place and bump its version.
    pub fn apply(self, raffle: &mut Raffle) {
        if let Some(status) = self.status {
            raffle.status = status;
        }
        if let Some(winner) = self.winner {
            raffle.winner_id = Some(winner.winner_id);
            raffle.winner_number = winner.winner_number;
        }
        if let Some(metadata) = self.metadata {
            raffle.metadata = metadata;
        }
        if let Some(configuration) = self.configuration {
            raffle.configuration = configuration;
        }
        if let Some(record) = self.transition {
            raffle.transition_log.push(record);
        }
        raffle.updated_at = self.updated_at;
        raffle.version += 1;
    }
}

// ─── Participations ──────────────────────────────────────────────────

/// One user's entry into one raffle. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub id: ParticipationId,
    pub raffle_id: RaffleId,
    pub user_id: UserId,
    pub selected_number: Option<String>,
    /// Owned by a billing collaborator; the engine leaves it unset.
    pub payment_status: Option<String>,
    pub created_at: Timestamp,
}

/// Fields required to insert a participation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipation {
    pub raffle_id: RaffleId,
    pub user_id: UserId,
    pub selected_number: Option<String>,
}
