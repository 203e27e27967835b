//! # Engine Errors
//!
//! Every failure the engine reports carries a stable identifier
//! ([`RaffleError::code`]) and a coarse classification
//! ([`RaffleError::kind`]) that transports map to their own status codes.
//! Message text is part of the contract and must not drift.

use thiserror::Error;

use raffle_core::{RaffleId, UserId};
use raffle_state::RaffleStatus;
use raffle_store::StoreError;

/// Classification of a [`RaffleError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound {
        /// Kind of the missing record.
        entity: &'static str,
    },
    /// The raffle is not in a status that permits the operation.
    InvalidState {
        /// Status (or condition) the operation needed.
        expected: &'static str,
        /// Status the raffle was observed in, when known.
        actual: Option<RaffleStatus>,
    },
    /// A uniqueness constraint rejected the write.
    Duplicate {
        /// Name of the constraint.
        constraint: &'static str,
    },
    /// Caller input failed validation.
    Validation {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// A conditional write lost a race while its preconditions still held.
    ConcurrencyConflict,
    /// The storage backend failed; retry policy belongs to the caller.
    Storage,
}

/// Errors returned by raffle engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// No raffle with the given id (or link).
    #[error("Raffle not found")]
    RaffleNotFound {
        /// The id that was looked up, when the lookup was by id.
        raffle_id: Option<RaffleId>,
    },

    /// Entries are only accepted while the raffle is active.
    #[error("Raffle is not active")]
    RaffleNotActive {
        /// Observed status.
        status: RaffleStatus,
    },

    /// No user with the given id.
    #[error("User not found")]
    UserNotFound {
        /// The id that was looked up.
        user_id: UserId,
    },

    /// The user already holds an entry in this raffle.
    #[error("User has already participated in this raffle")]
    DuplicateParticipation,

    /// The selected number is missing, malformed, out of range or taken.
    #[error("Invalid selection number: {reason}")]
    InvalidSelectionNumber {
        /// Why the number was rejected.
        reason: String,
    },

    /// A winner is already recorded.
    #[error("Winner already selected for this raffle")]
    WinnerAlreadySelected,

    /// Winner selection requires an active raffle.
    #[error("Raffle must be active to select winner")]
    RaffleMustBeActive {
        /// Observed status.
        status: RaffleStatus,
    },

    /// Winner selection needs at least one entry.
    #[error("No participants found for this raffle")]
    NoParticipants,

    /// The selection method or its number space cannot be used.
    #[error("Invalid winner selection method: {reason}")]
    InvalidSelectionMethod {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// The requested status change is not an edge of the status graph.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: RaffleStatus,
        /// Requested status.
        to: RaffleStatus,
    },

    /// Another user already registered this email.
    #[error("Email is already registered")]
    EmailTaken,

    /// User fields failed validation.
    #[error("Invalid user: {field}: {reason}")]
    InvalidUser {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Raffle fields failed validation.
    #[error("Invalid raffle: {field}: {reason}")]
    InvalidRaffle {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The raffle can no longer be edited this way.
    #[error("Raffle configuration is locked while {status}")]
    ConfigurationLocked {
        /// Observed status.
        status: RaffleStatus,
    },

    /// A `selection_number` draw was requested without a winning number.
    #[error("No winning number available for this raffle")]
    WinningNumberUnavailable,

    /// The winning number is held by no participant.
    #[error("No participant holds winning number {number}")]
    NoWinningEntry {
        /// Canonical winning number.
        number: String,
    },

    /// A conditional write lost a race to a concurrent writer.
    #[error("Raffle was modified concurrently, retry the request")]
    ConcurrencyConflict,

    /// The storage backend failed.
    #[error("storage failure: {0}")]
    Storage(StoreError),
}

impl RaffleError {
    /// Stable identifier of this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RaffleNotFound { .. } => "RaffleNotFound",
            Self::RaffleNotActive { .. } => "RaffleNotActive",
            Self::UserNotFound { .. } => "UserNotFound",
            Self::DuplicateParticipation => "DuplicateParticipation",
            Self::InvalidSelectionNumber { .. } => "InvalidSelectionNumber",
            Self::WinnerAlreadySelected => "WinnerAlreadySelected",
            Self::RaffleMustBeActive { .. } => "RaffleMustBeActive",
            Self::NoParticipants => "NoParticipants",
            Self::InvalidSelectionMethod { .. } => "InvalidSelectionMethod",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::EmailTaken => "EmailTaken",
            Self::InvalidUser { .. } => "InvalidUser",
            Self::InvalidRaffle { .. } => "InvalidRaffle",
            Self::ConfigurationLocked { .. } => "ConfigurationLocked",
            Self::WinningNumberUnavailable => "WinningNumberUnavailable",
            Self::NoWinningEntry { .. } => "NoWinningEntry",
            Self::ConcurrencyConflict => "ConcurrencyConflict",
            Self::Storage(_) => "Storage",
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RaffleNotFound { .. } => ErrorKind::NotFound { entity: "raffle" },
            Self::UserNotFound { .. } => ErrorKind::NotFound { entity: "user" },
            Self::NoParticipants => ErrorKind::NotFound {
                entity: "participation",
            },
            Self::NoWinningEntry { .. } => ErrorKind::NotFound {
                entity: "winning entry",
            },
            Self::RaffleNotActive { status } | Self::RaffleMustBeActive { status } => {
                ErrorKind::InvalidState {
                    expected: "active",
                    actual: Some(*status),
                }
            }
            Self::WinnerAlreadySelected => ErrorKind::InvalidState {
                expected: "winner unset",
                actual: Some(RaffleStatus::Completed),
            },
            Self::InvalidTransition { from, .. } => ErrorKind::InvalidState {
                expected: "legal transition source",
                actual: Some(*from),
            },
            Self::ConfigurationLocked { status } => ErrorKind::InvalidState {
                expected: "draft",
                actual: Some(*status),
            },
            Self::WinningNumberUnavailable => ErrorKind::InvalidState {
                expected: "winning number",
                actual: None,
            },
            Self::DuplicateParticipation => ErrorKind::Duplicate {
                constraint: raffle_store::PARTICIPATIONS_RAFFLE_USER,
            },
            Self::EmailTaken => ErrorKind::Duplicate {
                constraint: raffle_store::USERS_EMAIL,
            },
            Self::InvalidSelectionNumber { reason } => ErrorKind::Validation {
                field: "selected_number",
                reason: reason.clone(),
            },
            Self::InvalidSelectionMethod { reason } => ErrorKind::Validation {
                field: "selection_method",
                reason: reason.clone(),
            },
            Self::InvalidUser { field, reason } | Self::InvalidRaffle { field, reason } => {
                ErrorKind::Validation {
                    field: *field,
                    reason: reason.clone(),
                }
            }
            Self::ConcurrencyConflict => ErrorKind::ConcurrencyConflict,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Storage failures that reach this conversion are not precondition
/// failures and pass through untranslated. Call sites that expect a
/// specific [`StoreError`] (unique violations, failed conditions) match it
/// before falling back to `?`.
impl From<StoreError> for RaffleError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err)
    }
}
