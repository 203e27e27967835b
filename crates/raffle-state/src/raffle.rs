//! # Raffle Status Machine
//!
//! Status enum, transition table and the admission/selection predicates.
//!
//! ## Allowed Transitions
//!
//! | From     | To          |
//! |----------|-------------|
//! | `Draft`  | `Active`    |
//! | `Draft`  | `Cancelled` |
//! | `Active` | `Completed` |
//! | `Active` | `Cancelled` |
//!
//! `Completed` and `Cancelled` are terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use raffle_core::{Timestamp, UserId};

// ─── Raffle Status ───────────────────────────────────────────────────

/// The lifecycle status of a raffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaffleStatus {
    /// Being configured by its creator; accepts no entries.
    Draft,
    /// Open for entries; a winner may be selected.
    Active,
    /// A winner has been assigned (terminal).
    Completed,
    /// Closed without a winner (terminal).
    Cancelled,
}

impl RaffleStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [RaffleStatus; 4] = [
        Self::Draft,
        Self::Active,
        Self::Completed,
        Self::Cancelled,
    ];

    /// The canonical wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Statuses directly reachable from this one.
    ///
    /// No wildcard arm, so a new variant forces this table to be revisited.
    pub fn valid_transitions(&self) -> &'static [RaffleStatus] {
        match self {
            Self::Draft => &[Self::Active, Self::Cancelled],
            Self::Active => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether `self → to` is an edge of the status graph.
    pub fn can_transition_to(&self, to: RaffleStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for RaffleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Selection Method ────────────────────────────────────────────────

/// How a raffle's winner is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Uniform draw among all entrants.
    Random,
    /// Entrants claim numbers; the entrant holding the drawn number wins.
    SelectionNumber,
}

impl SelectionMethod {
    /// The canonical wire name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::SelectionNumber => "selection_number",
        }
    }
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by the status machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The requested transition is not an edge of the status graph.
    #[error("invalid raffle transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: RaffleStatus,
        /// Requested status.
        to: RaffleStatus,
    },
}

// ─── Predicates ──────────────────────────────────────────────────────

/// Validate a requested transition against the status graph.
pub fn validate_transition(from: RaffleStatus, to: RaffleStatus) -> Result<(), StateError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(StateError::InvalidTransition { from, to })
    }
}

/// Whether a raffle in `status` may record new entries.
pub fn can_accept_entries(status: RaffleStatus) -> bool {
    status == RaffleStatus::Active
}

/// Whether a raffle in `status` with the given winner may have a winner
/// selected.
pub fn can_select_winner(status: RaffleStatus, winner_id: Option<UserId>) -> bool {
    status == RaffleStatus::Active && winner_id.is_none()
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a committed status transition, appended to the raffle's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Status before the transition.
    pub from_state: RaffleStatus,
    /// Status after the transition.
    pub to_state: RaffleStatus,
    /// When the transition was committed.
    pub timestamp: Timestamp,
    /// Why the transition happened.
    pub reason: Option<String>,
}

impl TransitionRecord {
    /// Build a record for `from → to` stamped now.
    pub fn new(from: RaffleStatus, to: RaffleStatus, reason: Option<String>) -> Self {
        Self {
            from_state: from,
            to_state: to,
            timestamp: Timestamp::now(),
            reason,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
