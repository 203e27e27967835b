//! # Winner Selection
//!
//! Resolves an active raffle to exactly one winner and moves it to
//! `completed` in the same write.
//!
//! ## Exactly Once
//!
//! The commit is a single [`RaffleRepository::conditional_update`] guarded
//! by `status = active AND winner_id IS NULL AND entry count = N`, where `N`
//! is the size of the entry set the draw was taken over. Of any number of
//! concurrent selections at most one can satisfy the guard. A losing call
//! re-reads the row and reports why it lost instead of returning silently.
//!
//! ## Methods
//!
//! - `random`: uniform draw over all entries in insertion order.
//! - `selection_number`: the entry holding the winning number wins. The
//!   number is supplied explicitly or, for lottery-integrated raffles, by the
//!   [`LotteryDraw`] collaborator. Without one the call fails; it never falls
//!   back to an arbitrary entry.

use std::sync::Arc;

use raffle_core::{RaffleId, Timestamp};
use raffle_state::{can_select_winner, RaffleStatus, SelectionMethod};
use raffle_store::{
    Participation, ParticipationRepository, Raffle, RaffleCondition, RafflePatch,
    RaffleRepository, StoreError, WinnerAssignment,
};

use crate::entropy::EntropySource;
use crate::error::RaffleError;
use crate::lottery::LotteryDraw;

/// Selects raffle winners.
#[derive(Clone)]
pub struct WinnerSelector {
    raffles: Arc<dyn RaffleRepository>,
    participations: Arc<dyn ParticipationRepository>,
    entropy: Arc<dyn EntropySource>,
    lottery: Arc<dyn LotteryDraw>,
}

impl std::fmt::Debug for WinnerSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinnerSelector").finish_non_exhaustive()
    }
}

impl WinnerSelector {
    /// Create a selector drawing from `entropy` and `lottery`.
    pub fn new(
        raffles: Arc<dyn RaffleRepository>,
        participations: Arc<dyn ParticipationRepository>,
        entropy: Arc<dyn EntropySource>,
        lottery: Arc<dyn LotteryDraw>,
    ) -> Self {
        Self {
            raffles,
            participations,
            entropy,
            lottery,
        }
    }

    /// Select the winner of `raffle_id` using its configured method.
    pub fn select_winner(&self, raffle_id: RaffleId) -> Result<Raffle, RaffleError> {
        self.select(raffle_id, None)
    }

    /// Select the winner of a `selection_number` raffle from a designated
    /// winning number.
    pub fn select_winner_with_number(
        &self,
        raffle_id: RaffleId,
        winning_number: &str,
    ) -> Result<Raffle, RaffleError> {
        self.select(raffle_id, Some(winning_number))
    }

    fn select(&self, raffle_id: RaffleId, designated: Option<&str>) -> Result<Raffle, RaffleError> {
        let raffle = self
            .raffles
            .get(raffle_id)?
            .ok_or(RaffleError::RaffleNotFound {
                raffle_id: Some(raffle_id),
            })?;

        if !can_select_winner(raffle.status, raffle.winner_id) {
            // An existing winner is reported ahead of the status.
            if raffle.winner_id.is_some() {
                return Err(RaffleError::WinnerAlreadySelected);
            }
            tracing::debug!(raffle_id = %raffle_id, status = %raffle.status, "selection refused: raffle not active");
            return Err(RaffleError::RaffleMustBeActive {
                status: raffle.status,
            });
        }

        let entries = self.participations.list_by_raffle(raffle_id)?;
        if entries.is_empty() {
            return Err(RaffleError::NoParticipants);
        }

        let winner = match raffle.configuration.selection_method {
            SelectionMethod::Random => {
                if designated.is_some() {
                    return Err(RaffleError::InvalidSelectionMethod {
                        reason: "a winning number only applies to selection_number raffles"
                            .to_string(),
                    });
                }
                self.draw_random(&entries)
            }
            SelectionMethod::SelectionNumber => self.match_number(&raffle, &entries, designated)?,
        };

        self.commit(&raffle, entries.len(), winner)
    }

    fn draw_random<'a>(&self, entries: &'a [Participation]) -> &'a Participation {
        let index = self.entropy.draw_index(entries.len()) % entries.len();
        &entries[index]
    }

    fn match_number<'a>(
        &self,
        raffle: &Raffle,
        entries: &'a [Participation],
        designated: Option<&str>,
    ) -> Result<&'a Participation, RaffleError> {
        let space = raffle
            .configuration
            .number_space()
            .map_err(|e| RaffleError::InvalidSelectionMethod {
                reason: e.to_string(),
            })?
            .ok_or_else(|| RaffleError::InvalidSelectionMethod {
                reason: "selection_number raffle has no number space".to_string(),
            })?;

        let drawn = match designated {
            Some(number) => number.to_string(),
            None if raffle.configuration.use_lottery_integration => self
                .lottery
                .winning_number(raffle)
                .ok_or(RaffleError::WinningNumberUnavailable)?,
            None => return Err(RaffleError::WinningNumberUnavailable),
        };
        let number = space
            .normalize(&drawn)
            .map_err(|e| RaffleError::InvalidSelectionNumber {
                reason: e.to_string(),
            })?;

        entries
            .iter()
            .find(|p| p.selected_number.as_deref() == Some(number.as_str()))
            .ok_or(RaffleError::NoWinningEntry { number })
    }

    fn commit(
        &self,
        raffle: &Raffle,
        entry_count: usize,
        winner: &Participation,
    ) -> Result<Raffle, RaffleError> {
        let condition = RaffleCondition::any()
            .with_status(RaffleStatus::Active)
            .without_winner()
            .with_entry_count(entry_count);
        let patch = RafflePatch::at(Timestamp::now())
            .transition(
                RaffleStatus::Active,
                RaffleStatus::Completed,
                Some("winner selected".to_string()),
            )
            .winner(WinnerAssignment {
                winner_id: winner.user_id,
                winner_number: winner.selected_number.clone(),
            });

        match self.raffles.conditional_update(raffle.id, &condition, patch) {
            Ok(Some(updated)) => {
                tracing::info!(
                    raffle_id = %updated.id,
                    winner_id = %winner.user_id,
                    winner_number = winner.selected_number.as_deref().unwrap_or("-"),
                    method = %updated.configuration.selection_method,
                    entries = entry_count,
                    "winner selected"
                );
                Ok(updated)
            }
            Ok(None) => {
                tracing::warn!(raffle_id = %raffle.id, "winner commit lost a concurrent race");
                Err(self.explain_lost_commit(raffle.id)?)
            }
            Err(StoreError::NotFound { .. }) => Err(RaffleError::RaffleNotFound {
                raffle_id: Some(raffle.id),
            }),
            Err(other) => Err(RaffleError::Storage(other)),
        }
    }

    /// Re-read a raffle whose commit matched zero rows and name the cause.
    fn explain_lost_commit(&self, raffle_id: RaffleId) -> Result<RaffleError, RaffleError> {
        let current = self.raffles.get(raffle_id)?;
        Ok(match current {
            None => RaffleError::RaffleNotFound {
                raffle_id: Some(raffle_id),
            },
            Some(r) if r.winner_id.is_some() => RaffleError::WinnerAlreadySelected,
            Some(r) if r.status != RaffleStatus::Active => {
                RaffleError::RaffleMustBeActive { status: r.status }
            }
            // Still active with no winner: an entry landed after the draw.
            Some(_) => RaffleError::ConcurrencyConflict,
        })
    }
}
