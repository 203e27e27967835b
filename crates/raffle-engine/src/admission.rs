//! # Participation Admission
//!
//! Decides whether a user's entry into a raffle is recorded.
//!
//! Preconditions are checked in a fixed order and each has its own error,
//! so a caller always learns the first reason an entry was refused:
//!
//! 1. the raffle exists (`RaffleNotFound`)
//! 2. the raffle accepts entries (`RaffleNotActive`)
//! 3. the user exists (`UserNotFound`)
//! 4. the user has no entry yet (`DuplicateParticipation`)
//! 5. the selected number fits the raffle (`InvalidSelectionNumber`)
//!
//! The checks are advisory. The insert itself is
//! [`ParticipationRepository::insert_unique`], which re-checks uniqueness
//! and the raffle's status atomically, so a racing submission that passed
//! the same checks loses at the store and is reported with the same error
//! the check would have produced.

use std::sync::Arc;

use raffle_core::{RaffleId, UserId};
use raffle_state::can_accept_entries;
use raffle_store::{
    NewParticipation, Participation, ParticipationRepository, RaffleRepository, StoreError,
    UserRepository, PARTICIPATIONS_RAFFLE_NUMBER, PARTICIPATIONS_RAFFLE_USER,
};

use crate::error::RaffleError;

/// Records raffle entries.
#[derive(Clone)]
pub struct AdmissionController {
    users: Arc<dyn UserRepository>,
    raffles: Arc<dyn RaffleRepository>,
    participations: Arc<dyn ParticipationRepository>,
}

impl std::fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionController").finish_non_exhaustive()
    }
}

impl AdmissionController {
    /// Create a controller over the given repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        raffles: Arc<dyn RaffleRepository>,
        participations: Arc<dyn ParticipationRepository>,
    ) -> Self {
        Self {
            users,
            raffles,
            participations,
        }
    }

    /// Submit an entry for `user_id` into `raffle_id`.
    ///
    /// For `random` raffles any `selected_number` is discarded. For
    /// `selection_number` raffles it is required and stored in canonical
    /// zero-padded form.
    pub fn submit(
        &self,
        raffle_id: RaffleId,
        user_id: UserId,
        selected_number: Option<&str>,
    ) -> Result<Participation, RaffleError> {
        let raffle = self
            .raffles
            .get(raffle_id)?
            .ok_or(RaffleError::RaffleNotFound {
                raffle_id: Some(raffle_id),
            })?;

        if !can_accept_entries(raffle.status) {
            tracing::debug!(raffle_id = %raffle_id, status = %raffle.status, "entry refused: raffle not active");
            return Err(RaffleError::RaffleNotActive {
                status: raffle.status,
            });
        }

        if !self.users.exists(user_id)? {
            return Err(RaffleError::UserNotFound { user_id });
        }

        if self.participations.exists_for(raffle_id, user_id)? {
            tracing::debug!(raffle_id = %raffle_id, user_id = %user_id, "entry refused: duplicate");
            return Err(RaffleError::DuplicateParticipation);
        }

        let space = raffle
            .configuration
            .number_space()
            .map_err(|e| RaffleError::InvalidSelectionMethod {
                reason: e.to_string(),
            })?;
        let selected_number = match space {
            None => None,
            Some(space) => {
                let input = selected_number.ok_or_else(|| RaffleError::InvalidSelectionNumber {
                    reason: "a number is required for selection_number raffles".to_string(),
                })?;
                let canonical =
                    space
                        .normalize(input)
                        .map_err(|e| RaffleError::InvalidSelectionNumber {
                            reason: e.to_string(),
                        })?;
                Some(canonical)
            }
        };

        let entry = NewParticipation {
            raffle_id,
            user_id,
            selected_number: selected_number.clone(),
        };
        match self.participations.insert_unique(entry) {
            Ok(participation) => {
                tracing::info!(
                    raffle_id = %raffle_id,
                    user_id = %user_id,
                    participation_id = %participation.id,
                    selected_number = participation.selected_number.as_deref().unwrap_or("-"),
                    "participation recorded"
                );
                Ok(participation)
            }
            Err(StoreError::UniqueViolation { constraint }) if constraint == PARTICIPATIONS_RAFFLE_USER => {
                tracing::warn!(raffle_id = %raffle_id, user_id = %user_id, "concurrent duplicate entry rejected");
                Err(RaffleError::DuplicateParticipation)
            }
            Err(StoreError::UniqueViolation { constraint })
                if constraint == PARTICIPATIONS_RAFFLE_NUMBER =>
            {
                Err(RaffleError::InvalidSelectionNumber {
                    reason: format!(
                        "number {} is already taken",
                        selected_number.as_deref().unwrap_or_default()
                    ),
                })
            }
            Err(StoreError::ConditionFailed { .. }) => {
                // The raffle left `active` between the check and the insert.
                let status = self
                    .raffles
                    .get(raffle_id)?
                    .map(|r| r.status)
                    .ok_or(RaffleError::RaffleNotFound {
                        raffle_id: Some(raffle_id),
                    })?;
                tracing::warn!(raffle_id = %raffle_id, status = %status, "raffle closed during entry");
                Err(RaffleError::RaffleNotActive { status })
            }
            Err(StoreError::NotFound { .. }) => Err(RaffleError::RaffleNotFound {
                raffle_id: Some(raffle_id),
            }),
            Err(other) => Err(RaffleError::Storage(other)),
        }
    }

    /// Entries of `raffle_id` in insertion order.
    pub fn list_participants(&self, raffle_id: RaffleId) -> Result<Vec<Participation>, RaffleError> {
        if self.raffles.get(raffle_id)?.is_none() {
            return Err(RaffleError::RaffleNotFound {
                raffle_id: Some(raffle_id),
            });
        }
        Ok(self.participations.list_by_raffle(raffle_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{active_raffle, client, Fixture, FailingStore};
    use raffle_state::RaffleStatus;
    use raffle_store::RaffleConfiguration;

    fn controller(fx: &Fixture) -> AdmissionController {
        AdmissionController::new(fx.users(), fx.raffles(), fx.participations())
    }

    #[test]
    fn records_random_entry_without_number() {
        let fx = Fixture::new();
        let raffle = active_raffle(&fx, RaffleConfiguration::random());
        let user = client(&fx, "u1@example.com");
        let entry = controller(&fx).submit(raffle, user, Some("042")).unwrap();
        assert_eq!(entry.selected_number, None);
        assert_eq!(entry.payment_status, None);
        assert_eq!(entry.user_id, user);
    }

    #[test]
    fn missing_raffle_checked_first() {
        let fx = Fixture::new();
        let err = controller(&fx)
            .submit(RaffleId::new(), UserId::new(), None)
            .unwrap_err();
        assert_eq!(err.code(), "RaffleNotFound");
    }

    #[test]
    fn inactive_raffle_checked_before_user() {
        let fx = Fixture::new();
        let raffle = fx.draft_raffle(RaffleConfiguration::random());
        let err = controller(&fx)
            .submit(raffle, UserId::new(), None)
            .unwrap_err();
        assert_eq!(
            err,
            RaffleError::RaffleNotActive {
                status: RaffleStatus::Draft
            }
        );
    }

    #[test]
    fn unknown_user_rejected() {
        let fx = Fixture::new();
        let raffle = active_raffle(&fx, RaffleConfiguration::random());
        let user = UserId::new();
        let err = controller(&fx).submit(raffle, user, None).unwrap_err();
        assert_eq!(err, RaffleError::UserNotFound { user_id: user });
    }

    #[test]
    fn second_entry_is_duplicate() {
        let fx = Fixture::new();
        let raffle = active_raffle(&fx, RaffleConfiguration::random());
        let user = client(&fx, "u1@example.com");
        let admission = controller(&fx);
        admission.submit(raffle, user, None).unwrap();
        assert_eq!(
            admission.submit(raffle, user, None).unwrap_err(),
            RaffleError::DuplicateParticipation
        );
        assert_eq!(admission.list_participants(raffle).unwrap().len(), 1);
    }

    #[test]
    fn selection_number_is_required_and_normalized() {
        let fx = Fixture::new();
        let raffle = active_raffle(&fx, RaffleConfiguration::selection_number(100, Some(3), false));
        let admission = controller(&fx);
        let u1 = client(&fx, "u1@example.com");
        let u2 = client(&fx, "u2@example.com");

        assert_eq!(
            admission.submit(raffle, u1, None).unwrap_err().code(),
            "InvalidSelectionNumber"
        );
        for bad in ["0", "101", "abc", "0007"] {
            assert_eq!(
                admission.submit(raffle, u1, Some(bad)).unwrap_err().code(),
                "InvalidSelectionNumber",
                "accepted {bad:?}"
            );
        }
        let entry = admission.submit(raffle, u1, Some("7")).unwrap();
        assert_eq!(entry.selected_number.as_deref(), Some("007"));

        let err = admission.submit(raffle, u2, Some("007")).unwrap_err();
        assert_eq!(
            err,
            RaffleError::InvalidSelectionNumber {
                reason: "number 007 is already taken".to_string()
            }
        );
    }

    #[test]
    fn storage_failures_pass_through() {
        let store = Arc::new(FailingStore);
        let admission = AdmissionController::new(store.clone(), store.clone(), store);
        let err = admission
            .submit(RaffleId::new(), UserId::new(), None)
            .unwrap_err();
        assert!(matches!(err, RaffleError::Storage(StoreError::Backend(_))));
    }
}
