//! # In-Memory Store
//!
//! [`Store`] is a cloneable, lock-protected keyed table that remembers
//! insertion order. [`MemoryStore`] pairs two of them with a participation
//! table that indexes both unique constraints, and implements every
//! repository trait.
//!
//! ## Locking
//!
//! All locks are `parking_lot` and are never held across `.await`. When a
//! write needs both tables, the raffle table is locked first and the
//! participation table second:
//!
//! - `insert_unique` holds the raffle row under a read lock while it
//!   inserts the entry, so the raffle cannot leave `active` mid-insert.
//! - `conditional_update` holds the raffle table under a write lock while it
//!   counts entries, so no entry can land between the count and the write.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use raffle_core::{ParticipationId, RaffleId, Timestamp, UserId};
use raffle_state::can_accept_entries;

use crate::model::{
    NewParticipation, NewRaffle, NewUser, Participation, Raffle, RaffleCondition, RafflePatch,
    User,
};
use crate::repository::{
    ParticipationRepository, RaffleRepository, StoreError, UserRepository,
    PARTICIPATIONS_RAFFLE_NUMBER, PARTICIPATIONS_RAFFLE_USER, RAFFLES_UNIQUE_LINK, USERS_EMAIL,
};

// ─── Generic Keyed Table ─────────────────────────────────────────────

#[derive(Debug)]
struct Table<K, T> {
    rows: HashMap<K, T>,
    order: Vec<K>,
}

/// Thread-safe, cloneable in-memory table that lists rows in insertion
/// order.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<Table<K, T>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K, T> Store<K, T>
where
    K: Copy + Eq + Hash + Send + Sync,
    T: Clone + Send + Sync,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Table {
                rows: HashMap::new(),
                order: Vec::new(),
            })),
        }
    }

    /// Insert a record unless an existing row conflicts with it.
    ///
    /// The conflict scan and the insert run under one write lock. Returns
    /// `false` without inserting when `conflicts` matched any row.
    pub fn insert_unless(&self, id: K, value: T, conflicts: impl Fn(&T) -> bool) -> bool {
        let mut table = self.data.write();
        if table.rows.contains_key(&id) || table.rows.values().any(|row| conflicts(row)) {
            return false;
        }
        table.rows.insert(id, value);
        table.order.push(id);
        true
    }

    /// Retrieve a record by key.
    pub fn get(&self, id: &K) -> Option<T> {
        self.data.read().rows.get(id).cloned()
    }

    /// Run `f` against a record while holding the read lock.
    pub fn inspect<R>(&self, id: &K, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.data.read().rows.get(id).map(f)
    }

    /// All records in insertion order.
    pub fn list(&self) -> Vec<T> {
        let table = self.data.read();
        table
            .order
            .iter()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect()
    }

    /// Records matching `pred`, in insertion order.
    pub fn list_where(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let table = self.data.read();
        table
            .order
            .iter()
            .filter_map(|id| table.rows.get(id))
            .filter(|row| pred(*row))
            .cloned()
            .collect()
    }

    /// First record matching `pred`.
    pub fn find_where(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().rows.values().find(|row| pred(*row)).cloned()
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure runs under a single write lock. Returns `None` if the
    /// record doesn't exist, or `Some(result)` with the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &K,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().rows.get_mut(id).map(f)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &K) -> bool {
        self.data.read().rows.contains_key(id)
    }
}

impl<K, T> Default for Store<K, T>
where
    K: Copy + Eq + Hash + Send + Sync,
    T: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

// ─── Participation Table ─────────────────────────────────────────────

#[derive(Debug, Default)]
struct Entries {
    by_raffle: HashMap<RaffleId, Vec<Participation>>,
    users: HashSet<(RaffleId, UserId)>,
    numbers: HashSet<(RaffleId, String)>,
}

impl Entries {
    fn count(&self, raffle: RaffleId) -> usize {
        self.by_raffle.get(&raffle).map_or(0, Vec::len)
    }
}

// ─── Memory Store ────────────────────────────────────────────────────

/// In-memory backend implementing all three repository traits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Store<UserId, User>,
    raffles: Store<RaffleId, Raffle>,
    entries: Arc<RwLock<Entries>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryStore {
    fn exists(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.users.contains(&id))
    }

    fn find(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id))
    }

    fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = User {
            id: UserId::new(),
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: Timestamp::now(),
        };
        let inserted = self.users.insert_unless(row.id, row.clone(), |existing| {
            existing.email.eq_ignore_ascii_case(&row.email)
        });
        if !inserted {
            tracing::debug!(constraint = USERS_EMAIL, "user insert rejected");
            return Err(StoreError::UniqueViolation {
                constraint: USERS_EMAIL,
            });
        }
        Ok(row)
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.list())
    }
}

impl RaffleRepository for MemoryStore {
    fn get(&self, id: RaffleId) -> Result<Option<Raffle>, StoreError> {
        Ok(self.raffles.get(&id))
    }

    fn find_by_link(&self, link: &str) -> Result<Option<Raffle>, StoreError> {
        Ok(self.raffles.find_where(|r| r.unique_link == link))
    }

    fn insert_raffle(&self, raffle: NewRaffle) -> Result<Raffle, StoreError> {
        let row = raffle.into_raffle(RaffleId::new(), Timestamp::now());
        let inserted = self.raffles.insert_unless(row.id, row.clone(), |existing| {
            existing.unique_link == row.unique_link
        });
        if !inserted {
            tracing::debug!(constraint = RAFFLES_UNIQUE_LINK, "raffle insert rejected");
            return Err(StoreError::UniqueViolation {
                constraint: RAFFLES_UNIQUE_LINK,
            });
        }
        Ok(row)
    }

    fn list_raffles(&self) -> Result<Vec<Raffle>, StoreError> {
        Ok(self.raffles.list())
    }

    fn list_by_creator(&self, creator: UserId) -> Result<Vec<Raffle>, StoreError> {
        Ok(self.raffles.list_where(|r| r.creator_id == creator))
    }

    fn conditional_update(
        &self,
        id: RaffleId,
        condition: &RaffleCondition,
        patch: RafflePatch,
    ) -> Result<Option<Raffle>, StoreError> {
        let outcome = self.raffles.try_update(&id, |raffle| {
            let entries = self.entries.read().count(id);
            if !condition.holds(raffle, entries) {
                return Err(StoreError::ConditionFailed { entity: "raffle" });
            }
            patch.apply(raffle);
            Ok(raffle.clone())
        });
        match outcome {
            None => Err(StoreError::NotFound {
                entity: "raffle",
                id: id.to_string(),
            }),
            Some(Ok(updated)) => Ok(Some(updated)),
            Some(Err(StoreError::ConditionFailed { .. })) => Ok(None),
            Some(Err(other)) => Err(other),
        }
    }
}

impl ParticipationRepository for MemoryStore {
    fn exists_for(&self, raffle: RaffleId, user: UserId) -> Result<bool, StoreError> {
        Ok(self.entries.read().users.contains(&(raffle, user)))
    }

    fn insert_unique(&self, entry: NewParticipation) -> Result<Participation, StoreError> {
        let raffle_id = entry.raffle_id;
        let outcome = self.raffles.inspect(&raffle_id, |raffle| {
            if !can_accept_entries(raffle.status) {
                return Err(StoreError::ConditionFailed { entity: "raffle" });
            }
            let mut entries = self.entries.write();
            if entries.users.contains(&(raffle_id, entry.user_id)) {
                return Err(StoreError::UniqueViolation {
                    constraint: PARTICIPATIONS_RAFFLE_USER,
                });
            }
            if let Some(number) = &entry.selected_number {
                if entries.numbers.contains(&(raffle_id, number.clone())) {
                    return Err(StoreError::UniqueViolation {
                        constraint: PARTICIPATIONS_RAFFLE_NUMBER,
                    });
                }
            }

            let row = Participation {
                id: ParticipationId::new(),
                raffle_id,
                user_id: entry.user_id,
                selected_number: entry.selected_number.clone(),
                payment_status: None,
                created_at: Timestamp::now(),
            };
            entries.users.insert((raffle_id, entry.user_id));
            if let Some(number) = &row.selected_number {
                entries.numbers.insert((raffle_id, number.clone()));
            }
            entries
                .by_raffle
                .entry(raffle_id)
                .or_default()
                .push(row.clone());
            Ok(row)
        });

        match outcome {
            Some(result) => {
                if let Err(e) = &result {
                    tracing::debug!(raffle_id = %raffle_id, error = %e, "participation insert rejected");
                }
                result
            }
            None => Err(StoreError::NotFound {
                entity: "raffle",
                id: raffle_id.to_string(),
            }),
        }
    }

    fn list_by_raffle(&self, raffle: RaffleId) -> Result<Vec<Participation>, StoreError> {
        Ok(self
            .entries
            .read()
            .by_raffle
            .get(&raffle)
            .cloned()
            .unwrap_or_default())
    }

    fn count_for(&self, raffle: RaffleId) -> Result<usize, StoreError> {
        Ok(self.entries.read().count(raffle))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
