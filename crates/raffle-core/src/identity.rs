//! # Identifier Newtypes
//!
//! Newtype wrappers for every record identifier in the raffle engine.
//! These prevent accidental identifier confusion: a `UserId` cannot be
//! passed where a `RaffleId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a raffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaffleId(pub Uuid);

/// Unique identifier for a user (raffle creator or entrant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

/// Unique identifier for a single raffle entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipationId(pub Uuid);

macro_rules! impl_uuid_id {
    ($ty:ident, $prefix:literal, $what:literal) => {
        impl $ty {
            #[doc = concat!("Generate a new random ", $what, " identifier.")]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

impl_uuid_id!(RaffleId, "raffle", "raffle");
impl_uuid_id!(UserId, "user", "user");
impl_uuid_id!(ParticipationId, "participation", "participation");
