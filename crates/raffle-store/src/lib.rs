//! # raffle-store — Persistence Contracts and In-Memory Store
//!
//! The raffle engine never talks to a storage technology directly. It calls
//! three narrow repository traits:
//!
//! | Trait                       | Operations |
//! |-----------------------------|------------|
//! | [`UserRepository`]          | `exists`, `find`, `insert_user`, `list_users` |
//! | [`RaffleRepository`]        | `get`, `find_by_link`, `insert_raffle`, `list_raffles`, `list_by_creator`, `conditional_update` |
//! | [`ParticipationRepository`] | `exists_for`, `insert_unique`, `list_by_raffle`, `count_for` |
//!
//! ## Write Discipline
//!
//! Status-dependent writes are never "read, check, write". A raffle update
//! carries a [`RaffleCondition`] that must hold at write time, and an entry
//! insert is rejected by the store itself when the `(raffle, user)` pair
//! already exists or the raffle has left `active`. A backend that cannot
//! honour these semantics atomically cannot implement the traits.
//!
//! [`MemoryStore`] implements all three traits over `parking_lot` locks. It
//! is the reference backend used by the API binary and the test suites.

pub mod memory;
pub mod model;
pub mod repository;

pub use memory::{MemoryStore, Store};
pub use model::{
    NewParticipation, NewRaffle, NewUser, Participation, Raffle, RaffleCondition,
    RaffleConfiguration, RaffleMetadata, RafflePatch, User, UserRole, WinnerAssignment,
};
pub use repository::{
    ParticipationRepository, RaffleRepository, StoreError, UserRepository,
    PARTICIPATIONS_RAFFLE_NUMBER, PARTICIPATIONS_RAFFLE_USER, RAFFLES_UNIQUE_LINK, USERS_EMAIL,
};
