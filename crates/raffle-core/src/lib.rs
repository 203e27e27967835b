//! # raffle-core — Foundational Types for the Raffle Engine
//!
//! The leaf of the workspace dependency DAG. Every other `raffle-*` crate
//! depends on it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `RaffleId`, `UserId` and
//!    `ParticipationId` are distinct types. A user reference cannot be passed
//!    where a raffle reference is expected.
//!
//! 2. **UTC-only timestamps.** [`Timestamp`] is always UTC with seconds
//!    precision.
//!
//! 3. **One selection-number format.** [`NumberSpace`] owns parsing and
//!    zero-padding of entrant numbers, so admission and winner matching agree
//!    on a single canonical representation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `raffle-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod number;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{ParticipationId, RaffleId, UserId};
pub use number::{NumberSpace, MAX_NUMBER_DIGITS};
pub use temporal::Timestamp;
