//! # raffle-state — Raffle Lifecycle State Machine
//!
//! Defines the status graph every raffle moves through and the pure
//! predicates the admission and winner-selection paths consult before they
//! attempt a write.
//!
//! ```text
//! Draft ──activate──▶ Active ──select winner──▶ Completed (terminal)
//!   │                   │
//!   └──cancel──┐        └──cancel──┐
//!              ▼                   ▼
//!          Cancelled (terminal)  Cancelled (terminal)
//! ```
//!
//! ## Design
//!
//! The machine holds no mutable state. A raffle's status lives in its
//! persisted row, and the row can change between the moment a caller reads
//! it and the moment it writes. The functions here only answer "is this
//! transition legal from that status"; the caller then performs the write as
//! a conditional update keyed on the status it validated against, so a
//! concurrent writer turns the second write into a no-op instead of a
//! corrupted row.

pub mod raffle;

pub use raffle::{
    can_accept_entries, can_select_winner, validate_transition, RaffleStatus, SelectionMethod,
    StateError, TransitionRecord,
};
