//! # raffle-engine — Raffle Lifecycle Engine
//!
//! Admission control, winner selection and lifecycle transitions over the
//! repository contracts in `raffle-store`.
//!
//! ## Components
//!
//! | Module          | Responsibility |
//! |-----------------|----------------|
//! | [`admission`]   | Ordered entry checks, then an atomic unique insert |
//! | [`selection`]   | Uniform or number-matched draw, then an exactly-once commit |
//! | [`lifecycle`]   | Creation, edits, activation and cancellation |
//! | [`entropy`]     | Injectable randomness for the draw |
//! | [`lottery`]     | External draw collaborator contract |
//! | [`service`]     | [`RaffleService`] facade exposing every operation |
//!
//! ## Concurrency
//!
//! Components hold no locks and no mutable state. Any number of calls may
//! run against the same raffle; correctness comes from the conditional
//! writes the repositories guarantee. The engine never retries: a lost race
//! surfaces as a typed error and the caller decides what to do.

pub mod admission;
pub mod entropy;
pub mod error;
pub mod lifecycle;
pub mod lottery;
pub mod selection;
pub mod service;

pub use admission::AdmissionController;
pub use entropy::{EntropySource, FixedEntropy, OsEntropy, SeededEntropy};
pub use error::{ErrorKind, RaffleError};
pub use lifecycle::{CreateRaffle, RaffleLifecycle, RaffleUpdate, LINK_LENGTH};
pub use lottery::{LotteryDraw, NoLotteryDraw};
pub use selection::WinnerSelector;
pub use service::{CreateUser, RaffleService};
