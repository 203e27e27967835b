//! # Route Modules
//!
//! One module per resource. Each exposes a `router()` merged by
//! [`crate::app`].

pub mod participations;
pub mod raffles;
pub mod users;
