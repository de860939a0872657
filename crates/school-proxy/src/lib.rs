//! Substitute-teacher cover for school administration.
//!
//! [`substitution`] holds the availability evaluator and the day auto-assigner together with
//! the store contracts they read through; [`roster`] imports school data from CSV exports.

pub mod config;
pub mod error;
pub mod roster;
pub mod substitution;
pub mod telemetry;
