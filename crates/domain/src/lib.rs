//! Domain layer for the registration backend.
//!
//! This crate contains:
//! - Domain models (hosts, registration settings, registrations, workflows, accounts)
//! - Business logic services (host wrapper, eligibility, register form, access checks)
//! - Domain error types
//!
//! Everything here is synchronous and computed over snapshots supplied by
//! the caller; loading and saving belong to the persistence crate.

pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
