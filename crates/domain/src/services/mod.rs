//! Domain services for registrations.
//!
//! Services are synchronous and operate on snapshots loaded by the caller.

pub mod access;
pub mod blocks;
pub mod clock;
pub mod eligibility;
pub mod host_entity;
pub mod manage;
pub mod registration_form;
pub mod routes;
pub mod schedule;

pub use access::{AccessResult, ContentPermissionAccess, HostAccess};
pub use clock::{Clock, FixedClock, SystemClock};
pub use eligibility::{DenialReason, Eligibility};
pub use host_entity::HostEntity;
pub use registration_form::{FormContext, FormError, FormSubmission, RegisterForm, SaveOutcome};
