//! Domain error types.
//!
//! Eligibility denials and form validation messages are not errors; they
//! are returned as values. These variants cover malformed records only.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Required registration settings field \"{0}\" is empty.")]
    MissingHostField(&'static str),

    #[error("A registration must reserve at least one space")]
    InvalidSpaces,

    #[error("A registrant must be exactly one of a user account or an email address")]
    InvalidRegistrant,

    #[error("Unknown registration state \"{0}\"")]
    UnknownState(String),

    #[error("State \"{state}\" does not belong to workflow \"{workflow}\"")]
    StateNotInWorkflow { state: String, workflow: String },

    #[error("Unknown host entity type \"{0}\"")]
    UnknownHostKind(String),

    #[error("Unknown registration setting \"{0}\"")]
    UnknownSetting(String),
}
