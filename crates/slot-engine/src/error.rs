//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    /// Caller-supplied query input was rejected (non-positive duration, bad date).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    #[error("Invalid availability rule: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A collaborator health check failed while constructing the service.
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// A rule or occupied-interval fetch failed. Never retried.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Failure reported by an external data source (rule store, occupied-interval source).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{collaborator} failed: {message}")]
pub struct CollaboratorError {
    /// Which collaborator failed, e.g. `"availability rule store"`.
    pub collaborator: String,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SlotError>;
