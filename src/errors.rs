//! Error types for the registry subsystem.
//!
//! Two classes of failure exist. Configuration errors (missing required
//! field, step-order collision, unresolvable type reference, malformed
//! identifier) are fatal and abort the registration call. Everything else —
//! duplicate names, deferred test linkage, prerequisite names that have not
//! been declared yet — is a recoverable condition logged via `tracing` while
//! the operation proceeds.

use thiserror::Error;

/// Errors raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A required metadata field is absent for the registration being made
    #[error("Missing required field '{field}' on component '{component}'")]
    MissingRequiredField { component: String, field: String },

    /// Registration conflict that indicates an authored mistake
    #[error("Registration conflict: {key}, reason: {reason}")]
    Conflict { key: String, reason: String },

    /// A string lookup was attempted against a collaborator that is not declared
    #[error("Unresolved {kind} reference '{name}'")]
    UnresolvedReference { kind: String, name: String },

    /// An identifier does not match its required format
    #[error("Invalid identifier '{id}': {reason}")]
    InvalidIdentifier { id: String, reason: String },

    /// Invalid pattern syntax in a pattern-based query
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A cross-context expectation failed relationship validation
    #[error(
        "Context violation on expectation '{expectation_id}' between '{expecting}' and '{providing}': {reason}"
    )]
    ContextViolation {
        expectation_id: String,
        expecting: String,
        providing: String,
        reason: String,
    },

    /// A registry lock was poisoned by a panicking writer
    #[error("Thread safety error during {operation}: lock poisoned")]
    LockPoisoned { operation: String },
}

pub type RegistryResult<T> = anyhow::Result<T, RegistryError>;
