//! Core error types.

use crate::catalog::LifecycleState;
use crate::meta::EntityKind;
use thiserror::Error;

/// Result alias used throughout metacat.
pub type Result<T> = std::result::Result<T, Error>;

/// Core metacat errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field was not set when building an entity.
    #[error("validation error: {kind} is missing required field `{field}`")]
    Validation {
        kind: EntityKind,
        field: &'static str,
    },

    /// An argument was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An entity could not be encoded. No bytes were produced.
    #[error("serialization error for {kind}: {message}")]
    Serialization { kind: EntityKind, message: String },

    /// Stored bytes could not be decoded into the expected kind.
    #[error("deserialization error for {kind}: {message}")]
    Deserialization { kind: EntityKind, message: String },

    /// The bytes hold a different entity kind than the one requested.
    #[error("deserialization error: expected {expected}, found {actual}")]
    KindMismatch {
        expected: EntityKind,
        actual: EntityKind,
    },

    /// The record was written by an entity-model revision this build does not know.
    #[error("unsupported schema version {major}.{minor}")]
    UnsupportedVersion { major: u32, minor: u32 },

    /// Configuration is invalid or names something that is not registered.
    #[error("configuration error: {0}")]
    Config(String),

    /// A catalog operation was invoked in the wrong lifecycle state.
    #[error("cannot {operation}: catalog is {state}")]
    State {
        operation: &'static str,
        state: LifecycleState,
    },

    /// The provider does not implement the requested capability.
    #[error("provider `{provider}` does not support {capability}")]
    Unsupported {
        provider: String,
        capability: &'static str,
    },

    /// The backend failed at runtime.
    #[error("backend error in provider `{provider}`: {message}")]
    Backend { provider: String, message: String },

    /// Underlying key/value store error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// The addressed entity does not exist.
    #[error("{kind} `{name}` not found")]
    NotFound { kind: EntityKind, name: String },

    /// An entity with the same name already exists.
    #[error("{kind} `{name}` already exists")]
    AlreadyExists { kind: EntityKind, name: String },

    /// The entity still contains children.
    #[error("{kind} `{name}` is not empty")]
    NonEmpty { kind: EntityKind, name: String },
}

impl Error {
    /// Create a validation error.
    pub fn validation(kind: EntityKind, field: &'static str) -> Self {
        Error::Validation { kind, field }
    }

    /// Create a serialization error.
    pub fn serialization(kind: EntityKind, message: impl Into<String>) -> Self {
        Error::Serialization {
            kind,
            message: message.into(),
        }
    }

    /// Create a deserialization error.
    pub fn deserialization(kind: EntityKind, message: impl Into<String>) -> Self {
        Error::Deserialization {
            kind,
            message: message.into(),
        }
    }

    /// Create a backend error.
    pub fn backend(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Backend {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised while decoding stored bytes.
    pub fn is_deserialization(&self) -> bool {
        matches!(
            self,
            Error::Deserialization { .. }
                | Error::KindMismatch { .. }
                | Error::UnsupportedVersion { .. }
        )
    }

    /// Whether this error reports a lifecycle violation.
    pub fn is_state(&self) -> bool {
        matches!(self, Error::State { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = Error::validation(EntityKind::Metalake, "version");
        assert_eq!(
            err.to_string(),
            "validation error: metalake is missing required field `version`"
        );

        let err = Error::KindMismatch {
            expected: EntityKind::Schema,
            actual: EntityKind::Table,
        };
        assert_eq!(
            err.to_string(),
            "deserialization error: expected schema, found table"
        );
        assert!(err.is_deserialization());
    }

    #[test]
    fn test_state_error() {
        let err = Error::State {
            operation: "list_schemas",
            state: LifecycleState::Closed,
        };
        assert!(err.is_state());
        assert!(!err.is_deserialization());
        assert_eq!(err.to_string(), "cannot list_schemas: catalog is closed");
    }
}
