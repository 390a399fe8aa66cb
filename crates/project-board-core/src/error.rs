//! Error taxonomy for the board engine.
//!
//! Only conditions a caller can act on get their own variant. Everything the
//! store reports that is not "row not found" travels as [`BoardError::Storage`]
//! and is fatal for the request.

use thiserror::Error;

/// Errors surfaced by the content services.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The referenced entity does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// An entity with the same natural key already exists.
    #[error("{entity} already exists: {key}")]
    Conflict { entity: &'static str, key: String },

    /// A domain field failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The backing store failed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl BoardError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, key: impl ToString) -> Self {
        Self::Conflict {
            entity,
            key: key.to_string(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Recover a domain error a store raised through `anyhow`, such as a
    /// key collision detected by the insert itself. Anything else is
    /// [`BoardError::Storage`].
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast::<BoardError>() {
            Ok(domain) => domain,
            Err(other) => Self::Storage(other),
        }
    }
}

pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = BoardError::not_found("article", 42);
        assert_eq!(err.to_string(), "article not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_storage_is_transparent() {
        let err: BoardError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_from_store_recovers_conflict() {
        let raised: anyhow::Error = BoardError::conflict("account", "uno").into();
        let err = BoardError::from_store(raised.context("insert failed"));
        assert!(matches!(err, BoardError::Conflict { entity: "account", .. }));

        let err = BoardError::from_store(anyhow::anyhow!("disk full"));
        assert!(matches!(err, BoardError::Storage(_)));
    }
}
