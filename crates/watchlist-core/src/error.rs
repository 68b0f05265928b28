//! Store and validation errors
//!
//! `StoreError` covers the synchronous failures of store operations.
//! `ValidationError` describes why a snapshot, item or patch was rejected
//! and names the offending location (e.g. `watched[2].score`).
//! Persistence failures live in [`crate::storage::StorageError`].

use thiserror::Error;

use crate::models::{Category, ItemId};

/// Why a snapshot or item failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input is not parseable JSON at all
    #[error("Invalid JSON: {0}")]
    Syntax(String),

    /// Top level is not an object
    #[error("Snapshot must be a JSON object")]
    NotAnObject,

    /// A required category key is absent
    #[error("{0}: missing category")]
    MissingCategory(String),

    /// A top-level key that is not one of the four categories
    #[error("{0}: unknown category")]
    UnknownCategory(String),

    /// A category value is not a list
    #[error("{0}: expected a list of items")]
    NotAList(String),

    /// An item is not an object
    #[error("{0}: expected an item object")]
    NotAnItem(String),

    /// A required item field is absent
    #[error("{path}: missing field '{field}'")]
    MissingField { path: String, field: &'static str },

    /// A field has the wrong JSON type
    #[error("{path}: expected {expected}")]
    WrongType { path: String, expected: &'static str },

    /// Title is empty or whitespace
    #[error("{path}: title must not be empty")]
    EmptyTitle { path: String },

    /// `type` is not "movie" or "tv"
    #[error("{path}: invalid type '{found}' (expected \"movie\" or \"tv\")")]
    InvalidKind { path: String, found: String },

    /// Score outside [1, 10]
    #[error("{path}: score {found} out of range (expected 1-10)")]
    ScoreOutOfRange { path: String, found: i64 },

    /// The same ID appears more than once in the snapshot
    #[error("{path}: duplicate id '{id}'")]
    DuplicateId { path: String, id: String },
}

impl ValidationError {
    /// Re-root a field-level error under an item path like `watched[0]`
    pub(crate) fn at(self, prefix: &str) -> Self {
        let join = |path: String| format!("{}.{}", prefix, path);
        match self {
            ValidationError::EmptyTitle { path } => ValidationError::EmptyTitle { path: join(path) },
            ValidationError::InvalidKind { path, found } => ValidationError::InvalidKind {
                path: join(path),
                found,
            },
            ValidationError::ScoreOutOfRange { path, found } => {
                ValidationError::ScoreOutOfRange {
                    path: join(path),
                    found,
                }
            }
            other => other,
        }
    }
}

/// Errors returned by `CategoryStore` operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `add` with an ID that already exists somewhere in the store
    #[error("Item '{id}' already exists in {existing}")]
    DuplicateId { id: ItemId, existing: Category },

    /// `update` targeting an item that is not in the given category
    #[error("Item '{id}' not found in {category}")]
    NotFound { id: ItemId, category: Category },

    /// Input does not satisfy the data model
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_names_path() {
        let err = ValidationError::ScoreOutOfRange {
            path: "watched[2].score".to_string(),
            found: 11,
        };
        let msg = err.to_string();
        assert!(msg.contains("watched[2].score"));
        assert!(msg.contains("11"));
    }

    #[test]
    fn test_at_prefixes_field_errors() {
        let err = ValidationError::EmptyTitle {
            path: "title".to_string(),
        }
        .at("dropped[0]");
        assert_eq!(
            err,
            ValidationError::EmptyTitle {
                path: "dropped[0].title".to_string()
            }
        );

        // Structural errors keep their own path
        let err = ValidationError::MissingCategory("dropped".to_string()).at("x");
        assert_eq!(err, ValidationError::MissingCategory("dropped".to_string()));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound {
            id: ItemId::from("missing"),
            category: Category::Watched,
        };
        assert_eq!(err.to_string(), "Item 'missing' not found in watched");

        let err: StoreError = ValidationError::NotAnObject.into();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
