//! Error taxonomy for the classification pipeline.
//!
//! Out-of-scope combinations are not errors: they travel as data through
//! [`crate::GrcValue::OutOfScope`] and the `within_scope` flags.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoraError {
    /// Unrecognized value or a combination the active tables have no cell for.
    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: String },

    /// Reference tables that are malformed or inconsistent.
    #[error("reference tables rejected: {}", .0.join("; "))]
    InvalidTables(Vec<String>),
}

impl SoraError {
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SoraError>;
