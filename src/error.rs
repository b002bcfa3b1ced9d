//! # Error Types
//!
//! This module defines the error types for filter registration, chain
//! driving and stream adaptation.

use thiserror::Error;

/// Main error type for filter operations
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Filter not found: {name}")]
    NotFound { name: String },

    #[error("Filter already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Invalid filter configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid {kind} code: {code}")]
    InvalidCode { kind: &'static str, code: i32 },

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Chain-specific errors
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Too many filters: {count} > {max}")]
    TooManyFilters { count: usize, max: usize },

    #[error("Filter {filter} refused to attach")]
    CreateFailed { filter: String },

    #[error("Filter not attached: {filter}")]
    NotAttached { filter: String },

    #[error("Filter {filter} failed with a fatal status")]
    Fatal { filter: String },

    #[error("Filter {filter} consumed {consumed} bytes but only {available} were available")]
    ConsumedOverflow {
        filter: String,
        consumed: usize,
        available: usize,
    },

    #[error("Chain is closed: {chain}")]
    Closed { chain: String },

    #[error("Invalid chain configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Registry lookup failed: {reason}")]
    Registry { reason: String },
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Result type for chain operations
pub type ChainResult<T> = Result<T, ChainError>;

impl From<FilterError> for std::io::Error {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::Io(io_err) => io_err,
            _ => std::io::Error::new(std::io::ErrorKind::Other, err),
        }
    }
}

impl From<ChainError> for std::io::Error {
    fn from(err: ChainError) -> Self {
        let kind = match err {
            ChainError::Closed { .. } => std::io::ErrorKind::BrokenPipe,
            ChainError::Fatal { .. } | ChainError::ConsumedOverflow { .. } => {
                std::io::ErrorKind::InvalidData
            }
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}
