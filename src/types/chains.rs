//! # Chain Type Definitions
//!
//! This module defines types related to filter chains and their configuration.

use crate::error::{ChainError, ChainResult};
use crate::types::buckets::BucketBrigade;
use crate::types::filters::FilterStatus;
use serde::{Deserialize, Serialize};

/// Filter chain configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Chain name, used in logs
    pub name: String,
    /// Maximum number of filters in the chain
    pub max_filters: usize,
    /// Number of bytes a filtered reader pulls from its source per pass
    pub chunk_size: usize,
    /// Fail a pass when any filter reports more consumed bytes than its
    /// input brigade held
    pub verify_consumed: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: "default_chain".to_string(),
            max_filters: 100,
            chunk_size: 8192,
            verify_consumed: true,
        }
    }
}

impl ChainConfig {
    /// Create a new configuration with default values
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ChainResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ChainError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum number of filters
    pub fn with_max_filters(mut self, max_filters: usize) -> Self {
        self.max_filters = max_filters;
        self
    }

    /// Set the reader chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enable or disable the consumed-bytes check
    pub fn with_verify_consumed(mut self, verify_consumed: bool) -> Self {
        self.verify_consumed = verify_consumed;
        self
    }

    /// Check the configuration for values a chain cannot run with
    pub fn validate(&self) -> ChainResult<()> {
        if self.max_filters == 0 {
            return Err(ChainError::InvalidConfig {
                reason: "max_filters must be at least 1".to_string(),
            });
        }
        if self.chunk_size == 0 {
            return Err(ChainError::InvalidConfig {
                reason: "chunk_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Lifecycle of a filter attached to a chain. A filter whose `on_create`
/// refused never joins the chain, so tracking starts at `Attached`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterLifecycle {
    /// `on_create` succeeded
    Attached,
    /// Last pass was a normal or incremental-flush pass
    Filtering,
    /// Last pass was the closing pass
    Flushing,
    /// `on_close` ran; terminal
    Closed,
}

/// Outcome of one pass through a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassResult {
    /// Status of the last filter that ran
    pub status: FilterStatus,
    /// Bytes the head filter reported as consumed
    pub consumed: usize,
    /// Buckets produced by the tail filter
    pub output: BucketBrigade,
}

impl PassResult {
    /// Whether the pass produced output downstream
    pub fn is_pass_on(&self) -> bool {
        self.status == FilterStatus::PassOn
    }

    /// Concatenate the output buckets
    pub fn into_bytes(self) -> Vec<u8> {
        self.output.into_bytes()
    }
}
