//! # Filter Type Definitions
//!
//! This module defines the status and flush-mode codes exchanged between a
//! filter and its chain, plus the per-filter state every filter carries.

use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Filter status returned from every filter pass.
///
/// The discriminants are the classic stream-filter status codes and must not
/// change: chains and foreign callers compare them as integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum FilterStatus {
    /// The filter experienced an unrecoverable error and cannot continue
    FatalError = 0,
    /// Processed successfully, but no data is available to return yet.
    /// More data is required from the stream or prior filter.
    FeedMe = 1,
    /// Processed successfully with data available in the out brigade
    PassOn = 2,
}

impl From<FilterStatus> for i32 {
    fn from(status: FilterStatus) -> Self {
        status as i32
    }
}

impl TryFrom<i32> for FilterStatus {
    type Error = FilterError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FilterStatus::FatalError),
            1 => Ok(FilterStatus::FeedMe),
            2 => Ok(FilterStatus::PassOn),
            other => Err(FilterError::InvalidCode {
                kind: "status",
                code: other,
            }),
        }
    }
}

/// Why a filter pass was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum FlushMode {
    /// Regular read/write
    #[default]
    Normal = 0,
    /// An incremental flush
    FlushInc = 1,
    /// Final flush prior to closing
    FlushClose = 2,
}

impl FlushMode {
    /// Whether filters see `closing = true` for this pass
    pub fn is_closing(self) -> bool {
        self == FlushMode::FlushClose
    }
}

impl From<FlushMode> for i32 {
    fn from(mode: FlushMode) -> Self {
        mode as i32
    }
}

impl TryFrom<i32> for FlushMode {
    type Error = FilterError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FlushMode::Normal),
            1 => Ok(FlushMode::FlushInc),
            2 => Ok(FlushMode::FlushClose),
            other => Err(FilterError::InvalidCode {
                kind: "flush mode",
                code: other,
            }),
        }
    }
}

/// Direction of the stream a chain is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamMode {
    Read,
    Write,
}

/// Description of the stream a filter is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamHandle {
    id: u64,
    label: Arc<str>,
    mode: StreamMode,
}

impl StreamHandle {
    /// Create a new stream handle
    pub fn new(id: u64, label: &str, mode: StreamMode) -> Self {
        Self {
            id,
            label: Arc::from(label),
            mode,
        }
    }

    /// Numeric stream id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Human-readable label, typically a path or URI
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stream direction
    pub fn mode(&self) -> StreamMode {
        self.mode
    }
}

/// State shared by every filter: its name, its parameters and, during a
/// non-closing pass, the stream being filtered.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    name: String,
    parameters: Value,
    stream: Option<StreamHandle>,
}

impl FilterState {
    /// Create an empty state: no name, `Null` parameters, no stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the filter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the filter name, returning the previous one
    pub fn set_name(&mut self, name: String) -> String {
        std::mem::replace(&mut self.name, name)
    }

    /// Get the filter parameters
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Set the filter parameters, returning the previous value
    pub fn set_parameters(&mut self, parameters: Value) -> Value {
        std::mem::replace(&mut self.parameters, parameters)
    }

    /// Get the stream being filtered, if a pass is in progress
    pub fn stream(&self) -> Option<&StreamHandle> {
        self.stream.as_ref()
    }

    /// Attach or detach the stream. Only chains should call this.
    pub(crate) fn set_stream(&mut self, stream: Option<StreamHandle>) {
        self.stream = stream;
    }
}

/// Filter configuration used to attach a filter by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Registered filter name
    pub name: String,
    /// Filter-specific parameters, passed through untouched
    #[serde(default)]
    pub parameters: Value,
}

impl FilterConfig {
    /// Create a new filter configuration without parameters
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: Value::Null,
        }
    }

    /// Set the filter parameters
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        assert_eq!(i32::from(FilterStatus::FatalError), 0);
        assert_eq!(i32::from(FilterStatus::FeedMe), 1);
        assert_eq!(i32::from(FilterStatus::PassOn), 2);
        assert_eq!(FilterStatus::try_from(2).unwrap(), FilterStatus::PassOn);
        assert!(FilterStatus::try_from(3).is_err());
        assert!(FilterStatus::try_from(-1).is_err());
    }

    #[test]
    fn test_flush_modes() {
        assert_eq!(FlushMode::default(), FlushMode::Normal);
        assert_eq!(FlushMode::try_from(1).unwrap(), FlushMode::FlushInc);
        assert!(FlushMode::FlushClose.is_closing());
        assert!(!FlushMode::FlushInc.is_closing());
        assert!(!FlushMode::Normal.is_closing());
    }

    #[test]
    fn test_filter_config_deserialize_without_parameters() {
        let config: FilterConfig = serde_json::from_value(json!({ "name": "string.rot13" })).unwrap();
        assert_eq!(config, FilterConfig::new("string.rot13"));
    }
}
