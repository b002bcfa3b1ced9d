//! # Filter API
//!
//! This module provides the filter manager: a registry plus chain defaults,
//! used to build chains by filter name and to filter whole payloads.

use crate::error::{FilterError, FilterResult};
use crate::filter::chain::FilterChain;
use crate::filter::default::StreamFilter;
use crate::filter::registry::FilterRegistry;
use crate::types::buckets::BucketBrigade;
use crate::types::chains::ChainConfig;
use crate::types::filters::{FilterConfig, FlushMode, StreamHandle, StreamMode};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tracing::info;

/// Filter manager configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterManagerConfig {
    /// Defaults for every chain the manager builds
    pub chain: ChainConfig,
    /// Log every processed payload
    pub debug: bool,
}

impl FilterManagerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> FilterResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.chain.validate()?;
        Ok(config)
    }

    /// Set the chain defaults
    pub fn with_chain(mut self, chain: ChainConfig) -> Self {
        self.chain = chain;
        self
    }

    /// Enable debug logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Filter manager for building chains by name
#[derive(Debug)]
pub struct FilterManager {
    config: FilterManagerConfig,
    registry: Arc<RwLock<FilterRegistry>>,
    next_stream_id: AtomicU64,
}

impl FilterManager {
    /// Create a new filter manager with the stock filters registered
    pub fn new() -> Self {
        Self {
            config: FilterManagerConfig::default(),
            registry: Arc::new(RwLock::new(FilterRegistry::with_builtins())),
            next_stream_id: AtomicU64::new(1),
        }
    }

    /// Create a new filter manager with custom configuration
    pub fn with_config(config: FilterManagerConfig) -> FilterResult<Self> {
        config.chain.validate()?;

        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Manager configuration
    pub fn config(&self) -> &FilterManagerConfig {
        &self.config
    }

    /// Read access to the registry
    pub fn registry(&self) -> FilterResult<RwLockReadGuard<'_, FilterRegistry>> {
        self.registry
            .read()
            .map_err(|_| FilterError::Internal("filter registry lock poisoned".to_string()))
    }

    /// Register a filter factory
    pub fn register<F>(&self, name: &str, factory: F) -> FilterResult<()>
    where
        F: Fn() -> Box<dyn StreamFilter> + Send + Sync + 'static,
    {
        self.registry
            .write()
            .map_err(|_| FilterError::Internal("filter registry lock poisoned".to_string()))?
            .register(name, factory)
    }

    /// Build a chain attached to a new stream handle, with `filters`
    /// appended in order
    pub fn create_chain(
        &self,
        label: &str,
        mode: StreamMode,
        filters: &[FilterConfig],
    ) -> FilterResult<FilterChain> {
        let id = self.next_stream_id.fetch_add(1, Ordering::Relaxed);
        let mut chain = FilterChain::new(self.config.chain.clone(), StreamHandle::new(id, label, mode))?;

        let registry = self.registry()?;
        for filter in filters {
            chain.append_by_name(&registry, filter)?;
        }
        Ok(chain)
    }

    /// Filter a whole payload: one regular pass, then the closing pass.
    ///
    /// The chain runs on a blocking worker thread.
    pub async fn process(&self, filters: &[FilterConfig], data: Vec<u8>) -> FilterResult<Vec<u8>> {
        let mut chain = self.create_chain("memory", StreamMode::Write, filters)?;
        let input_len = data.len();

        let output = tokio::task::spawn_blocking(move || -> FilterResult<Vec<u8>> {
            let mut output = chain
                .run(BucketBrigade::from_bytes(data), FlushMode::Normal)?
                .into_bytes();
            output.extend(chain.close()?);
            Ok(output)
        })
        .await
        .map_err(|e| FilterError::Internal(format!("filter task failed: {e}")))??;

        if self.config.debug {
            info!(
                filters = filters.len(),
                input = input_len,
                output = output.len(),
                "processed payload"
            );
        }
        Ok(output)
    }
}

impl Default for FilterManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new filter manager
pub fn create_filter_manager() -> FilterManager {
    FilterManager::new()
}

/// Create a new filter manager with configuration
pub fn create_filter_manager_with_config(config: FilterManagerConfig) -> FilterResult<FilterManager> {
    FilterManager::with_config(config)
}
