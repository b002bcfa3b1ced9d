//! # Stream Filter SDK for Rust
//!
//! Bucket-brigade stream filters: a filter contract with a pass-through
//! default, the chain that drives it, and adapters that attach chains to
//! `std::io` readers and writers.
//!
//! ## Features
//!
//! - **Filter contract**: implement [`StreamFilter`] and override `filter` only
//! - **Fixed status codes**: [`FilterStatus`] and [`FlushMode`] carry the classic stream-filter values
//! - **Chains**: [`FilterChain`] with lifecycle enforcement and consumed-byte accounting
//! - **Streams**: [`FilteredReader`] and [`FilteredWriter`] over any `Read`/`Write`
//! - **Registry**: attach filters by name, with `prefix.*` wildcards
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Write;
//! use stream_filter_sdk::{
//!     ChainConfig, FilterChain, FilterConfig, FilterRegistry, FilteredWriter, StreamHandle,
//!     StreamMode,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = FilterRegistry::with_builtins();
//!     let mut chain = FilterChain::new(
//!         ChainConfig::new("quickstart"),
//!         StreamHandle::new(1, "memory", StreamMode::Write),
//!     )?;
//!     chain.append_by_name(&registry, &FilterConfig::new("string.toupper"))?;
//!
//!     let mut writer = FilteredWriter::new(Vec::new(), chain);
//!     writer.write_all(b"hello")?;
//!     let sink = writer.finish()?;
//!     assert_eq!(sink, b"HELLO");
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;
pub mod filter;
pub mod types;

// Test modules (only included in test configuration)
#[cfg(test)]
pub mod __tests__;

// Re-export main types for convenience
pub use filter::{
    api::{FilterManager, FilterManagerConfig},
    builtin::{AccumulateFilter, Rot13Filter, ToLowerFilter, ToUpperFilter},
    chain::FilterChain,
    default::{pass_through, PassThroughFilter, StreamFilter},
    registry::{FilterFactory, FilterRegistry},
    stream::{FilteredReader, FilteredWriter},
};

pub use types::{
    buckets::{Bucket, BucketBrigade},
    chains::{ChainConfig, FilterLifecycle, PassResult},
    filters::{FilterConfig, FilterState, FilterStatus, FlushMode, StreamHandle, StreamMode},
};

// Re-export error types
pub use crate::error::{ChainError, ChainResult, FilterError, FilterResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the SDK with default configuration
///
/// This function should be called once at the start of your application
/// to initialize logging and other global state.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with_config(InitConfig::default())
}

/// Initialize the SDK with custom configuration
pub fn init_with_config(config: InitConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter)
        .with_target(config.with_target)
        .try_init()?;

    tracing::info!("{} v{} initialized", NAME, VERSION);
    Ok(())
}

/// SDK initialization configuration
#[derive(Debug)]
pub struct InitConfig {
    /// Log filter configuration
    pub log_filter: tracing_subscriber::EnvFilter,
    /// Include the module path in log lines
    pub with_target: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            log_filter: tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            with_target: true,
        }
    }
}
