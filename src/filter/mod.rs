//! # Filter Module
//!
//! This module provides the filter contract, the chain that drives it, and
//! the stream adapters and stock filters built on top.

pub mod api;
pub mod builtin;
pub mod chain;
pub mod default;
pub mod registry;
pub mod stream;

// Re-export main types
pub use api::{
    create_filter_manager, create_filter_manager_with_config, FilterManager, FilterManagerConfig,
};
pub use builtin::{AccumulateFilter, Rot13Filter, ToLowerFilter, ToUpperFilter};
pub use chain::FilterChain;
pub use default::{pass_through, PassThroughFilter, StreamFilter};
pub use registry::{FilterFactory, FilterRegistry};
pub use stream::{FilteredReader, FilteredWriter};
