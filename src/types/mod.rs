//! # Type Definitions
//!
//! This module contains all the type definitions used throughout the stream filter SDK.

pub mod buckets;
pub mod chains;
pub mod filters;

// Re-export main types
pub use buckets::*;
pub use chains::*;
pub use filters::*;
