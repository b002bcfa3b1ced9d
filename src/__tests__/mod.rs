//! # Test Modules
//!
//! This module contains individual component tests for the stream filter SDK.

pub mod chain_lifecycle_test;
