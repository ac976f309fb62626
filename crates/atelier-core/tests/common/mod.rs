//! Common test utilities and helpers
//!
//! Shared infrastructure for the integration tests: an in-memory store
//! adapter implementing every store trait, and fixtures building a small
//! studio (addons, bundles, projects, access groups).

#![allow(dead_code)]

pub mod adapters;
pub mod fixtures;

pub use adapters::*;
pub use fixtures::*;

// vim: ts=4
