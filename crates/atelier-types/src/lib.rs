//! Shared types, storage adapter traits, and core utilities for Atelier.
//!
//! This crate contains the foundational types shared between the core crate
//! and every storage adapter implementation, so adapters can be built without
//! pulling in the resolution logic.

#![forbid(unsafe_code)]

pub mod access_store;
pub mod addon;
pub mod bundle_store;
pub mod error;
pub mod prelude;
pub mod settings_store;
pub mod types;

// vim: ts=4
