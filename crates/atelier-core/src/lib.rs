//! Access control and settings resolution core for Atelier.
//!
//! Merges access group permission sets into effective per-project
//! permissions, picks the addon bundle for a project and variant, and layers
//! addon settings overrides (studio, project, project site) on top of addon
//! defaults. Persistence is reached only through the store traits of
//! `atelier-types`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod access;
pub mod addons;
pub mod app;
pub mod bundle;
pub mod config;
pub mod prelude;
pub mod settings;

pub use access::{AccessControl, AccessGroupRegistry, Category, PermissionSet};
pub use addons::{AddonLibrary, AddonLibraryBuilder};
pub use app::{Core, CoreBuilder, CoreState};
pub use bundle::{BundleResolver, ResolvedBundle};
pub use config::CoreOpts;
pub use settings::{SettingsQuery, SettingsResolver};

// vim: ts=4
