//! Addon settings: override merging and layered resolution

pub mod overrides;
pub mod resolver;

pub use overrides::{apply_overrides, extract_overrides, list_overrides};
pub use resolver::{AddonSettings, AllSettings, ResolvedSettings, SettingsQuery, SettingsResolver};

// vim: ts=4
