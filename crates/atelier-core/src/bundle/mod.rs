//! Addon bundles: resolution for a project and variant, and validation

pub mod check;
pub mod resolver;
pub mod version;

pub use check::{BundleIssue, CheckBundleResponse, IssueSeverity, check_bundle};
pub use resolver::{ActiveVersions, BundleResolver, ResolvedBundle};
pub use version::{Version, is_compatible};

// vim: ts=4
