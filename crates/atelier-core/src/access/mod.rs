//! Access group permissions: typed permission sets, merging, and the registry

pub mod merge;
pub mod permissions;
pub mod registry;
pub mod service;

pub use merge::combine;
pub use permissions::{
	AttributeAccessList, AttributeLimit, Category, EndpointsAccessList, FolderAccess,
	FolderAccessList, FolderAccessType, Gate, PermissionCategory, PermissionSet, SettingsAccess,
};
pub use registry::AccessGroupRegistry;
pub use service::AccessControl;

// vim: ts=4
