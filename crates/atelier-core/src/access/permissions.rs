//! Permission set of one access group
//!
//! A permission set is a fixed, closed collection of categories. Every
//! category carries an `enabled` flag whose meaning depends on the category:
//!
//! - **Restriction** categories (folder access lists, attribute lists,
//!   endpoints): `enabled=false` applies no filtering, `enabled=true` allows
//!   only the listed values.
//! - **Grant** categories (studio settings, project settings, publish):
//!   `enabled=false` denies, `enabled=true` grants (limited to the listed
//!   addons for the settings categories).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::prelude::*;

/// Attributes every user may read regardless of `attrib_read`
pub const ATTRIB_READ_WHITELIST: &[&str] = &["fullName", "avatarUrl"];

/// Closed enumeration of permission categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Create,
	Read,
	Update,
	Delete,
	AttribRead,
	AttribWrite,
	Endpoints,
	StudioSettings,
	ProjectSettings,
	Publish,
}

impl Category {
	pub const ALL: [Category; 10] = [
		Category::Create,
		Category::Read,
		Category::Update,
		Category::Delete,
		Category::AttribRead,
		Category::AttribWrite,
		Category::Endpoints,
		Category::StudioSettings,
		Category::ProjectSettings,
		Category::Publish,
	];

	pub fn name(self) -> &'static str {
		match self {
			Category::Create => "create",
			Category::Read => "read",
			Category::Update => "update",
			Category::Delete => "delete",
			Category::AttribRead => "attrib_read",
			Category::AttribWrite => "attrib_write",
			Category::Endpoints => "endpoints",
			Category::StudioSettings => "studio_settings",
			Category::ProjectSettings => "project_settings",
			Category::Publish => "publish",
		}
	}
}

impl std::fmt::Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// Behaviour shared by every category value.
///
/// A disabled category never carries values, so `Default` is the one
/// disabled state.
pub trait PermissionCategory: Default {
	fn is_enabled(&self) -> bool;

	/// Adds the values of another enabled category of the same kind
	fn union(&mut self, other: &Self);

	/// Drops values a disabled category may still carry from storage
	fn normalize(&mut self) {
		if !self.is_enabled() {
			*self = Self::default();
		}
	}
}

// Gate //
//******//
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gate {
	pub enabled: bool,
}

impl PermissionCategory for Gate {
	fn is_enabled(&self) -> bool {
		self.enabled
	}

	fn union(&mut self, _other: &Self) {}
}

// Folder access //
//***************//
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FolderAccessType {
	/// Folders with tasks assigned to the user
	#[default]
	Assigned,
	/// The folder and all of its descendants
	Hierarchy,
	/// Descendants of the folder only
	Children,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderAccess {
	pub access_type: FolderAccessType,
	pub path: Box<str>,
}

impl FolderAccess {
	pub fn new(access_type: FolderAccessType, path: &str) -> Self {
		Self { access_type, path: path.into() }
	}

	/// Whether a folder path is covered by this entry.
	///
	/// `Assigned` entries depend on task assignments and never match here.
	pub fn matches(&self, folder_path: &str) -> bool {
		let root = self.path.trim_matches('/');
		let path = folder_path.trim_matches('/');
		match self.access_type {
			FolderAccessType::Assigned => false,
			FolderAccessType::Hierarchy => path == root || is_descendant(path, root),
			FolderAccessType::Children => is_descendant(path, root),
		}
	}
}

fn is_descendant(path: &str, root: &str) -> bool {
	if root.is_empty() {
		return !path.is_empty();
	}
	path.strip_prefix(root).is_some_and(|rest| rest.starts_with('/'))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderAccessList {
	pub enabled: bool,
	pub access_list: BTreeSet<FolderAccess>,
}

impl FolderAccessList {
	pub fn restricted(access_list: impl IntoIterator<Item = FolderAccess>) -> Self {
		Self { enabled: true, access_list: access_list.into_iter().collect() }
	}

	pub fn allows_path(&self, folder_path: &str) -> bool {
		!self.enabled || self.access_list.iter().any(|access| access.matches(folder_path))
	}
}

impl PermissionCategory for FolderAccessList {
	fn is_enabled(&self) -> bool {
		self.enabled
	}

	fn union(&mut self, other: &Self) {
		self.access_list.extend(other.access_list.iter().cloned());
	}
}

// Attributes //
//************//
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeAccessList {
	pub enabled: bool,
	pub attributes: BTreeSet<Box<str>>,
}

impl AttributeAccessList {
	pub fn restricted<S: AsRef<str>>(attributes: &[S]) -> Self {
		Self { enabled: true, attributes: attributes.iter().map(|a| a.as_ref().into()).collect() }
	}
}

impl PermissionCategory for AttributeAccessList {
	fn is_enabled(&self) -> bool {
		self.enabled
	}

	fn union(&mut self, other: &Self) {
		self.attributes.extend(other.attributes.iter().cloned());
	}
}

/// Attributes a user may access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeLimit {
	All,
	Only(BTreeSet<Box<str>>),
}

impl AttributeLimit {
	pub fn allows(&self, attribute: &str) -> bool {
		match self {
			AttributeLimit::All => true,
			AttributeLimit::Only(attributes) => attributes.contains(attribute),
		}
	}
}

// Endpoints //
//***********//
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsAccessList {
	pub enabled: bool,
	pub endpoints: BTreeSet<Box<str>>,
}

impl EndpointsAccessList {
	pub fn restricted<S: AsRef<str>>(endpoints: &[S]) -> Self {
		Self { enabled: true, endpoints: endpoints.iter().map(|e| e.as_ref().into()).collect() }
	}
}

impl PermissionCategory for EndpointsAccessList {
	fn is_enabled(&self) -> bool {
		self.enabled
	}

	fn union(&mut self, other: &Self) {
		self.endpoints.extend(other.endpoints.iter().cloned());
	}
}

// Settings //
//**********//
/// Addon-scoped settings administration (studio or project level)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsAccess {
	pub enabled: bool,
	pub addons: BTreeSet<Box<str>>,
	/// Project level only: may update the project anatomy
	pub anatomy_update: bool,
}

impl SettingsAccess {
	pub fn granted<S: AsRef<str>>(addons: &[S]) -> Self {
		Self {
			enabled: true,
			addons: addons.iter().map(|a| a.as_ref().into()).collect(),
			anatomy_update: false,
		}
	}

	pub fn allows_addon(&self, addon_name: &str) -> bool {
		self.enabled && self.addons.contains(addon_name)
	}
}

impl PermissionCategory for SettingsAccess {
	fn is_enabled(&self) -> bool {
		self.enabled
	}

	fn union(&mut self, other: &Self) {
		self.addons.extend(other.addons.iter().cloned());
		self.anatomy_update = self.anatomy_update || other.anatomy_update;
	}
}

// PermissionSet //
//***************//
/// Effective permissions of one access group at one scope, or the merge of several
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionSet {
	pub create: FolderAccessList,
	pub read: FolderAccessList,
	pub update: FolderAccessList,
	pub delete: FolderAccessList,
	pub attrib_read: AttributeAccessList,
	pub attrib_write: AttributeAccessList,
	pub endpoints: EndpointsAccessList,
	pub studio_settings: SettingsAccess,
	pub project_settings: SettingsAccess,
	pub publish: Gate,
}

impl PermissionSet {
	/// Parses a raw permission document. Missing categories are disabled.
	pub fn from_document(doc: &serde_json::Value) -> AtResult<Self> {
		serde_json::from_value(doc.clone())
			.map_err(|e| Error::ValidationError(format!("Invalid permission document: {}", e)))
	}

	pub fn to_document(&self) -> AtResult<serde_json::Value> {
		serde_json::to_value(self)
			.map_err(|e| Error::Internal(format!("Failed to serialize permissions: {}", e)))
	}

	pub fn is_enabled(&self, category: Category) -> bool {
		match category {
			Category::Create => self.create.is_enabled(),
			Category::Read => self.read.is_enabled(),
			Category::Update => self.update.is_enabled(),
			Category::Delete => self.delete.is_enabled(),
			Category::AttribRead => self.attrib_read.is_enabled(),
			Category::AttribWrite => self.attrib_write.is_enabled(),
			Category::Endpoints => self.endpoints.is_enabled(),
			Category::StudioSettings => self.studio_settings.is_enabled(),
			Category::ProjectSettings => self.project_settings.is_enabled(),
			Category::Publish => self.publish.is_enabled(),
		}
	}

	/// Folder access list of a folder category, `None` for other categories
	pub fn folder_access(&self, category: Category) -> Option<&FolderAccessList> {
		match category {
			Category::Create => Some(&self.create),
			Category::Read => Some(&self.read),
			Category::Update => Some(&self.update),
			Category::Delete => Some(&self.delete),
			_ => None,
		}
	}

	/// Whether a folder is accessible for a folder category
	pub fn allows_folder(&self, category: Category, folder_path: &str) -> bool {
		self.folder_access(category).is_some_and(|list| list.allows_path(folder_path))
	}

	pub fn allows_endpoint(&self, endpoint: &str) -> bool {
		!self.endpoints.enabled || self.endpoints.endpoints.contains(endpoint)
	}

	pub fn readable_attributes(&self) -> AttributeLimit {
		if !self.attrib_read.enabled {
			return AttributeLimit::All;
		}
		let mut attributes = self.attrib_read.attributes.clone();
		attributes.extend(ATTRIB_READ_WHITELIST.iter().map(|&a| Box::<str>::from(a)));
		AttributeLimit::Only(attributes)
	}

	pub fn writable_attributes(&self) -> AttributeLimit {
		if self.attrib_write.enabled {
			AttributeLimit::Only(self.attrib_write.attributes.clone())
		} else {
			AttributeLimit::All
		}
	}

	pub fn can_edit_studio_settings(&self, addon_name: &str) -> bool {
		self.studio_settings.allows_addon(addon_name)
	}

	pub fn can_edit_project_settings(&self, addon_name: &str) -> bool {
		self.project_settings.allows_addon(addon_name)
	}

	pub fn can_update_anatomy(&self) -> bool {
		self.project_settings.enabled && self.project_settings.anatomy_update
	}

	pub fn can_publish(&self) -> bool {
		self.publish.enabled
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_from_document_defaults_missing_categories() {
		let perms = PermissionSet::from_document(&json!({
			"read": {
				"enabled": true,
				"access_list": [{ "access_type": "hierarchy", "path": "assets/characters" }]
			},
			"unknown_category": { "enabled": true }
		}))
		.expect("valid document");

		assert!(perms.read.enabled);
		assert_eq!(perms.read.access_list.len(), 1);
		for category in Category::ALL.iter().filter(|&&c| c != Category::Read) {
			assert!(!perms.is_enabled(*category), "{} should be disabled", category);
		}
	}

	#[test]
	fn test_from_document_rejects_wrong_shape() {
		let res = PermissionSet::from_document(&json!({ "endpoints": { "enabled": "yes" } }));
		assert!(matches!(res, Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_folder_access_matching() {
		let hierarchy = FolderAccess::new(FolderAccessType::Hierarchy, "/assets/characters/");
		assert!(hierarchy.matches("assets/characters"));
		assert!(hierarchy.matches("assets/characters/hero"));
		assert!(!hierarchy.matches("assets/charactersXL"));
		assert!(!hierarchy.matches("assets"));

		let children = FolderAccess::new(FolderAccessType::Children, "shots");
		assert!(!children.matches("shots"));
		assert!(children.matches("shots/sh010"));

		let assigned = FolderAccess::new(FolderAccessType::Assigned, "");
		assert!(!assigned.matches("anything"));
	}

	#[test]
	fn test_restriction_categories_open_when_disabled() {
		let perms = PermissionSet::default();
		assert!(perms.allows_endpoint("get_project"));
		assert!(perms.allows_folder(Category::Read, "shots/sh010"));
		assert_eq!(perms.readable_attributes(), AttributeLimit::All);
		assert!(!perms.allows_folder(Category::Endpoints, "shots"));
	}

	#[test]
	fn test_grant_categories_closed_when_disabled() {
		let mut perms = PermissionSet::default();
		assert!(!perms.can_publish());
		assert!(!perms.can_edit_project_settings("maya"));
		assert!(!perms.can_update_anatomy());

		perms.project_settings = SettingsAccess::granted(&["maya"]);
		perms.project_settings.anatomy_update = true;
		assert!(perms.can_edit_project_settings("maya"));
		assert!(!perms.can_edit_project_settings("nuke"));
		assert!(perms.can_update_anatomy());
	}

	#[test]
	fn test_readable_attributes_include_whitelist() {
		let perms = PermissionSet {
			attrib_read: AttributeAccessList::restricted(&["fps"]),
			..Default::default()
		};
		let limit = perms.readable_attributes();
		assert!(limit.allows("fps"));
		assert!(limit.allows("fullName"));
		assert!(!limit.allows("resolutionWidth"));
		assert_eq!(perms.writable_attributes(), AttributeLimit::All);
	}

	#[test]
	fn test_normalize_drops_values_of_disabled_category() {
		let mut list = FolderAccessList {
			enabled: false,
			access_list: [FolderAccess::new(FolderAccessType::Hierarchy, "a")].into(),
		};
		list.normalize();
		assert_eq!(list, FolderAccessList::default());
	}

	#[test]
	fn test_document_round_trip_is_deterministic() {
		let perms = PermissionSet {
			endpoints: EndpointsAccessList::restricted(&["b", "a"]),
			..Default::default()
		};
		let doc = perms.to_document().expect("valid document");
		assert_eq!(doc["endpoints"]["endpoints"], json!(["a", "b"]));
		assert_eq!(PermissionSet::from_document(&doc).expect("valid document"), perms);
	}
}

// vim: ts=4
