//! Addon catalogue interface: what the core needs to know about installed addons.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::prelude::*;
use crate::types::SettingsScope;

/// Reason an addon version failed to initialize, e.g. `{"reason": "..."}`
pub type BrokenReason = BTreeMap<Box<str>, Box<str>>;

/// Version requirements an addon declares against the server, launcher and other addons.
///
/// Requirements are comma separated conditions such as `">=1.0.0, <2.0.0"`.
/// A `None` requirement in `required_addons` means the addon must NOT be present.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonCompatibility {
	pub server_version: Option<Box<str>>,
	pub launcher_version: Option<Box<str>>,
	#[serde(default)]
	pub required_addons: BTreeMap<Box<str>, Option<Box<str>>>,
	#[serde(default)]
	pub soft_required_addons: BTreeMap<Box<str>, Option<Box<str>>>,
	#[serde(default)]
	pub compatible_addons: BTreeMap<Box<str>, Option<Box<str>>>,
}

/// One installed addon version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddonVersionInfo {
	pub name: Box<str>,
	pub version: Box<str>,
	pub title: Option<Box<str>>,
	/// Default settings document; `None` if the addon has no settings model
	pub default_settings: Option<serde_json::Value>,
	/// Scope tags of top-level settings fields. Undeclared fields use
	/// [`SettingsScope::DEFAULT`].
	pub field_scopes: BTreeMap<Box<str>, Vec<SettingsScope>>,
	/// Defaults of the site settings model; `None` if there is none
	pub site_settings: Option<serde_json::Value>,
	/// Whether a project bundle may pin a different version than the studio bundle
	pub project_can_override_addon_version: bool,
	/// System addons must be part of every bundle
	pub is_system: bool,
	pub compatibility: Option<AddonCompatibility>,
}

impl AddonVersionInfo {
	pub fn new(name: impl Into<Box<str>>, version: impl Into<Box<str>>) -> Self {
		Self { name: name.into(), version: version.into(), ..Default::default() }
	}

	pub fn title(&self) -> &str {
		self.title.as_deref().unwrap_or(&self.name)
	}

	/// Scopes a top-level settings field is configurable at
	pub fn field_scope(&self, field: &str) -> &[SettingsScope] {
		self.field_scopes.get(field).map_or(SettingsScope::DEFAULT, |s| s.as_slice())
	}

	/// Top-level settings field names
	pub fn settings_fields(&self) -> impl Iterator<Item = &str> {
		self.default_settings
			.as_ref()
			.and_then(serde_json::Value::as_object)
			.into_iter()
			.flat_map(|obj| obj.keys().map(String::as_str))
	}

	pub fn has_scope(&self, scope: SettingsScope) -> bool {
		self.default_settings.is_some()
			&& self.settings_fields().any(|field| self.field_scope(field).contains(&scope))
	}
}

pub trait AddonCatalogue: Debug + Send + Sync {
	/// Looks up an addon version, `NotFound` if it is not installed
	fn read_addon(&self, name: &str, version: &str) -> AtResult<Arc<AddonVersionInfo>>;

	/// Whether projects may pin their own version of an addon, `None` if no
	/// version of it is installed
	fn project_can_override_addon_version(&self, name: &str) -> Option<bool>;

	/// Why an addon version could not be loaded, if it is known to be broken
	fn broken_reason(&self, name: &str, version: &str) -> Option<BrokenReason>;

	/// Names of addons every bundle must include
	fn system_addons(&self) -> Vec<Box<str>>;

	/// Names of every installed addon
	fn addon_names(&self) -> Vec<Box<str>>;
}


// vim: ts=4
