//! Adapter that stores bundles and per-project bundle overrides.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::prelude::*;

/// A named pinning of addon versions
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRecord {
	pub name: Box<str>,
	/// `None` removes the addon from the bundle
	#[serde(default)]
	pub addons: BTreeMap<Box<str>, Option<Box<str>>>,
	pub installer_version: Option<Box<str>>,
	#[serde(default)]
	pub is_production: bool,
	#[serde(default)]
	pub is_staging: bool,
	#[serde(default)]
	pub is_dev: bool,
	#[serde(default)]
	pub is_archived: bool,
	/// Unix timestamp
	#[serde(default)]
	pub created_at: i64,
}

impl BundleRecord {
	pub fn new(name: impl Into<Box<str>>) -> Self {
		Self { name: name.into(), ..Default::default() }
	}

	pub fn with_addon(mut self, name: &str, version: &str) -> Self {
		self.addons.insert(name.into(), Some(version.into()));
		self
	}

	pub fn is_flagged(&self, channel: Channel) -> bool {
		match channel {
			Channel::Production => self.is_production,
			Channel::Staging => self.is_staging,
		}
	}

	/// Pinned version of an addon, `None` when absent or removed
	pub fn addon_version(&self, addon_name: &str) -> Option<&str> {
		self.addons.get(addon_name).and_then(|v| v.as_deref())
	}
}

/// Flag changes; `None` leaves a flag untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleFlagsPatch {
	pub is_production: Option<bool>,
	pub is_staging: Option<bool>,
	pub is_archived: Option<bool>,
	pub is_dev: Option<bool>,
}

#[async_trait]
pub trait BundleStore: Debug + Send + Sync {
	async fn read_bundle(&self, name: &str) -> AtResult<Option<BundleRecord>>;

	/// Studio bundle flagged for a channel
	async fn read_flagged_bundle(&self, channel: Channel) -> AtResult<Option<BundleRecord>>;

	/// Bundle name a project pins for a channel, `NotFound` for unknown projects
	async fn read_project_bundle_override(
		&self,
		project_name: &str,
		channel: Channel,
	) -> AtResult<Option<Box<str>>>;

	async fn list_bundles(&self) -> AtResult<Vec<BundleRecord>>;

	/// Creates a bundle; a set channel flag is moved away from any other bundle
	async fn create_bundle(&self, bundle: &BundleRecord) -> AtResult<()>;

	/// Changes bundle flags; a set channel flag is moved away from any other bundle
	async fn update_bundle_flags(&self, name: &str, patch: BundleFlagsPatch) -> AtResult<()>;

	async fn delete_bundle(&self, name: &str) -> AtResult<()>;

	/// Sets or clears (`None`) a project's bundle for a channel
	async fn update_project_bundle_override(
		&self,
		project_name: &str,
		channel: Channel,
		bundle_name: Option<&str>,
	) -> AtResult<()>;
}

// vim: ts=4
