//! Adapter that stores addon settings override documents.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait SettingsStore: Debug + Send + Sync {
	/// Latest override document of an addon version at a scope.
	/// Project scopes of unknown projects fail with `NotFound`.
	async fn read_override(
		&self,
		addon_name: &str,
		addon_version: &str,
		variant: &Variant,
		scope: &OverrideScope,
	) -> AtResult<Option<serde_json::Value>>;

	/// Stores (or with `None` removes) an override document
	async fn update_override(
		&self,
		addon_name: &str,
		addon_version: &str,
		variant: &Variant,
		scope: &OverrideScope,
		data: Option<&serde_json::Value>,
	) -> AtResult<()>;

	/// Site-level (machine) settings of an addon version
	async fn read_site_settings(
		&self,
		addon_name: &str,
		addon_version: &str,
		site_id: &str,
	) -> AtResult<Option<serde_json::Value>>;

	async fn update_site_settings(
		&self,
		addon_name: &str,
		addon_version: &str,
		site_id: &str,
		data: Option<&serde_json::Value>,
	) -> AtResult<()>;
}

// vim: ts=4
