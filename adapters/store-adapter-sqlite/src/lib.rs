//! SQLite store adapter for Atelier
//!
//! Implements every store trait of `atelier-types` on one SQLite database:
//! access groups, the project directory, bundles with their channel flags
//! and per-project overrides, settings override documents and site settings.
//!
//! Each domain lives in its own module with free functions over the pool;
//! this file only wires them to the traits.

#![forbid(unsafe_code)]

mod access_group;
mod bundle;
mod project;
mod schema;
mod settings;
mod utils;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use atelier_types::access_store::{AccessGroupRecord, AccessGroupStore, ProjectStore};
use atelier_types::bundle_store::{BundleFlagsPatch, BundleRecord, BundleStore};
use atelier_types::prelude::*;
use atelier_types::settings_store::SettingsStore;

use crate::schema::init_db;

#[derive(Debug)]
pub struct StoreAdapterSqlite {
	db: SqlitePool,
}

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

impl StoreAdapterSqlite {
	/// Opens (creating if needed) the database file at `path`
	pub async fn new(path: impl AsRef<Path>) -> AtResult<Self> {
		Self::with_pool_size(path, DEFAULT_MAX_CONNECTIONS).await
	}

	pub async fn with_pool_size(path: impl AsRef<Path>, max_connections: u32) -> AtResult<Self> {
		if max_connections == 0 {
			return Err(Error::ConfigError("pool size must be at least 1".into()));
		}
		if let Some(dir) = path.as_ref().parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(max_connections)
			.connect_with(opts)
			.await
			.map_err(utils::db_err)?;

		init_db(&db).await.map_err(utils::db_err)?;
		info!(path = %path.as_ref().display(), "Store database opened");

		Ok(Self { db })
	}
}

#[async_trait]
impl AccessGroupStore for StoreAdapterSqlite {
	async fn list_access_groups(&self, scope: &Scope) -> AtResult<Vec<AccessGroupRecord>> {
		access_group::list(&self.db, scope).await
	}

	async fn update_access_group(&self, scope: &Scope, name: &str, data: &Value) -> AtResult<()> {
		access_group::update(&self.db, scope, name, data).await
	}

	async fn delete_access_group(&self, scope: &Scope, name: &str) -> AtResult<()> {
		access_group::delete(&self.db, scope, name).await
	}
}

#[async_trait]
impl ProjectStore for StoreAdapterSqlite {
	async fn list_projects(&self) -> AtResult<Vec<Box<str>>> {
		project::list(&self.db).await
	}

	async fn create_project(&self, name: &str) -> AtResult<()> {
		project::create(&self.db, name).await
	}

	async fn delete_project(&self, name: &str) -> AtResult<()> {
		project::delete(&self.db, name).await
	}
}

#[async_trait]
impl BundleStore for StoreAdapterSqlite {
	async fn read_bundle(&self, name: &str) -> AtResult<Option<BundleRecord>> {
		bundle::read(&self.db, name).await
	}

	async fn read_flagged_bundle(&self, channel: Channel) -> AtResult<Option<BundleRecord>> {
		bundle::read_flagged(&self.db, channel).await
	}

	async fn read_project_bundle_override(
		&self,
		project_name: &str,
		channel: Channel,
	) -> AtResult<Option<Box<str>>> {
		bundle::read_project_override(&self.db, project_name, channel).await
	}

	async fn list_bundles(&self) -> AtResult<Vec<BundleRecord>> {
		bundle::list(&self.db).await
	}

	async fn create_bundle(&self, bundle: &BundleRecord) -> AtResult<()> {
		bundle::create(&self.db, bundle).await
	}

	async fn update_bundle_flags(&self, name: &str, patch: BundleFlagsPatch) -> AtResult<()> {
		bundle::update_flags(&self.db, name, patch).await
	}

	async fn delete_bundle(&self, name: &str) -> AtResult<()> {
		bundle::delete(&self.db, name).await
	}

	async fn update_project_bundle_override(
		&self,
		project_name: &str,
		channel: Channel,
		bundle_name: Option<&str>,
	) -> AtResult<()> {
		bundle::update_project_override(&self.db, project_name, channel, bundle_name).await
	}
}

#[async_trait]
impl SettingsStore for StoreAdapterSqlite {
	async fn read_override(
		&self,
		addon_name: &str,
		addon_version: &str,
		variant: &Variant,
		scope: &OverrideScope,
	) -> AtResult<Option<Value>> {
		settings::read_override(&self.db, addon_name, addon_version, variant, scope).await
	}

	async fn update_override(
		&self,
		addon_name: &str,
		addon_version: &str,
		variant: &Variant,
		scope: &OverrideScope,
		data: Option<&Value>,
	) -> AtResult<()> {
		settings::update_override(&self.db, addon_name, addon_version, variant, scope, data).await
	}

	async fn read_site_settings(
		&self,
		addon_name: &str,
		addon_version: &str,
		site_id: &str,
	) -> AtResult<Option<Value>> {
		settings::read_site_settings(&self.db, addon_name, addon_version, site_id).await
	}

	async fn update_site_settings(
		&self,
		addon_name: &str,
		addon_version: &str,
		site_id: &str,
		data: Option<&Value>,
	) -> AtResult<()> {
		settings::update_site_settings(&self.db, addon_name, addon_version, site_id, data).await
	}
}

// vim: ts=4
