//! Bundles and per-project bundle overrides
//!
//! A channel flag is held by at most one bundle: setting it on one bundle
//! clears it on every other bundle in the same transaction.

use std::collections::BTreeMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use atelier_types::bundle_store::{BundleFlagsPatch, BundleRecord};
use atelier_types::prelude::*;

use crate::utils::{db_err, require_project};

const BUNDLE_COLUMNS: &str = "name, addons, installer_version, is_production, is_staging, \
	is_dev, is_archived, created_at";

fn read_row(row: &SqliteRow) -> AtResult<BundleRecord> {
	let name: String = row.try_get("name").map_err(db_err)?;
	let addons: String = row.try_get("addons").map_err(db_err)?;
	let addons: BTreeMap<Box<str>, Option<Box<str>>> =
		serde_json::from_str(&addons).map_err(|err| {
			warn!("DB: malformed addons of bundle {}: {}", name, err);
			Error::StorageError(format!("malformed addons of bundle {}", name))
		})?;
	let installer_version: Option<String> = row.try_get("installer_version").map_err(db_err)?;

	Ok(BundleRecord {
		name: name.into(),
		addons,
		installer_version: installer_version.map(Into::into),
		is_production: row.try_get("is_production").map_err(db_err)?,
		is_staging: row.try_get("is_staging").map_err(db_err)?,
		is_dev: row.try_get("is_dev").map_err(db_err)?,
		is_archived: row.try_get("is_archived").map_err(db_err)?,
		created_at: row.try_get("created_at").map_err(db_err)?,
	})
}

/// Clears channel flags on every bundle except `except`
async fn clear_flags(
	conn: &mut SqliteConnection,
	except: &str,
	production: bool,
	staging: bool,
) -> AtResult<()> {
	if production {
		sqlx::query("UPDATE bundles SET is_production = 0 WHERE name != ? AND is_production")
			.bind(except)
			.execute(&mut *conn)
			.await
			.map_err(db_err)?;
	}
	if staging {
		sqlx::query("UPDATE bundles SET is_staging = 0 WHERE name != ? AND is_staging")
			.bind(except)
			.execute(&mut *conn)
			.await
			.map_err(db_err)?;
	}
	Ok(())
}

pub(crate) async fn read(db: &SqlitePool, name: &str) -> AtResult<Option<BundleRecord>> {
	let row = sqlx::query(&format!("SELECT {} FROM bundles WHERE name = ?", BUNDLE_COLUMNS))
		.bind(name)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;
	row.as_ref().map(read_row).transpose()
}

pub(crate) async fn read_flagged(
	db: &SqlitePool,
	channel: Channel,
) -> AtResult<Option<BundleRecord>> {
	let column = match channel {
		Channel::Production => "is_production",
		Channel::Staging => "is_staging",
	};
	let query = format!("SELECT {} FROM bundles WHERE {} LIMIT 1", BUNDLE_COLUMNS, column);
	let row = sqlx::query(&query)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;
	row.as_ref().map(read_row).transpose()
}

pub(crate) async fn list(db: &SqlitePool) -> AtResult<Vec<BundleRecord>> {
	let rows = sqlx::query(&format!("SELECT {} FROM bundles ORDER BY name", BUNDLE_COLUMNS))
		.fetch_all(db)
		.await
		.map_err(db_err)?;
	rows.iter().map(read_row).collect()
}

pub(crate) async fn create(db: &SqlitePool, bundle: &BundleRecord) -> AtResult<()> {
	let addons = serde_json::to_string(&bundle.addons)
		.map_err(|err| Error::Internal(format!("cannot encode bundle addons: {}", err)))?;

	let mut tx = db.begin().await.map_err(db_err)?;
	let res = sqlx::query(
		"INSERT INTO bundles (name, addons, installer_version, is_production, is_staging,
			is_dev, is_archived, created_at)
		VALUES (?, ?, ?, ?, ?, ?, ?, COALESCE(NULLIF(?, 0), unixepoch()))
		ON CONFLICT(name) DO NOTHING",
	)
	.bind(&*bundle.name)
	.bind(addons)
	.bind(bundle.installer_version.as_deref())
	.bind(bundle.is_production)
	.bind(bundle.is_staging)
	.bind(bundle.is_dev)
	.bind(bundle.is_archived)
	.bind(bundle.created_at)
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::ValidationError(format!("bundle {} already exists", bundle.name)));
	}

	clear_flags(&mut *tx, &bundle.name, bundle.is_production, bundle.is_staging).await?;
	tx.commit().await.map_err(db_err)
}

pub(crate) async fn update_flags(
	db: &SqlitePool,
	name: &str,
	patch: BundleFlagsPatch,
) -> AtResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;
	let res = sqlx::query(
		"UPDATE bundles SET
			is_production = COALESCE(?, is_production),
			is_staging = COALESCE(?, is_staging),
			is_archived = COALESCE(?, is_archived),
			is_dev = COALESCE(?, is_dev)
		WHERE name = ?",
	)
	.bind(patch.is_production)
	.bind(patch.is_staging)
	.bind(patch.is_archived)
	.bind(patch.is_dev)
	.bind(name)
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound(format!("bundle {} does not exist", name)));
	}

	clear_flags(&mut *tx, name, patch.is_production == Some(true), patch.is_staging == Some(true))
		.await?;
	tx.commit().await.map_err(db_err)
}

pub(crate) async fn delete(db: &SqlitePool, name: &str) -> AtResult<()> {
	let res = sqlx::query("DELETE FROM bundles WHERE name = ?")
		.bind(name)
		.execute(db)
		.await
		.map_err(db_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound(format!("bundle {} does not exist", name)));
	}
	Ok(())
}

pub(crate) async fn read_project_override(
	db: &SqlitePool,
	project_name: &str,
	channel: Channel,
) -> AtResult<Option<Box<str>>> {
	require_project(db, project_name).await?;
	let row = sqlx::query(
		"SELECT bundle_name FROM project_bundles WHERE project_name = ? AND channel = ?",
	)
	.bind(project_name)
	.bind(channel.as_str())
	.fetch_optional(db)
	.await
	.map_err(db_err)?;
	row.map(|row| row.try_get::<String, _>("bundle_name").map(Into::into).map_err(db_err))
		.transpose()
}

pub(crate) async fn update_project_override(
	db: &SqlitePool,
	project_name: &str,
	channel: Channel,
	bundle_name: Option<&str>,
) -> AtResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;
	require_project(&mut *tx, project_name).await?;
	match bundle_name {
		Some(bundle_name) => {
			sqlx::query(
				"INSERT INTO project_bundles (project_name, channel, bundle_name) VALUES (?, ?, ?)
				ON CONFLICT(project_name, channel) DO UPDATE SET bundle_name = excluded.bundle_name",
			)
			.bind(project_name)
			.bind(channel.as_str())
			.bind(bundle_name)
			.execute(&mut *tx)
			.await
			.map_err(db_err)?;
		}
		None => {
			sqlx::query("DELETE FROM project_bundles WHERE project_name = ? AND channel = ?")
				.bind(project_name)
				.bind(channel.as_str())
				.execute(&mut *tx)
				.await
				.map_err(db_err)?;
		}
	}
	tx.commit().await.map_err(db_err)
}

// vim: ts=4
