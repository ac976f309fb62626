//! Settings override documents and site settings
//!
//! Overrides are keyed by addon version, variant and scope. Only the latest
//! document of each key is kept.

use serde_json::Value;
use sqlx::{Row, SqlitePool};

use atelier_types::prelude::*;

use crate::utils::{db_err, parse_json, require_project};

pub(crate) async fn read_override(
	db: &SqlitePool,
	addon_name: &str,
	addon_version: &str,
	variant: &Variant,
	scope: &OverrideScope,
) -> AtResult<Option<Value>> {
	if let Some(project_name) = scope.project_name() {
		require_project(db, project_name).await?;
	}
	let row = sqlx::query(
		"SELECT data FROM settings
		WHERE addon_name = ? AND addon_version = ? AND variant = ?
			AND scope = ? AND project_name = ? AND site_id = ?",
	)
	.bind(addon_name)
	.bind(addon_version)
	.bind(variant.as_str())
	.bind(scope.kind())
	.bind(scope.project_name().unwrap_or_default())
	.bind(scope.site_id().unwrap_or_default())
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	let Some(row) = row else {
		return Ok(None);
	};
	let data: String = row.try_get("data").map_err(db_err)?;
	parse_json("data", &data).map(Some)
}

pub(crate) async fn update_override(
	db: &SqlitePool,
	addon_name: &str,
	addon_version: &str,
	variant: &Variant,
	scope: &OverrideScope,
	data: Option<&Value>,
) -> AtResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;
	if let Some(project_name) = scope.project_name() {
		require_project(&mut *tx, project_name).await?;
	}
	let project_name = scope.project_name().unwrap_or_default();
	let site_id = scope.site_id().unwrap_or_default();

	if let Some(data) = data {
		sqlx::query(
			"INSERT INTO settings
				(addon_name, addon_version, variant, scope, project_name, site_id, data)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			ON CONFLICT(addon_name, addon_version, variant, scope, project_name, site_id)
			DO UPDATE SET data = excluded.data, updated_at = unixepoch()",
		)
		.bind(addon_name)
		.bind(addon_version)
		.bind(variant.as_str())
		.bind(scope.kind())
		.bind(project_name)
		.bind(site_id)
		.bind(data.to_string())
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;
	} else {
		sqlx::query(
			"DELETE FROM settings
			WHERE addon_name = ? AND addon_version = ? AND variant = ?
				AND scope = ? AND project_name = ? AND site_id = ?",
		)
		.bind(addon_name)
		.bind(addon_version)
		.bind(variant.as_str())
		.bind(scope.kind())
		.bind(project_name)
		.bind(site_id)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;
	}
	tx.commit().await.map_err(db_err)
}

pub(crate) async fn read_site_settings(
	db: &SqlitePool,
	addon_name: &str,
	addon_version: &str,
	site_id: &str,
) -> AtResult<Option<Value>> {
	let row = sqlx::query(
		"SELECT data FROM site_settings WHERE addon_name = ? AND addon_version = ? AND site_id = ?",
	)
	.bind(addon_name)
	.bind(addon_version)
	.bind(site_id)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	row.map(|row| {
		let data: String = row.try_get("data").map_err(db_err)?;
		parse_json("data", &data)
	})
	.transpose()
}

pub(crate) async fn update_site_settings(
	db: &SqlitePool,
	addon_name: &str,
	addon_version: &str,
	site_id: &str,
	data: Option<&Value>,
) -> AtResult<()> {
	if let Some(data) = data {
		sqlx::query(
			"INSERT INTO site_settings (addon_name, addon_version, site_id, data)
			VALUES (?, ?, ?, ?)
			ON CONFLICT(addon_name, addon_version, site_id) DO UPDATE SET data = excluded.data",
		)
		.bind(addon_name)
		.bind(addon_version)
		.bind(site_id)
		.bind(data.to_string())
		.execute(db)
		.await
		.map_err(db_err)?;
	} else {
		// Delete site settings if value is None
		sqlx::query(
			"DELETE FROM site_settings WHERE addon_name = ? AND addon_version = ? AND site_id = ?",
		)
		.bind(addon_name)
		.bind(addon_version)
		.bind(site_id)
		.execute(db)
		.await
		.map_err(db_err)?;
	}
	Ok(())
}

// vim: ts=4
