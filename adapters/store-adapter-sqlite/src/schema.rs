//! Database schema initialization

use sqlx::SqlitePool;

/// Creates every table and index the adapter needs
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Projects
	//**********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS projects (
		name text NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(name)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Access groups
	//***************
	// scope is '_' for the studio or a project name
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS access_groups (
		scope text NOT NULL,
		name text NOT NULL,
		data json NOT NULL,
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(scope, name)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Bundles
	//*********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS bundles (
		name text NOT NULL,
		addons json NOT NULL,
		installer_version text,
		is_production boolean NOT NULL DEFAULT 0,
		is_staging boolean NOT NULL DEFAULT 0,
		is_dev boolean NOT NULL DEFAULT 0,
		is_archived boolean NOT NULL DEFAULT 0,
		created_at integer NOT NULL DEFAULT (unixepoch()),
		PRIMARY KEY(name)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS project_bundles (
		project_name text NOT NULL,
		channel text NOT NULL,
		bundle_name text NOT NULL,
		PRIMARY KEY(project_name, channel)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Settings
	//**********
	// project_name and site_id are '' where the scope has none
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings (
		addon_name text NOT NULL,
		addon_version text NOT NULL,
		variant text NOT NULL,
		scope char(8) NOT NULL,
		project_name text NOT NULL DEFAULT '',
		site_id text NOT NULL DEFAULT '',
		data json NOT NULL,
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(addon_name, addon_version, variant, scope, project_name, site_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_settings_project ON settings(project_name)")
		.execute(&mut *tx)
		.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS site_settings (
		addon_name text NOT NULL,
		addon_version text NOT NULL,
		site_id text NOT NULL,
		data json NOT NULL,
		PRIMARY KEY(addon_name, addon_version, site_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
