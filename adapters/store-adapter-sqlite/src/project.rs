//! Project directory

use sqlx::{Row, SqlitePool};

use atelier_types::prelude::*;
use atelier_types::types::STUDIO_SCOPE;

use crate::utils::{db_err, require_project};

pub(crate) async fn list(db: &SqlitePool) -> AtResult<Vec<Box<str>>> {
	let rows = sqlx::query("SELECT name FROM projects ORDER BY name")
		.fetch_all(db)
		.await
		.map_err(db_err)?;
	rows.iter()
		.map(|row| row.try_get::<String, _>("name").map(Into::into).map_err(db_err))
		.collect()
}

pub(crate) async fn create(db: &SqlitePool, name: &str) -> AtResult<()> {
	if name.is_empty() || name == STUDIO_SCOPE {
		return Err(Error::ValidationError(format!("invalid project name '{}'", name)));
	}
	let res = sqlx::query("INSERT INTO projects (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
		.bind(name)
		.execute(db)
		.await
		.map_err(db_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::ValidationError(format!("project {} already exists", name)));
	}
	Ok(())
}

/// Deletes a project together with everything scoped to it
pub(crate) async fn delete(db: &SqlitePool, name: &str) -> AtResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;
	require_project(&mut *tx, name).await?;

	for query in [
		"DELETE FROM access_groups WHERE scope = ?",
		"DELETE FROM project_bundles WHERE project_name = ?",
		"DELETE FROM settings WHERE project_name = ?",
		"DELETE FROM projects WHERE name = ?",
	] {
		sqlx::query(query).bind(name).execute(&mut *tx).await.map_err(db_err)?;
	}
	tx.commit().await.map_err(db_err)?;
	info!(project = %name, "Project deleted with its access groups and overrides");
	Ok(())
}

// vim: ts=4
