//! Access group storage

use serde_json::Value;
use sqlx::{Row, SqlitePool};

use atelier_types::access_store::AccessGroupRecord;
use atelier_types::prelude::*;

use crate::utils::{db_err, parse_json, require_project};

pub(crate) async fn list(db: &SqlitePool, scope: &Scope) -> AtResult<Vec<AccessGroupRecord>> {
	let rows = sqlx::query("SELECT name, data FROM access_groups WHERE scope = ? ORDER BY name")
		.bind(scope.as_str())
		.fetch_all(db)
		.await
		.map_err(db_err)?;

	let mut groups = Vec::with_capacity(rows.len());
	for row in rows {
		let name: String = row.try_get("name").map_err(db_err)?;
		let data: String = row.try_get("data").map_err(db_err)?;
		groups.push(AccessGroupRecord { name: name.into(), data: parse_json("data", &data)? });
	}
	Ok(groups)
}

pub(crate) async fn update(
	db: &SqlitePool,
	scope: &Scope,
	name: &str,
	data: &Value,
) -> AtResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;
	if let Some(project_name) = scope.project_name() {
		require_project(&mut *tx, project_name).await?;
	}
	sqlx::query(
		"INSERT INTO access_groups (scope, name, data) VALUES (?, ?, ?)
		ON CONFLICT(scope, name) DO UPDATE SET data = excluded.data, updated_at = unixepoch()",
	)
	.bind(scope.as_str())
	.bind(name)
	.bind(data.to_string())
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;
	tx.commit().await.map_err(db_err)
}

pub(crate) async fn delete(db: &SqlitePool, scope: &Scope, name: &str) -> AtResult<()> {
	let res = sqlx::query("DELETE FROM access_groups WHERE scope = ? AND name = ?")
		.bind(scope.as_str())
		.bind(name)
		.execute(db)
		.await
		.map_err(db_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound(format!("access group {} does not exist", name)));
	}
	Ok(())
}

// vim: ts=4
