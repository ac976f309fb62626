//! Shared helpers for the SQLite store adapter

use serde_json::Value;

use atelier_types::prelude::*;

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Translates a database error, logging it first
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	Error::StorageError(err.to_string())
}

/// Parses a stored JSON column
pub(crate) fn parse_json(column: &str, data: &str) -> AtResult<Value> {
	serde_json::from_str(data).map_err(|err| {
		warn!("DB: malformed {} column: {}", column, err);
		Error::StorageError(format!("malformed {} column", column))
	})
}

/// Fails with `NotFound` unless the project exists
pub(crate) async fn require_project<'e>(
	db: impl sqlx::SqliteExecutor<'e>,
	project_name: &str,
) -> AtResult<()> {
	let row = sqlx::query("SELECT name FROM projects WHERE name = ?")
		.bind(project_name)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;
	match row {
		Some(_) => Ok(()),
		None => Err(Error::NotFound(format!("project {} does not exist", project_name))),
	}
}

// vim: ts=4
