//! Adapter that stores access group definitions and the project directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// Raw access group row as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessGroupRecord {
	pub name: Box<str>,
	/// Permission document; shapes are validated by the core
	pub data: serde_json::Value,
}

#[async_trait]
pub trait AccessGroupStore: Debug + Send + Sync {
	/// Lists every access group defined at the given scope
	async fn list_access_groups(&self, scope: &Scope) -> AtResult<Vec<AccessGroupRecord>>;

	/// Creates or replaces an access group
	async fn update_access_group(
		&self,
		scope: &Scope,
		name: &str,
		data: &serde_json::Value,
	) -> AtResult<()>;

	/// Deletes an access group, `NotFound` if it does not exist
	async fn delete_access_group(&self, scope: &Scope, name: &str) -> AtResult<()>;
}

#[async_trait]
pub trait ProjectStore: Debug + Send + Sync {
	async fn list_projects(&self) -> AtResult<Vec<Box<str>>>;

	async fn create_project(&self, name: &str) -> AtResult<()>;

	/// Deletes a project with its access groups, bundle overrides and settings
	async fn delete_project(&self, name: &str) -> AtResult<()>;
}

// vim: ts=4
