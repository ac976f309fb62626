//! Access control service: access group management and authorization checks

use std::sync::Arc;

use atelier_types::access_store::AccessGroupStore;

use super::permissions::PermissionSet;
use super::registry::AccessGroupRegistry;
use crate::prelude::*;

#[derive(Debug)]
pub struct AccessControl {
	registry: Arc<AccessGroupRegistry>,
	store: Arc<dyn AccessGroupStore>,
}

fn validate_group_name(name: &str) -> AtResult<()> {
	if name.is_empty() || name.trim() != name {
		return Err(Error::ValidationError(format!("invalid access group name {:?}", name)));
	}
	Ok(())
}

impl AccessControl {
	pub fn new(registry: Arc<AccessGroupRegistry>, store: Arc<dyn AccessGroupStore>) -> Self {
		Self { registry, store }
	}

	pub fn registry(&self) -> &AccessGroupRegistry {
		&self.registry
	}

	/// Effective permissions for the named access groups at a scope
	pub fn permissions<S: AsRef<str>>(&self, names: &[S], scope: &Scope) -> PermissionSet {
		self.registry.combine(names, scope)
	}

	/// Creates or replaces an access group, then reloads the registry
	pub async fn save_access_group(
		&self,
		scope: &Scope,
		name: &str,
		permissions: &PermissionSet,
	) -> AtResult<()> {
		validate_group_name(name)?;
		let doc = permissions.to_document()?;
		self.store.update_access_group(scope, name, &doc).await?;
		info!(access_group = %name, scope = %scope, "Access group saved");
		self.registry.load().await?;
		Ok(())
	}

	/// Same as [`save_access_group`](Self::save_access_group) for a raw
	/// permission document, which is validated first
	pub async fn save_access_group_document(
		&self,
		scope: &Scope,
		name: &str,
		doc: &serde_json::Value,
	) -> AtResult<()> {
		let permissions = PermissionSet::from_document(doc)?;
		self.save_access_group(scope, name, &permissions).await
	}

	/// Deletes an access group, then reloads the registry
	pub async fn delete_access_group(&self, scope: &Scope, name: &str) -> AtResult<()> {
		self.store.delete_access_group(scope, name).await?;
		info!(access_group = %name, scope = %scope, "Access group deleted");
		self.registry.load().await?;
		Ok(())
	}

	/// Fails with `PermissionDenied` when the endpoint list restricts the
	/// endpoint. The studio scope is never restricted by endpoint lists.
	pub fn check_endpoint(
		&self,
		permissions: &PermissionSet,
		scope: &Scope,
		endpoint: &str,
	) -> AtResult<()> {
		if scope.is_studio() || permissions.allows_endpoint(endpoint) {
			return Ok(());
		}
		warn!(endpoint = %endpoint, scope = %scope, "Endpoint denied by access groups");
		Err(Error::PermissionDenied)
	}
}

// vim: ts=4
