//! Process-wide cache of access group permission sets
//!
//! The registry keeps one immutable map of `(group name, scope)` to
//! permission set. A reload builds a complete new map from storage and swaps
//! it in; readers clone the `Arc` of the current map and never observe a
//! partially loaded state. Reloads are serialized, so the map installed last
//! is always built from the most recent read of storage.

use itertools::Itertools;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use atelier_types::access_store::{AccessGroupStore, ProjectStore};

use super::merge;
use super::permissions::PermissionSet;
use crate::prelude::*;

type GroupMap = HashMap<(Box<str>, Scope), Arc<PermissionSet>>;

fn storage_error(err: Error) -> Error {
	match err {
		Error::StorageError(_) => err,
		err => Error::StorageError(err.to_string()),
	}
}

#[derive(Debug)]
pub struct AccessGroupRegistry {
	access_groups: Arc<dyn AccessGroupStore>,
	projects: Arc<dyn ProjectStore>,
	groups: RwLock<Arc<GroupMap>>,
	/// Held from the first storage read until the new map is swapped in
	reload: Mutex<()>,
}

impl AccessGroupRegistry {
	/// Creates an empty registry. Call [`load`](Self::load) to populate it.
	pub fn new(access_groups: Arc<dyn AccessGroupStore>, projects: Arc<dyn ProjectStore>) -> Self {
		Self {
			access_groups,
			projects,
			groups: RwLock::new(Arc::new(HashMap::new())),
			reload: Mutex::new(()),
		}
	}

	async fn load_scope(&self, scope: Scope, map: &mut GroupMap) -> AtResult<()> {
		let records =
			self.access_groups.list_access_groups(&scope).await.map_err(storage_error)?;
		for record in records {
			let permissions = PermissionSet::from_document(&record.data).map_err(|err| {
				warn!(access_group = %record.name, scope = %scope, "Malformed access group: {}", err);
				Error::StorageError(format!(
					"malformed access group {} at scope {}",
					record.name, scope
				))
			})?;
			map.insert((record.name, scope.clone()), Arc::new(permissions));
		}
		Ok(())
	}

	/// Reloads every access group from storage and swaps the new map in.
	///
	/// On failure the previously loaded map stays in place. Concurrent calls
	/// run one after the other.
	pub async fn load(&self) -> AtResult<usize> {
		let _reload = self.reload.lock().await;
		let mut map = GroupMap::new();
		self.load_scope(Scope::Studio, &mut map).await?;

		let projects = self.projects.list_projects().await.map_err(storage_error)?;
		for project_name in projects {
			self.load_scope(Scope::Project(project_name), &mut map).await?;
		}

		let count = map.len();
		*self.groups.write() = Arc::new(map);
		info!(count, "Access groups loaded");
		Ok(count)
	}

	fn snapshot(&self) -> Arc<GroupMap> {
		Arc::clone(&self.groups.read())
	}

	pub fn get(&self, name: &str, scope: &Scope) -> Option<Arc<PermissionSet>> {
		self.snapshot().get(&(Box::<str>::from(name), scope.clone())).cloned()
	}

	/// Access groups defined at exactly this scope, sorted by name
	pub fn all_for_scope(&self, scope: &Scope) -> Vec<(Box<str>, Arc<PermissionSet>)> {
		self.snapshot()
			.iter()
			.filter(|((_, group_scope), _)| group_scope == scope)
			.map(|((name, _), permissions)| (name.clone(), Arc::clone(permissions)))
			.sorted_by(|a, b| a.0.cmp(&b.0))
			.collect()
	}

	/// Effective permissions of a user holding the named access groups
	pub fn combine<S: AsRef<str>>(&self, names: &[S], scope: &Scope) -> PermissionSet {
		let groups = self.snapshot();
		merge::combine(names, scope, |name, scope| {
			groups.get(&(Box::<str>::from(name), scope.clone())).map(|permissions| &**permissions)
		})
	}

	pub fn len(&self) -> usize {
		self.groups.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

// vim: ts=4
