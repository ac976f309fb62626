//! In-memory store adapter for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use atelier_types::access_store::{AccessGroupRecord, AccessGroupStore, ProjectStore};
use atelier_types::bundle_store::{BundleFlagsPatch, BundleRecord, BundleStore};
use atelier_types::prelude::*;
use atelier_types::settings_store::SettingsStore;

type OverrideKey = (Box<str>, Box<str>, Box<str>, OverrideScope);
type SiteKey = (Box<str>, Box<str>, Box<str>);

#[derive(Debug, Default)]
struct Data {
	access_groups: BTreeMap<(Scope, Box<str>), Value>,
	projects: BTreeMap<Box<str>, HashMap<Channel, Box<str>>>,
	bundles: BTreeMap<Box<str>, BundleRecord>,
	overrides: HashMap<OverrideKey, Value>,
	site_settings: HashMap<SiteKey, Value>,
}

/// Store adapter keeping everything in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
	data: Mutex<Data>,
	/// Number of upcoming access group listings that fail
	failing_group_loads: AtomicUsize,
	/// Override reads of this addon fail
	failing_addon: Mutex<Option<Box<str>>>,
	override_reads: AtomicUsize,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn fail_next_group_loads(&self, count: usize) {
		self.failing_group_loads.store(count, Ordering::SeqCst);
	}

	pub fn fail_override_reads_of(&self, addon_name: &str) {
		*self.failing_addon.lock() = Some(addon_name.into());
	}

	pub fn override_reads(&self) -> usize {
		self.override_reads.load(Ordering::SeqCst)
	}

	fn check_project(data: &Data, scope: &OverrideScope) -> AtResult<()> {
		match scope.project_name() {
			Some(project) if !data.projects.contains_key(project) => {
				Err(Error::NotFound(format!("project {} does not exist", project)))
			}
			_ => Ok(()),
		}
	}

	fn clear_flags(data: &mut Data, except: &str, production: bool, staging: bool) {
		for bundle in data.bundles.values_mut().filter(|b| &*b.name != except) {
			if production {
				bundle.is_production = false;
			}
			if staging {
				bundle.is_staging = false;
			}
		}
	}
}

#[async_trait]
impl AccessGroupStore for MemoryStore {
	async fn list_access_groups(&self, scope: &Scope) -> AtResult<Vec<AccessGroupRecord>> {
		let failing = self.failing_group_loads.load(Ordering::SeqCst);
		if failing > 0 {
			self.failing_group_loads.store(failing - 1, Ordering::SeqCst);
			return Err(Error::StorageError("connection refused".into()));
		}
		let data = self.data.lock();
		Ok(data
			.access_groups
			.iter()
			.filter(|((group_scope, _), _)| group_scope == scope)
			.map(|((_, name), doc)| AccessGroupRecord { name: name.clone(), data: doc.clone() })
			.collect())
	}

	async fn update_access_group(&self, scope: &Scope, name: &str, doc: &Value) -> AtResult<()> {
		let mut data = self.data.lock();
		if let Some(project) = scope.project_name() {
			if !data.projects.contains_key(project) {
				return Err(Error::NotFound(format!("project {} does not exist", project)));
			}
		}
		data.access_groups.insert((scope.clone(), name.into()), doc.clone());
		Ok(())
	}

	async fn delete_access_group(&self, scope: &Scope, name: &str) -> AtResult<()> {
		let mut data = self.data.lock();
		data.access_groups
			.remove(&(scope.clone(), Box::<str>::from(name)))
			.map(|_| ())
			.ok_or_else(|| Error::NotFound(format!("access group {} does not exist", name)))
	}
}

#[async_trait]
impl ProjectStore for MemoryStore {
	async fn list_projects(&self) -> AtResult<Vec<Box<str>>> {
		Ok(self.data.lock().projects.keys().cloned().collect())
	}

	async fn create_project(&self, name: &str) -> AtResult<()> {
		let mut data = self.data.lock();
		if data.projects.contains_key(name) {
			return Err(Error::ValidationError(format!("project {} already exists", name)));
		}
		data.projects.insert(name.into(), HashMap::new());
		Ok(())
	}

	async fn delete_project(&self, name: &str) -> AtResult<()> {
		let mut data = self.data.lock();
		if data.projects.remove(name).is_none() {
			return Err(Error::NotFound(format!("project {} does not exist", name)));
		}
		data.access_groups.retain(|(scope, _), _| scope.project_name() != Some(name));
		data.overrides.retain(|(_, _, _, scope), _| scope.project_name() != Some(name));
		Ok(())
	}
}

#[async_trait]
impl BundleStore for MemoryStore {
	async fn read_bundle(&self, name: &str) -> AtResult<Option<BundleRecord>> {
		Ok(self.data.lock().bundles.get(name).cloned())
	}

	async fn read_flagged_bundle(&self, channel: Channel) -> AtResult<Option<BundleRecord>> {
		Ok(self.data.lock().bundles.values().find(|b| b.is_flagged(channel)).cloned())
	}

	async fn read_project_bundle_override(
		&self,
		project_name: &str,
		channel: Channel,
	) -> AtResult<Option<Box<str>>> {
		let data = self.data.lock();
		let project = data
			.projects
			.get(project_name)
			.ok_or_else(|| Error::NotFound(format!("project {} does not exist", project_name)))?;
		Ok(project.get(&channel).cloned())
	}

	async fn list_bundles(&self) -> AtResult<Vec<BundleRecord>> {
		Ok(self.data.lock().bundles.values().cloned().collect())
	}

	async fn create_bundle(&self, bundle: &BundleRecord) -> AtResult<()> {
		let mut data = self.data.lock();
		if data.bundles.contains_key(&bundle.name) {
			return Err(Error::ValidationError(format!("bundle {} already exists", bundle.name)));
		}
		Self::clear_flags(&mut data, &bundle.name, bundle.is_production, bundle.is_staging);
		data.bundles.insert(bundle.name.clone(), bundle.clone());
		Ok(())
	}

	async fn update_bundle_flags(&self, name: &str, patch: BundleFlagsPatch) -> AtResult<()> {
		let mut data = self.data.lock();
		if !data.bundles.contains_key(name) {
			return Err(Error::NotFound(format!("bundle {} does not exist", name)));
		}
		Self::clear_flags(
			&mut data,
			name,
			patch.is_production == Some(true),
			patch.is_staging == Some(true),
		);
		if let Some(bundle) = data.bundles.get_mut(name) {
			if let Some(flag) = patch.is_production {
				bundle.is_production = flag;
			}
			if let Some(flag) = patch.is_staging {
				bundle.is_staging = flag;
			}
			if let Some(flag) = patch.is_archived {
				bundle.is_archived = flag;
			}
			if let Some(flag) = patch.is_dev {
				bundle.is_dev = flag;
			}
		}
		Ok(())
	}

	async fn delete_bundle(&self, name: &str) -> AtResult<()> {
		self.data
			.lock()
			.bundles
			.remove(name)
			.map(|_| ())
			.ok_or_else(|| Error::NotFound(format!("bundle {} does not exist", name)))
	}

	async fn update_project_bundle_override(
		&self,
		project_name: &str,
		channel: Channel,
		bundle_name: Option<&str>,
	) -> AtResult<()> {
		let mut data = self.data.lock();
		let project = data
			.projects
			.get_mut(project_name)
			.ok_or_else(|| Error::NotFound(format!("project {} does not exist", project_name)))?;
		match bundle_name {
			Some(bundle_name) => project.insert(channel, bundle_name.into()),
			None => project.remove(&channel),
		};
		Ok(())
	}
}

#[async_trait]
impl SettingsStore for MemoryStore {
	async fn read_override(
		&self,
		addon_name: &str,
		addon_version: &str,
		variant: &Variant,
		scope: &OverrideScope,
	) -> AtResult<Option<Value>> {
		self.override_reads.fetch_add(1, Ordering::SeqCst);
		if self.failing_addon.lock().as_deref() == Some(addon_name) {
			return Err(Error::StorageError(format!("cannot read overrides of {}", addon_name)));
		}
		// Yield so that concurrent resolutions interleave
		tokio::task::yield_now().await;
		let data = self.data.lock();
		Self::check_project(&data, scope)?;
		let key: OverrideKey =
			(addon_name.into(), addon_version.into(), variant.as_str().into(), scope.clone());
		Ok(data.overrides.get(&key).cloned())
	}

	async fn update_override(
		&self,
		addon_name: &str,
		addon_version: &str,
		variant: &Variant,
		scope: &OverrideScope,
		doc: Option<&Value>,
	) -> AtResult<()> {
		let mut data = self.data.lock();
		Self::check_project(&data, scope)?;
		let key: OverrideKey =
			(addon_name.into(), addon_version.into(), variant.as_str().into(), scope.clone());
		match doc {
			Some(doc) => data.overrides.insert(key, doc.clone()),
			None => data.overrides.remove(&key),
		};
		Ok(())
	}

	async fn read_site_settings(
		&self,
		addon_name: &str,
		addon_version: &str,
		site_id: &str,
	) -> AtResult<Option<Value>> {
		let key: SiteKey = (addon_name.into(), addon_version.into(), site_id.into());
		Ok(self.data.lock().site_settings.get(&key).cloned())
	}

	async fn update_site_settings(
		&self,
		addon_name: &str,
		addon_version: &str,
		site_id: &str,
		doc: Option<&Value>,
	) -> AtResult<()> {
		let key: SiteKey = (addon_name.into(), addon_version.into(), site_id.into());
		let mut data = self.data.lock();
		match doc {
			Some(doc) => data.site_settings.insert(key, doc.clone()),
			None => data.site_settings.remove(&key),
		};
		Ok(())
	}
}

/// Initializes log output for a test
pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
		)
		.try_init();
}

// vim: ts=4
