//! Core state assembled once at start-up

use std::sync::Arc;

use atelier_types::access_store::{AccessGroupStore, ProjectStore};
use atelier_types::addon::AddonCatalogue;
use atelier_types::bundle_store::{BundleRecord, BundleStore};
use atelier_types::settings_store::SettingsStore;

use crate::access::{AccessControl, AccessGroupRegistry};
use crate::bundle::{BundleResolver, CheckBundleResponse, check_bundle};
use crate::config::CoreOpts;
use crate::prelude::*;
use crate::settings::SettingsResolver;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
pub struct CoreState {
	pub opts: CoreOpts,
	pub access: AccessControl,
	pub bundles: BundleResolver,
	pub settings: SettingsResolver,

	pub catalogue: Arc<dyn AddonCatalogue>,
	pub bundle_store: Arc<dyn BundleStore>,
	pub project_store: Arc<dyn ProjectStore>,
}

pub type Core = Arc<CoreState>;

impl CoreState {
	pub fn check_bundle(&self, bundle: &BundleRecord) -> CheckBundleResponse {
		check_bundle(self.catalogue.as_ref(), bundle, &self.opts.server_version)
	}

	/// Validates and stores a new bundle
	pub async fn create_bundle(&self, bundle: &BundleRecord) -> AtResult<CheckBundleResponse> {
		let check = self.check_bundle(bundle);
		if !check.success {
			return Err(Error::ValidationError(check.message()));
		}
		self.bundle_store.create_bundle(bundle).await?;
		info!(bundle = %bundle.name, "Bundle created");
		Ok(check)
	}

	pub async fn create_project(&self, name: &str) -> AtResult<()> {
		self.project_store.create_project(name).await?;
		info!(project = %name, "Project created");
		Ok(())
	}

	/// Deletes a project and drops its access groups from the registry
	pub async fn delete_project(&self, name: &str) -> AtResult<()> {
		self.project_store.delete_project(name).await?;
		info!(project = %name, "Project deleted");
		self.access.registry().load().await?;
		Ok(())
	}
}

#[derive(Debug, Default)]
pub struct CoreBuilder {
	opts: CoreOpts,
	access_group_store: Option<Arc<dyn AccessGroupStore>>,
	project_store: Option<Arc<dyn ProjectStore>>,
	bundle_store: Option<Arc<dyn BundleStore>>,
	settings_store: Option<Arc<dyn SettingsStore>>,
	catalogue: Option<Arc<dyn AddonCatalogue>>,
}

impl CoreBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn opts(mut self, opts: CoreOpts) -> Self {
		self.opts = opts;
		self
	}

	pub fn access_group_store(mut self, store: Arc<dyn AccessGroupStore>) -> Self {
		self.access_group_store = Some(store);
		self
	}

	pub fn project_store(mut self, store: Arc<dyn ProjectStore>) -> Self {
		self.project_store = Some(store);
		self
	}

	pub fn bundle_store(mut self, store: Arc<dyn BundleStore>) -> Self {
		self.bundle_store = Some(store);
		self
	}

	pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
		self.settings_store = Some(store);
		self
	}

	/// Uses one adapter for every store
	pub fn store<S>(self, store: Arc<S>) -> Self
	where
		S: AccessGroupStore + ProjectStore + BundleStore + SettingsStore + 'static,
	{
		self.access_group_store(store.clone())
			.project_store(store.clone())
			.bundle_store(store.clone())
			.settings_store(store)
	}

	pub fn catalogue(mut self, catalogue: Arc<dyn AddonCatalogue>) -> Self {
		self.catalogue = Some(catalogue);
		self
	}

	/// Assembles the core and loads the access group registry, retrying
	/// failed loads as configured
	pub async fn build(self) -> AtResult<Core> {
		fn missing(what: &str) -> Error {
			Error::ConfigError(format!("{} is not configured", what))
		}

		self.opts.validate()?;
		let access_group_store =
			self.access_group_store.ok_or_else(|| missing("access group store"))?;
		let project_store = self.project_store.ok_or_else(|| missing("project store"))?;
		let bundle_store = self.bundle_store.ok_or_else(|| missing("bundle store"))?;
		let settings_store = self.settings_store.ok_or_else(|| missing("settings store"))?;
		let catalogue = self.catalogue.ok_or_else(|| missing("addon catalogue"))?;

		let registry =
			Arc::new(AccessGroupRegistry::new(access_group_store.clone(), project_store.clone()));
		let mut attempt = 0;
		loop {
			match registry.load().await {
				Ok(_) => break,
				Err(err) if attempt < self.opts.load_retries => {
					attempt += 1;
					warn!(attempt, "Access group registry load failed: {}", err);
					tokio::time::sleep(self.opts.load_retry_delay).await;
				}
				Err(err) => {
					error!("Access group registry load failed: {}", err);
					return Err(err);
				}
			}
		}

		let bundles = BundleResolver::new(bundle_store.clone(), catalogue.clone());
		let settings = SettingsResolver::new(
			bundles.clone(),
			catalogue.clone(),
			settings_store,
			self.opts.include_broken_detail,
		);

		info!(version = VERSION, access_groups = registry.len(), "Core initialized");
		Ok(Arc::new(CoreState {
			opts: self.opts,
			access: AccessControl::new(registry, access_group_store),
			bundles,
			settings,
			catalogue,
			bundle_store,
			project_store,
		}))
	}
}

// vim: ts=4
