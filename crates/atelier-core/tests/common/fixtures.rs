//! Reusable studio fixtures
//!
//! Addons: `core` (system, pinned to the studio version), `maya` (projects may
//! pin another version), `kitsu` (no settings model). `nuke 0.9.0` is broken.
//!
//! Bundles: `prod` (production), `staging` (staging), `dev-alice` (dev),
//! `demo-bundle` (used by the `demo` project for production).

use serde_json::{Value, json};
use std::sync::Arc;

use atelier_core::{AddonLibrary, Core, CoreBuilder, CoreOpts};
use atelier_types::access_store::{AccessGroupStore, ProjectStore};
use atelier_types::addon::AddonVersionInfo;
use atelier_types::bundle_store::{BundleRecord, BundleStore};
use atelier_types::prelude::*;
use atelier_types::types::SettingsScope;

use super::adapters::MemoryStore;

pub fn core_defaults() -> Value {
	json!({
		"studio_name": "Studio",
		"imageio": { "ocio": { "enabled": false, "config": "default" } }
	})
}

pub fn maya_defaults() -> Value {
	json!({
		"fps": 25,
		"publish": { "validate": true, "families": ["model"] },
		"local_cache": { "path": "" }
	})
}

fn core_addon(version: &str) -> AddonVersionInfo {
	let mut info = AddonVersionInfo::new("core", version);
	info.title = Some("Core".into());
	info.is_system = true;
	info.default_settings = Some(core_defaults());
	info.site_settings = Some(json!({ "local_root": "/mnt/projects", "threads": 4 }));
	info
}

fn maya_addon(version: &str) -> AddonVersionInfo {
	let mut info = AddonVersionInfo::new("maya", version);
	info.title = Some("Maya".into());
	info.project_can_override_addon_version = true;
	info.default_settings = Some(maya_defaults());
	info.field_scopes.insert("local_cache".into(), vec![SettingsScope::Site]);
	info
}

pub fn library() -> AddonLibrary {
	let mut builder = AddonLibrary::builder();
	for info in [core_addon("1.0.0"), core_addon("1.1.0"), maya_addon("1.0.0"), maya_addon("2.0.0")] {
		builder.register(info).expect("addon registers");
	}
	let mut kitsu = AddonVersionInfo::new("kitsu", "1.0.0");
	kitsu.title = Some("kitsu".into());
	builder.register(kitsu).expect("addon registers");
	builder.mark_broken("nuke", "0.9.0", "Unable to initialize addon", Some("ImportError: nuke"));
	builder.freeze()
}

fn bundle(name: &str, addons: &[(&str, &str)]) -> BundleRecord {
	addons.iter().fold(BundleRecord::new(name), |bundle, (addon, version)| {
		bundle.with_addon(addon, version)
	})
}

pub fn artist_group() -> Value {
	json!({
		"read": {
			"enabled": true,
			"access_list": [{ "access_type": "hierarchy", "path": "assets" }]
		},
		"endpoints": { "enabled": true, "endpoints": ["get_folder", "get_task"] },
		"publish": { "enabled": true }
	})
}

pub fn supervisor_group() -> Value {
	json!({
		"studio_settings": { "enabled": true, "addons": ["core"] },
		"project_settings": { "enabled": true, "addons": ["maya"], "anatomy_update": true },
		"publish": { "enabled": true }
	})
}

pub fn demo_artist_group() -> Value {
	json!({
		"read": {
			"enabled": true,
			"access_list": [{ "access_type": "children", "path": "shots" }]
		},
		"publish": { "enabled": false }
	})
}

/// Store populated with projects, bundles and access groups
pub async fn studio_store() -> Arc<MemoryStore> {
	let store = Arc::new(MemoryStore::new());
	store.create_project("demo").await.expect("project");
	store.create_project("plain").await.expect("project");

	let mut prod = bundle("prod", &[("core", "1.0.0"), ("maya", "1.0.0"), ("kitsu", "1.0.0")]);
	prod.is_production = true;
	let mut staging = bundle("staging", &[("core", "1.1.0"), ("maya", "2.0.0")]);
	staging.is_staging = true;
	let mut dev = bundle("dev-alice", &[("core", "1.1.0"), ("maya", "2.0.0")]);
	dev.is_dev = true;
	let mut demo = bundle("demo-bundle", &[("core", "1.1.0"), ("maya", "2.0.0")]);
	demo.addons.insert("kitsu".into(), None);

	for bundle in [prod, staging, dev, demo] {
		store.create_bundle(&bundle).await.expect("bundle");
	}
	store
		.update_project_bundle_override("demo", Channel::Production, Some("demo-bundle"))
		.await
		.expect("bundle override");

	store.update_access_group(&Scope::Studio, "artist", &artist_group()).await.expect("group");
	store
		.update_access_group(&Scope::Studio, "supervisor", &supervisor_group())
		.await
		.expect("group");
	store
		.update_access_group(&Scope::project("demo"), "artist", &demo_artist_group())
		.await
		.expect("group");
	store
}

pub async fn build_core(store: Arc<MemoryStore>) -> Core {
	let opts = CoreOpts {
		load_retries: 2,
		load_retry_delay: std::time::Duration::from_millis(1),
		server_version: "1.5.0".into(),
		include_broken_detail: true,
	};
	CoreBuilder::new()
		.opts(opts)
		.store(store)
		.catalogue(Arc::new(library()))
		.build()
		.await
		.expect("core builds")
}

// vim: ts=4
