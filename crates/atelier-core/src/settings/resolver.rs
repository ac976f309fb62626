//! Layered addon settings resolution
//!
//! Settings of an addon version are resolved by merging, in order, the addon
//! defaults, the studio overrides, the project overrides and the project site
//! overrides. Missing layers are skipped.

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use serde_with::skip_serializing_none;
use std::sync::Arc;

use atelier_types::addon::{AddonCatalogue, AddonVersionInfo, BrokenReason};
use atelier_types::settings_store::SettingsStore;
use atelier_types::types::SettingsScope;

use super::overrides::{apply_overrides, extract_overrides};
use crate::bundle::BundleResolver;
use crate::prelude::*;

/// Merged settings of one addon version
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSettings {
	pub settings: Value,
	pub has_studio_overrides: bool,
	pub has_project_overrides: bool,
	pub has_project_site_overrides: bool,
}

/// Settings request for every addon of a bundle
#[derive(Debug, Clone, Default)]
pub struct SettingsQuery {
	/// Studio settings when `None`
	pub project: Option<Box<str>>,
	pub site: Option<Box<str>>,
	pub variant: Variant,
	/// Bundle to use instead of the one the variant selects
	pub bundle: Option<Box<str>>,
	/// Leave the settings documents out
	pub summary: bool,
}

impl SettingsQuery {
	pub fn studio(variant: Variant) -> Self {
		Self { variant, ..Default::default() }
	}

	pub fn project(project_name: &str, variant: Variant) -> Self {
		Self { project: Some(project_name.into()), variant, ..Default::default() }
	}

	pub fn with_site(mut self, site_id: &str) -> Self {
		self.site = Some(site_id.into());
		self
	}

	pub fn with_bundle(mut self, bundle_name: &str) -> Self {
		self.bundle = Some(bundle_name.into());
		self
	}

	pub fn summary(mut self) -> Self {
		self.summary = true;
		self
	}
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonSettings {
	pub name: Box<str>,
	pub version: Box<str>,
	pub title: Box<str>,
	pub has_settings: bool,
	pub has_project_settings: bool,
	pub has_project_site_settings: bool,
	pub has_site_settings: bool,
	/// `None` when the addon has no settings model
	pub has_studio_overrides: Option<bool>,
	pub has_project_overrides: Option<bool>,
	pub has_project_site_overrides: Option<bool>,
	pub settings: Value,
	pub site_settings: Option<Value>,
	pub is_broken: bool,
	pub reason: Option<BrokenReason>,
}

impl AddonSettings {
	fn broken(name: &str, version: &str, reason: Option<BrokenReason>) -> Self {
		Self {
			name: name.into(),
			version: version.into(),
			title: name.into(),
			has_settings: false,
			has_project_settings: false,
			has_project_site_settings: false,
			has_site_settings: false,
			has_studio_overrides: None,
			has_project_overrides: None,
			has_project_site_overrides: None,
			settings: Value::Object(serde_json::Map::new()),
			site_settings: None,
			is_broken: reason.is_some(),
			reason,
		}
	}
}

/// Settings of every addon of the resolved bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllSettings {
	pub bundle_name: Box<str>,
	/// Sorted by lower-cased title
	pub addons: Vec<AddonSettings>,
	pub inherited_addons: Vec<Box<str>>,
}

#[derive(Debug, Clone)]
pub struct SettingsResolver {
	bundles: BundleResolver,
	catalogue: Arc<dyn AddonCatalogue>,
	store: Arc<dyn SettingsStore>,
	include_broken_detail: bool,
}

impl SettingsResolver {
	pub fn new(
		bundles: BundleResolver,
		catalogue: Arc<dyn AddonCatalogue>,
		store: Arc<dyn SettingsStore>,
		include_broken_detail: bool,
	) -> Self {
		Self { bundles, catalogue, store, include_broken_detail }
	}

	async fn apply_layer(
		&self,
		settings: &mut Value,
		addon: &AddonVersionInfo,
		variant: &Variant,
		scope: &OverrideScope,
	) -> AtResult<bool> {
		let Some(overrides) =
			self.store.read_override(&addon.name, &addon.version, variant, scope).await?
		else {
			return Ok(false);
		};
		trace!(addon = %addon.name, scope = %scope, "Applying settings overrides");
		apply_overrides(settings, &overrides);
		Ok(true)
	}

	/// Merged settings of an addon version for the studio, a project, or a
	/// project and site. `None` if the addon has no settings model.
	///
	/// A site without a project resolves to the studio settings.
	pub async fn resolve(
		&self,
		addon: &AddonVersionInfo,
		project_name: Option<&str>,
		site_id: Option<&str>,
		variant: &Variant,
	) -> AtResult<Option<ResolvedSettings>> {
		let Some(defaults) = &addon.default_settings else {
			return Ok(None);
		};
		let mut settings = defaults.clone();

		let has_studio_overrides =
			self.apply_layer(&mut settings, addon, variant, &OverrideScope::Studio).await?;

		let mut has_project_overrides = false;
		let mut has_project_site_overrides = false;
		if let Some(project_name) = project_name {
			let scope = OverrideScope::Project(project_name.into());
			has_project_overrides = self.apply_layer(&mut settings, addon, variant, &scope).await?;

			if let Some(site_id) = site_id {
				let scope = OverrideScope::ProjectSite {
					project_name: project_name.into(),
					site_id: site_id.into(),
				};
				has_project_site_overrides =
					self.apply_layer(&mut settings, addon, variant, &scope).await?;
			}
		}

		Ok(Some(ResolvedSettings {
			settings,
			has_studio_overrides,
			has_project_overrides,
			has_project_site_overrides,
		}))
	}

	/// Settings of an addon at the version the bundle of the project and
	/// variant pins
	pub async fn resolve_addon(
		&self,
		addon_name: &str,
		project_name: Option<&str>,
		site_id: Option<&str>,
		variant: &Variant,
	) -> AtResult<Option<ResolvedSettings>> {
		let version = self
			.bundles
			.addon_version_for_variant(addon_name, project_name, variant)
			.await?
			.ok_or_else(|| {
				Error::NotFound(format!("addon {} is not in the {} bundle", addon_name, variant))
			})?;
		let addon = self.catalogue.read_addon(addon_name, &version)?;
		self.resolve(&addon, project_name, site_id, variant).await
	}

	/// Site settings defaults with the stored site settings applied.
	/// `None` if the addon has no site settings model.
	pub async fn resolve_site_settings(
		&self,
		addon: &AddonVersionInfo,
		site_id: &str,
	) -> AtResult<Option<Value>> {
		let Some(defaults) = &addon.site_settings else {
			return Ok(None);
		};
		let mut site_settings = defaults.clone();
		if let Some(stored) =
			self.store.read_site_settings(&addon.name, &addon.version, site_id).await?
		{
			apply_overrides(&mut site_settings, &stored);
		}
		Ok(Some(site_settings))
	}

	/// Settings of the layers below a scope
	async fn resolve_below(
		&self,
		addon: &AddonVersionInfo,
		variant: &Variant,
		scope: &OverrideScope,
	) -> AtResult<Value> {
		let Some(defaults) = &addon.default_settings else {
			return Err(Error::ValidationError(format!("addon {} has no settings", addon.name)));
		};
		let mut settings = defaults.clone();
		match scope {
			OverrideScope::Studio => {}
			OverrideScope::Project(_) => {
				self.apply_layer(&mut settings, addon, variant, &OverrideScope::Studio).await?;
			}
			OverrideScope::ProjectSite { project_name, .. } => {
				self.apply_layer(&mut settings, addon, variant, &OverrideScope::Studio).await?;
				let project = OverrideScope::Project(project_name.clone());
				self.apply_layer(&mut settings, addon, variant, &project).await?;
			}
		}
		Ok(settings)
	}

	/// Stores the overrides needed to turn the settings of the layers below
	/// `scope` into `settings`. The stored overrides are removed when the
	/// layers below already match.
	pub async fn save_settings(
		&self,
		addon: &AddonVersionInfo,
		variant: &Variant,
		scope: &OverrideScope,
		settings: &Value,
	) -> AtResult<()> {
		if !settings.is_object() {
			return Err(Error::ValidationError("settings must be an object".into()));
		}
		let below = self.resolve_below(addon, variant, scope).await?;
		let overrides = extract_overrides(&below, settings);
		self.store
			.update_override(&addon.name, &addon.version, variant, scope, overrides.as_ref())
			.await?;
		info!(addon = %addon.name, version = %addon.version, scope = %scope, "Settings saved");
		Ok(())
	}

	/// Removes every override of an addon version at a scope
	pub async fn clear_overrides(
		&self,
		addon: &AddonVersionInfo,
		variant: &Variant,
		scope: &OverrideScope,
	) -> AtResult<()> {
		self.store.update_override(&addon.name, &addon.version, variant, scope, None).await
	}

	async fn resolve_entry(
		&self,
		name: &str,
		version: &str,
		query: &SettingsQuery,
	) -> AddonSettings {
		let addon = match self.catalogue.read_addon(name, version) {
			Ok(addon) => addon,
			Err(_) => {
				warn!(addon = %name, version = %version, "Addon declared in bundle is not installed");
				let reason = self.catalogue.broken_reason(name, version).map(|r| self.redact(r));
				return AddonSettings::broken(name, version, reason);
			}
		};

		let loaded = async {
			let site_settings = match query.site.as_deref() {
				Some(site_id) => self.resolve_site_settings(&addon, site_id).await?,
				None => None,
			};
			let settings = self
				.resolve(&addon, query.project.as_deref(), query.site.as_deref(), &query.variant)
				.await?;
			AtResult::Ok((settings, site_settings))
		}
		.await;

		let (settings, site_settings) = match loaded {
			Ok(loaded) => loaded,
			Err(err) => {
				warn!(addon = %name, version = %version, "Unable to load settings: {}", err);
				let mut reason = BrokenReason::new();
				reason.insert("error".into(), "Unable to load settings".into());
				reason.insert("detail".into(), err.to_string().into());
				return AddonSettings::broken(name, version, Some(self.redact(reason)));
			}
		};

		let settings_doc = match &settings {
			Some(resolved) if !query.summary => resolved.settings.clone(),
			_ => Value::Object(serde_json::Map::new()),
		};
		AddonSettings {
			name: name.into(),
			version: version.into(),
			title: addon.title().into(),
			has_settings: addon.has_scope(SettingsScope::Studio),
			has_project_settings: addon.has_scope(SettingsScope::Project),
			has_project_site_settings: addon.has_scope(SettingsScope::Site),
			has_site_settings: addon.site_settings.is_some(),
			has_studio_overrides: settings.as_ref().map(|s| s.has_studio_overrides),
			has_project_overrides: settings.as_ref().map(|s| s.has_project_overrides),
			has_project_site_overrides: settings.as_ref().map(|s| s.has_project_site_overrides),
			settings: settings_doc,
			site_settings,
			is_broken: false,
			reason: None,
		}
	}

	fn redact(&self, mut reason: BrokenReason) -> BrokenReason {
		if !self.include_broken_detail {
			reason.remove("detail");
		}
		reason
	}

	/// Settings of every addon in the bundle selected by the query.
	///
	/// Addons are resolved concurrently. An addon that cannot be loaded is
	/// reported as broken instead of failing the whole request.
	pub async fn resolve_all(&self, query: &SettingsQuery) -> AtResult<AllSettings> {
		let bundle = self
			.bundles
			.resolve(query.project.as_deref(), &query.variant, query.bundle.as_deref())
			.await?;

		let mut addons = join_all(
			bundle
				.addons
				.iter()
				.map(|(name, version)| self.resolve_entry(name, version, query)),
		)
		.await;
		addons.sort_by_cached_key(|addon| addon.title.to_lowercase());

		let broken = addons.iter().filter(|addon| addon.is_broken).count();
		debug!(
			bundle = %bundle.bundle_name,
			addons = addons.len(),
			broken,
			inherited = ?bundle.inherited_addons,
			"Settings resolved"
		);

		Ok(AllSettings {
			bundle_name: bundle.bundle_name,
			addons,
			inherited_addons: bundle.inherited_addons.into_iter().collect(),
		})
	}
}

// vim: ts=4
