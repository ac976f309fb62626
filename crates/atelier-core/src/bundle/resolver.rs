//! Selection of the addon bundle used by a project and variant

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use atelier_types::addon::AddonCatalogue;
use atelier_types::bundle_store::{BundleRecord, BundleStore};

use crate::prelude::*;

/// Addon versions effective for one project and variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBundle {
	pub bundle_name: Box<str>,
	/// Addon name to version; addons removed from the bundle are absent
	pub addons: BTreeMap<Box<str>, Box<str>>,
	/// Addons forced to the studio version because they do not allow a
	/// project override
	pub inherited_addons: BTreeSet<Box<str>>,
	pub has_project_override: bool,
}

/// Addon name to (variant name to pinned version)
pub type ActiveVersions = BTreeMap<Box<str>, BTreeMap<Box<str>, Option<Box<str>>>>;

fn pinned_addons(bundle: &BundleRecord) -> BTreeMap<Box<str>, Box<str>> {
	bundle
		.addons
		.iter()
		.filter_map(|(name, version)| Some((name.clone(), version.clone()?)))
		.collect()
}

#[derive(Debug, Clone)]
pub struct BundleResolver {
	bundles: Arc<dyn BundleStore>,
	catalogue: Arc<dyn AddonCatalogue>,
}

impl BundleResolver {
	pub fn new(bundles: Arc<dyn BundleStore>, catalogue: Arc<dyn AddonCatalogue>) -> Self {
		Self { bundles, catalogue }
	}

	async fn read_named_bundle(&self, name: &str) -> AtResult<BundleRecord> {
		self.bundles
			.read_bundle(name)
			.await?
			.ok_or_else(|| Error::NotFound(format!("bundle {} does not exist", name)))
	}

	async fn read_studio_bundle(&self, channel: Channel) -> AtResult<BundleRecord> {
		self.bundles.read_flagged_bundle(channel).await?.ok_or_else(|| {
			Error::NotFound(format!("studio bundle not set for variant {}", channel))
		})
	}

	/// Picks the bundle for a project (or the studio when `None`) and variant.
	///
	/// Named variants use the explicitly requested bundle, or the bundle named
	/// after the variant. An explicit bundle for production or staging is used
	/// as is. Otherwise a project bundle override wins over the studio bundle
	/// flagged for the variant, except for addons that do not allow a project
	/// to pin another version: those keep the studio version.
	pub async fn resolve(
		&self,
		project_name: Option<&str>,
		variant: &Variant,
		explicit_bundle: Option<&str>,
	) -> AtResult<ResolvedBundle> {
		let Some(channel) = variant.channel() else {
			let name = explicit_bundle.unwrap_or(variant.as_str());
			let bundle = self.read_named_bundle(name).await?;
			return Ok(ResolvedBundle {
				addons: pinned_addons(&bundle),
				bundle_name: bundle.name,
				..Default::default()
			});
		};

		if let Some(name) = explicit_bundle {
			let bundle = self.read_named_bundle(name).await?;
			return Ok(ResolvedBundle {
				addons: pinned_addons(&bundle),
				bundle_name: bundle.name,
				..Default::default()
			});
		}

		let project_bundle_name = match project_name {
			Some(project_name) => {
				self.bundles.read_project_bundle_override(project_name, channel).await?
			}
			None => None,
		};

		let studio_bundle = self.read_studio_bundle(channel).await?;
		let Some(project_bundle_name) = project_bundle_name else {
			return Ok(ResolvedBundle {
				addons: pinned_addons(&studio_bundle),
				bundle_name: studio_bundle.name,
				..Default::default()
			});
		};

		let project_bundle = self.read_named_bundle(&project_bundle_name).await?;
		let mut addons = pinned_addons(&project_bundle);
		let mut inherited_addons = BTreeSet::new();

		for (addon_name, studio_version) in &studio_bundle.addons {
			match self.catalogue.project_can_override_addon_version(addon_name) {
				None => {
					debug!(addon = %addon_name, "Unknown studio addon skipped");
					continue;
				}
				Some(true) => continue,
				Some(false) => {}
			}
			match studio_version {
				Some(version) => addons.insert(addon_name.clone(), version.clone()),
				None => addons.remove(addon_name),
			};
			inherited_addons.insert(addon_name.clone());
		}

		debug!(
			bundle = %project_bundle.name,
			inherited = inherited_addons.len(),
			"Project bundle override resolved"
		);
		Ok(ResolvedBundle {
			bundle_name: project_bundle.name,
			addons,
			inherited_addons,
			has_project_override: true,
		})
	}

	/// Version of one addon for a project and variant, `None` if the bundle
	/// does not include it
	pub async fn addon_version_for_variant(
		&self,
		addon_name: &str,
		project_name: Option<&str>,
		variant: &Variant,
	) -> AtResult<Option<Box<str>>> {
		let bundle = self.resolve(project_name, variant, None).await?;
		Ok(bundle.addons.get(addon_name).cloned())
	}

	/// For every installed addon, the version pinned by the production and
	/// staging bundles and by each dev bundle (keyed by bundle name)
	pub async fn active_versions(&self) -> AtResult<ActiveVersions> {
		let bundles = self.bundles.list_bundles().await?;

		let mut by_variant: BTreeMap<Box<str>, Option<&BundleRecord>> = BTreeMap::new();
		for channel in Channel::ALL {
			by_variant.insert(channel.as_str().into(), None);
		}
		for bundle in &bundles {
			if bundle.is_dev {
				by_variant.insert(bundle.name.clone(), Some(bundle));
				continue;
			}
			for channel in Channel::ALL {
				if bundle.is_flagged(channel) {
					by_variant.insert(channel.as_str().into(), Some(bundle));
				}
			}
		}

		Ok(self
			.catalogue
			.addon_names()
			.into_iter()
			.map(|addon_name| {
				let versions = by_variant
					.iter()
					.map(|(variant, bundle)| {
						let version =
							bundle.and_then(|b| b.addon_version(&addon_name)).map(Box::<str>::from);
						(variant.clone(), version)
					})
					.collect();
				(addon_name, versions)
			})
			.collect())
	}

	/// Installed addons with the version a variant pins, if any
	pub async fn addon_versions_by_variant(
		&self,
		variant: &str,
	) -> AtResult<BTreeMap<Box<str>, Option<Box<str>>>> {
		Ok(self
			.active_versions()
			.await?
			.into_iter()
			.map(|(addon_name, mut versions)| {
				let version = versions.remove(variant).flatten();
				(addon_name, version)
			})
			.collect())
	}
}

// vim: ts=4
