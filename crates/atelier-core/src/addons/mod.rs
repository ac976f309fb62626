//! In-process addon catalogue
//!
//! Addon versions are registered into a mutable [`AddonLibraryBuilder`] while
//! the server initializes, then frozen into an immutable [`AddonLibrary`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use atelier_types::addon::{AddonCatalogue, AddonVersionInfo, BrokenReason};

use crate::bundle::version::Version;
use crate::prelude::*;

type AddonVersions = BTreeMap<Box<str>, Arc<AddonVersionInfo>>;

/// Mutable addon catalogue used during initialization
#[derive(Debug, Default)]
pub struct AddonLibraryBuilder {
	addons: BTreeMap<Box<str>, AddonVersions>,
	broken: HashMap<(Box<str>, Box<str>), BrokenReason>,
}

impl AddonLibraryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an addon version
	pub fn register(&mut self, info: AddonVersionInfo) -> AtResult<()> {
		if info.name.is_empty() || info.version.is_empty() {
			return Err(Error::ConfigError("Addon name and version must not be empty".into()));
		}
		let versions = self.addons.entry(info.name.clone()).or_default();
		if versions.contains_key(&info.version) {
			return Err(Error::ConfigError(format!(
				"Addon {} {} is already registered",
				info.name, info.version
			)));
		}
		debug!("Registering addon {} {}", info.name, info.version);
		versions.insert(info.version.clone(), Arc::new(info));
		Ok(())
	}

	/// Records an addon version that failed to initialize
	pub fn mark_broken(&mut self, name: &str, version: &str, error: &str, detail: Option<&str>) {
		warn!(addon = %name, version = %version, "Addon is broken: {}", error);
		let mut reason = BrokenReason::new();
		reason.insert("error".into(), error.into());
		if let Some(detail) = detail {
			reason.insert("detail".into(), detail.into());
		}
		self.broken.insert((name.into(), version.into()), reason);
	}

	pub fn freeze(self) -> AddonLibrary {
		info!("Freezing addon library with {} addons", self.addons.len());
		AddonLibrary { addons: self.addons, broken: self.broken }
	}
}

/// Immutable addon catalogue
#[derive(Debug, Default)]
pub struct AddonLibrary {
	addons: BTreeMap<Box<str>, AddonVersions>,
	broken: HashMap<(Box<str>, Box<str>), BrokenReason>,
}

impl AddonLibrary {
	pub fn builder() -> AddonLibraryBuilder {
		AddonLibraryBuilder::new()
	}

	/// Registered versions of an addon, in ascending string order
	pub fn versions(&self, name: &str) -> Vec<Box<str>> {
		self.addons.get(name).map(|v| v.keys().cloned().collect()).unwrap_or_default()
	}

	pub fn is_broken(&self, name: &str, version: &str) -> bool {
		self.broken.contains_key(&(Box::<str>::from(name), Box::<str>::from(version)))
	}

	pub fn len(&self) -> usize {
		self.addons.len()
	}

	pub fn is_empty(&self) -> bool {
		self.addons.is_empty()
	}
}

impl AddonCatalogue for AddonLibrary {
	fn read_addon(&self, name: &str, version: &str) -> AtResult<Arc<AddonVersionInfo>> {
		self.addons
			.get(name)
			.and_then(|versions| versions.get(version))
			.cloned()
			.ok_or_else(|| Error::NotFound(format!("addon {} {} is not installed", name, version)))
	}

	/// Taken from the newest installed version
	fn project_can_override_addon_version(&self, name: &str) -> Option<bool> {
		self.addons
			.get(name)?
			.values()
			.max_by_key(|info| (Version::parse(&info.version).ok(), info.version.clone()))
			.map(|info| info.project_can_override_addon_version)
	}

	fn broken_reason(&self, name: &str, version: &str) -> Option<BrokenReason> {
		self.broken.get(&(Box::<str>::from(name), Box::<str>::from(version))).cloned()
	}

	fn system_addons(&self) -> Vec<Box<str>> {
		self.addons
			.iter()
			.filter(|(_, versions)| versions.values().any(|info| info.is_system))
			.map(|(name, _)| name.clone())
			.collect()
	}

	fn addon_names(&self) -> Vec<Box<str>> {
		self.addons.keys().cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn library() -> AddonLibrary {
		let mut builder = AddonLibrary::builder();
		let mut core = AddonVersionInfo::new("core", "1.0.0");
		core.is_system = true;
		assert!(builder.register(core).is_ok());
		assert!(builder.register(AddonVersionInfo::new("maya", "1.0.0")).is_ok());
		assert!(builder.register(AddonVersionInfo::new("maya", "1.1.0")).is_ok());
		builder.mark_broken("nuke", "0.9.0", "ImportError", Some("No module named nuke"));
		builder.freeze()
	}

	#[test]
	fn test_duplicate_registration_fails() {
		let mut builder = AddonLibrary::builder();
		assert!(builder.register(AddonVersionInfo::new("maya", "1.0.0")).is_ok());
		let res = builder.register(AddonVersionInfo::new("maya", "1.0.0"));
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_read_addon() {
		let library = library();
		let info = library.read_addon("maya", "1.1.0");
		assert_eq!(info.map(|i| i.version.clone()).ok(), Some("1.1.0".into()));
		assert!(library.read_addon("maya", "2.0.0").is_err_and(|e| e.is_not_found()));
		let versions: Vec<Box<str>> = vec!["1.0.0".into(), "1.1.0".into()];
		assert_eq!(library.versions("maya"), versions);
	}

	#[test]
	fn test_broken_and_system_addons() {
		let library = library();
		assert!(library.is_broken("nuke", "0.9.0"));
		let reason = library.broken_reason("nuke", "0.9.0").expect("broken reason");
		assert_eq!(reason.get("error").map(|e| &**e), Some("ImportError"));
		assert!(library.broken_reason("maya", "1.0.0").is_none());
		assert_eq!(library.system_addons(), vec![Box::<str>::from("core")]);
		assert_eq!(library.addon_names().len(), 2);
	}

	#[test]
	fn test_override_flag_follows_newest_version() {
		let mut builder = AddonLibrary::builder();
		for (version, can_override) in [("1.9.0", false), ("1.10.0", true), ("1.2.0", false)] {
			let mut info = AddonVersionInfo::new("houdini", version);
			info.project_can_override_addon_version = can_override;
			assert!(builder.register(info).is_ok());
		}
		let library = builder.freeze();

		assert_eq!(library.project_can_override_addon_version("houdini"), Some(true));
		assert_eq!(library.project_can_override_addon_version("ghost"), None);
	}
}

// vim: ts=4
