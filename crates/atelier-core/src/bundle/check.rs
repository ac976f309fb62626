//! Bundle validation against the addon catalogue

use serde::Serialize;
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;

use atelier_types::addon::{AddonCatalogue, AddonCompatibility};
use atelier_types::bundle_store::BundleRecord;

use super::version::is_compatible;
use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
	Error,
	Warning,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleIssue {
	pub severity: IssueSeverity,
	pub addon: Option<Box<str>>,
	pub message: Box<str>,
	pub required_addon: Option<Box<str>>,
}

impl BundleIssue {
	fn error(addon: &str, message: String, required_addon: Option<&str>) -> Self {
		Self {
			severity: IssueSeverity::Error,
			addon: Some(addon.into()),
			message: message.into(),
			required_addon: required_addon.map(Into::into),
		}
	}

	fn warning(addon: &str, message: String, required_addon: &str) -> Self {
		Self {
			severity: IssueSeverity::Warning,
			addon: Some(addon.into()),
			message: message.into(),
			required_addon: Some(required_addon.into()),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckBundleResponse {
	pub success: bool,
	pub issues: Vec<BundleIssue>,
}

impl CheckBundleResponse {
	/// Human readable summary naming the last error
	pub fn message(&self) -> String {
		if self.success {
			return "Bundle is valid".into();
		}
		self.issues
			.iter()
			.rev()
			.find(|issue| issue.severity == IssueSeverity::Error)
			.map_or_else(
				|| "Failed to validate bundle".into(),
				|issue| {
					format!(
						"Failed to validate bundle: {}: {}",
						issue.addon.as_deref().unwrap_or("-"),
						issue.message
					)
				},
			)
	}
}

fn check_requirements(
	issues: &mut Vec<BundleIssue>,
	addon_name: &str,
	compat: &AddonCompatibility,
	bundle_addons: &BTreeMap<&str, &str>,
) {
	for (r_name, r_version) in &compat.required_addons {
		match (bundle_addons.get(&**r_name), r_version) {
			(None, None) => {}
			(None, Some(_)) => {
				issues.push(BundleIssue::error(
					addon_name,
					format!("{} is required", r_name),
					Some(&**r_name),
				));
			}
			(Some(_), None) => {
				issues.push(BundleIssue::error(
					addon_name,
					format!("{} must not be used", r_name),
					Some(&**r_name),
				));
			}
			(Some(b_version), Some(r_version)) => {
				if !is_compatible(b_version, r_version) {
					issues.push(BundleIssue::error(
						addon_name,
						format!("{} {} is required", r_name, r_version),
						Some(&**r_name),
					));
				}
			}
		}
	}

	for (r_name, r_version) in &compat.soft_required_addons {
		if let (Some(b_version), Some(r_version)) = (bundle_addons.get(&**r_name), r_version) {
			if !is_compatible(b_version, r_version) {
				issues.push(BundleIssue::error(
					addon_name,
					format!("{} {} is required", r_name, r_version),
					Some(&**r_name),
				));
			}
		}
	}

	for (r_name, r_version) in &compat.compatible_addons {
		if let (Some(b_version), Some(r_version)) = (bundle_addons.get(&**r_name), r_version) {
			if !is_compatible(b_version, r_version) {
				issues.push(BundleIssue::warning(
					addon_name,
					format!("only compatible with {} {}", r_name, r_version),
					r_name,
				));
			}
		}
	}
}

/// Validates that every addon of a bundle is installed and that the
/// compatibility requirements of the addons hold.
///
/// Warnings do not make the check fail.
pub fn check_bundle(
	catalogue: &dyn AddonCatalogue,
	bundle: &BundleRecord,
	server_version: &str,
) -> CheckBundleResponse {
	let mut issues = Vec::new();
	let bundle_addons: BTreeMap<&str, &str> = bundle
		.addons
		.iter()
		.filter_map(|(name, version)| Some((&**name, version.as_deref()?)))
		.collect();

	for system_addon in catalogue.system_addons() {
		if !bundle_addons.contains_key(&*system_addon) {
			issues.push(BundleIssue::error(
				&system_addon,
				"System addon must be included in the bundle".into(),
				None,
			));
		}
	}

	for (&addon_name, &addon_version) in &bundle_addons {
		let Ok(info) = catalogue.read_addon(addon_name, addon_version) else {
			issues.push(BundleIssue::error(
				addon_name,
				format!("{} {} is not active", addon_name, addon_version),
				Some(addon_name),
			));
			continue;
		};
		let Some(compat) = &info.compatibility else {
			continue;
		};

		if let Some(required) = &compat.server_version {
			if !is_compatible(server_version, required) {
				issues.push(BundleIssue::error(
					addon_name,
					format!("Server {} is required", required),
					None,
				));
			}
		}

		if let Some(required) = &compat.launcher_version {
			let Some(installer_version) = &bundle.installer_version else {
				issues.push(BundleIssue::error(addon_name, "Launcher is required".into(), None));
				continue;
			};
			if !is_compatible(installer_version, required) {
				issues.push(BundleIssue::error(
					addon_name,
					format!("Launcher {} is required", required),
					None,
				));
			}
		}

		check_requirements(&mut issues, addon_name, compat, &bundle_addons);
	}

	let success = !issues.iter().any(|issue| issue.severity == IssueSeverity::Error);
	if !success {
		info!(bundle = %bundle.name, issues = issues.len(), "Bundle check failed");
	}
	CheckBundleResponse { success, issues }
}

// vim: ts=4
