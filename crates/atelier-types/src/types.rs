//! Common types used throughout the Atelier core.

use serde::{Deserialize, Serialize};

/// Storage name of the studio-wide wildcard scope
pub const STUDIO_SCOPE: &str = "_";

// Scope //
//*******//
/// Access group scope: the studio-wide wildcard or one project
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
	Studio,
	Project(Box<str>),
}

impl Scope {
	pub fn project(name: impl Into<Box<str>>) -> Self {
		Scope::Project(name.into())
	}

	/// Parse a storage name, `_` being the studio scope
	pub fn from_name(name: &str) -> Self {
		if name == STUDIO_SCOPE { Scope::Studio } else { Scope::Project(name.into()) }
	}

	/// Studio scope when no project is given
	pub fn from_project(project_name: Option<&str>) -> Self {
		project_name.map_or(Scope::Studio, Scope::from_name)
	}

	pub fn is_studio(&self) -> bool {
		matches!(self, Scope::Studio)
	}

	pub fn as_str(&self) -> &str {
		match self {
			Scope::Studio => STUDIO_SCOPE,
			Scope::Project(name) => name,
		}
	}

	pub fn project_name(&self) -> Option<&str> {
		match self {
			Scope::Studio => None,
			Scope::Project(name) => Some(name),
		}
	}
}

impl std::fmt::Display for Scope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl Serialize for Scope {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for Scope {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let name = String::deserialize(deserializer)?;
		Ok(Scope::from_name(&name))
	}
}

// Channel //
//*********//
/// Release channels a studio bundle can be flagged for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
	Production,
	Staging,
}

impl Channel {
	pub const ALL: [Channel; 2] = [Channel::Production, Channel::Staging];

	pub fn as_str(&self) -> &'static str {
		match self {
			Channel::Production => "production",
			Channel::Staging => "staging",
		}
	}
}

impl std::fmt::Display for Channel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

// Variant //
//*********//
/// Deployment variant: a release channel or a custom named bundle (dev bundles)
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variant {
	#[default]
	Production,
	Staging,
	Named(Box<str>),
}

impl Variant {
	pub fn parse(variant: &str) -> Self {
		match variant {
			"production" => Variant::Production,
			"staging" => Variant::Staging,
			name => Variant::Named(name.into()),
		}
	}

	/// Release channel, `None` for named variants
	pub fn channel(&self) -> Option<Channel> {
		match self {
			Variant::Production => Some(Channel::Production),
			Variant::Staging => Some(Channel::Staging),
			Variant::Named(_) => None,
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			Variant::Production => "production",
			Variant::Staging => "staging",
			Variant::Named(name) => name,
		}
	}
}

impl From<Channel> for Variant {
	fn from(channel: Channel) -> Self {
		match channel {
			Channel::Production => Variant::Production,
			Channel::Staging => Variant::Staging,
		}
	}
}

impl std::fmt::Display for Variant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for Variant {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for Variant {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let name = String::deserialize(deserializer)?;
		Ok(Variant::parse(&name))
	}
}

// OverrideScope //
//***************//
/// Layer a settings override document is stored for
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OverrideScope {
	Studio,
	Project(Box<str>),
	ProjectSite { project_name: Box<str>, site_id: Box<str> },
}

impl OverrideScope {
	pub fn kind(&self) -> &'static str {
		match self {
			OverrideScope::Studio => "studio",
			OverrideScope::Project(_) => "project",
			OverrideScope::ProjectSite { .. } => "site",
		}
	}

	pub fn project_name(&self) -> Option<&str> {
		match self {
			OverrideScope::Studio => None,
			OverrideScope::Project(project_name)
			| OverrideScope::ProjectSite { project_name, .. } => Some(project_name),
		}
	}

	pub fn site_id(&self) -> Option<&str> {
		match self {
			OverrideScope::ProjectSite { site_id, .. } => Some(site_id),
			_ => None,
		}
	}
}

impl std::fmt::Display for OverrideScope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OverrideScope::Studio => write!(f, "studio"),
			OverrideScope::Project(project) => write!(f, "project:{}", project),
			OverrideScope::ProjectSite { project_name, site_id } => {
				write!(f, "site:{}:{}", project_name, site_id)
			}
		}
	}
}

// SettingsScope //
//***************//
/// Scope tag of a top-level settings field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsScope {
	Studio,
	Project,
	Site,
}

impl SettingsScope {
	/// Scopes of a field that does not declare any
	pub const DEFAULT: &'static [SettingsScope] = &[SettingsScope::Studio, SettingsScope::Project];
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scope_from_name() {
		assert_eq!(Scope::from_name("_"), Scope::Studio);
		assert_eq!(Scope::from_name("proj1"), Scope::project("proj1"));
		assert_eq!(Scope::from_project(None), Scope::Studio);
		assert_eq!(Scope::project("proj1").to_string(), "proj1");
		assert_eq!(Scope::Studio.to_string(), "_");
	}

	#[test]
	fn test_variant_parse() {
		assert_eq!(Variant::parse("production").channel(), Some(Channel::Production));
		assert_eq!(Variant::parse("staging").channel(), Some(Channel::Staging));
		let dev = Variant::parse("dev-alice");
		assert_eq!(dev.channel(), None);
		assert_eq!(dev.as_str(), "dev-alice");
	}

	#[test]
	fn test_variant_serde() {
		let json = serde_json::to_string(&Variant::Staging).unwrap_or_default();
		assert_eq!(json, "\"staging\"");
		let parsed: Variant = serde_json::from_str("\"custom\"").unwrap_or_default();
		assert_eq!(parsed, Variant::Named("custom".into()));
	}
}

// vim: ts=4
