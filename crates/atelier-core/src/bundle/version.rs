//! Semantic version parsing and requirement matching
//!
//! Requirements are comma separated conditions, every one of which must hold:
//! `">=1.0.0, <2.0.0"`. Supported operators are `>=`, `<=`, `>`, `<`, `==`
//! and `!=`. A condition without an operator means `==`.

use std::cmp::Ordering;

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
	pub major: u64,
	pub minor: u64,
	pub patch: u64,
	pub pre: Box<[Box<str>]>,
}

impl Version {
	/// Parses `major[.minor[.patch]][-pre][+build]`. Build metadata is ignored.
	pub fn parse(version: &str) -> AtResult<Self> {
		let invalid = || Error::ValidationError(format!("invalid version {:?}", version));

		let version_str = version.trim().trim_start_matches('v');
		let version_str = version_str.split_once('+').map_or(version_str, |(v, _)| v);
		let (core, pre): (&str, Box<[Box<str>]>) = match version_str.split_once('-') {
			Some((core, pre)) if !pre.is_empty() => (core, pre.split('.').map(Into::into).collect()),
			Some(_) => return Err(invalid()),
			None => (version_str, Box::default()),
		};

		let mut parts = core.split('.');
		let mut next = || -> AtResult<u64> {
			match parts.next() {
				Some(part) => part.parse().map_err(|_| invalid()),
				None => Ok(0),
			}
		};
		let major = next()?;
		let minor = next()?;
		let patch = next()?;
		if parts.next().is_some() {
			return Err(invalid());
		}
		Ok(Self { major, minor, patch, pre })
	}
}

fn cmp_pre_identifier(a: &str, b: &str) -> Ordering {
	match (a.parse::<u64>(), b.parse::<u64>()) {
		(Ok(a), Ok(b)) => a.cmp(&b),
		(Ok(_), Err(_)) => Ordering::Less,
		(Err(_), Ok(_)) => Ordering::Greater,
		(Err(_), Err(_)) => a.cmp(b),
	}
}

impl Ord for Version {
	fn cmp(&self, other: &Self) -> Ordering {
		(self.major, self.minor, self.patch)
			.cmp(&(other.major, other.minor, other.patch))
			.then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
				(true, true) => Ordering::Equal,
				(true, false) => Ordering::Greater,
				(false, true) => Ordering::Less,
				(false, false) => {
					for (a, b) in self.pre.iter().zip(other.pre.iter()) {
						let ord = cmp_pre_identifier(a, b);
						if ord != Ordering::Equal {
							return ord;
						}
					}
					self.pre.len().cmp(&other.pre.len())
				}
			})
	}
}

impl PartialOrd for Version {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

fn matches_condition(version: &Version, condition: &str) -> AtResult<bool> {
	let condition = condition.trim();
	let (op, required) = ["==", "!=", ">=", "<=", ">", "<"]
		.into_iter()
		.find_map(|op| condition.strip_prefix(op).map(|rest| (op, rest)))
		.unwrap_or(("==", condition));
	let ord = version.cmp(&Version::parse(required)?);
	Ok(match op {
		"!=" => ord != Ordering::Equal,
		">=" => ord != Ordering::Less,
		"<=" => ord != Ordering::Greater,
		">" => ord == Ordering::Greater,
		"<" => ord == Ordering::Less,
		_ => ord == Ordering::Equal,
	})
}

/// Whether a version satisfies every condition of a requirement.
///
/// Unparsable versions or requirements never match.
pub fn is_compatible(version: &str, requirements: &str) -> bool {
	let check = || -> AtResult<bool> {
		let version = Version::parse(version)?;
		for condition in requirements.split(',').filter(|c| !c.trim().is_empty()) {
			if !matches_condition(&version, condition)? {
				return Ok(false);
			}
		}
		Ok(true)
	};
	check().unwrap_or_else(|err| {
		debug!("Version requirement {:?} not checked: {}", requirements, err);
		false
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse() {
		let v = Version::parse("1.2.3-beta.2+build5").expect("valid version");
		assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
		assert_eq!(v.pre.len(), 2);
		assert!(Version::parse("1.x").is_err());
		assert!(Version::parse("1.2.3.4").is_err());
	}

	#[test]
	fn test_ordering() {
		let parse = |v| Version::parse(v).expect("valid version");
		assert!(parse("1.0.0-alpha") < parse("1.0.0"));
		assert!(parse("1.0.0-alpha.1") < parse("1.0.0-alpha.beta"));
		assert!(parse("1.0.0-beta.2") < parse("1.0.0-beta.11"));
		assert!(parse("1.10.0") > parse("1.9.9"));
	}

	#[test]
	fn test_requirements() {
		assert!(is_compatible("1.4.0", ">=1.0.0, <2.0.0"));
		assert!(!is_compatible("2.0.0", ">=1.0.0, <2.0.0"));
		assert!(is_compatible("1.0.0", "1.0.0"));
		assert!(is_compatible("1.0.1", "!=1.0.0"));
		assert!(!is_compatible("1.0.0", "> 1.0.0"));
		assert!(is_compatible("1.0.0", "<= 1.0.0"));
		assert!(!is_compatible("garbage", ">=1.0.0"));
	}
}

// vim: ts=4
