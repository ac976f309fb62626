//! Core options

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::prelude::*;

pub const DEFAULT_LOAD_RETRIES: u32 = 3;
pub const DEFAULT_LOAD_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct CoreOpts {
	/// Extra attempts to load the access group registry at start-up
	pub load_retries: u32,
	pub load_retry_delay: Duration,
	/// Server version bundles are checked against
	pub server_version: Box<str>,
	/// Include error details in the reasons of broken addons
	pub include_broken_detail: bool,
}

impl Default for CoreOpts {
	fn default() -> Self {
		Self {
			load_retries: DEFAULT_LOAD_RETRIES,
			load_retry_delay: DEFAULT_LOAD_RETRY_DELAY,
			server_version: env!("CARGO_PKG_VERSION").into(),
			include_broken_detail: true,
		}
	}
}

fn env_parse<T: FromStr>(name: &str) -> AtResult<Option<T>> {
	match env::var(name) {
		Ok(value) => value
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| Error::ConfigError(format!("{} has an invalid value: {}", name, value))),
		Err(env::VarError::NotPresent) => Ok(None),
		Err(env::VarError::NotUnicode(_)) => {
			Err(Error::ConfigError(format!("{} is not valid unicode", name)))
		}
	}
}

impl CoreOpts {
	/// Defaults overridden by `ATELIER_*` environment variables
	pub fn from_env() -> AtResult<Self> {
		let mut opts = Self::default();
		if let Some(retries) = env_parse("ATELIER_LOAD_RETRIES")? {
			opts.load_retries = retries;
		}
		if let Some(delay_ms) = env_parse::<u64>("ATELIER_LOAD_RETRY_DELAY_MS")? {
			opts.load_retry_delay = Duration::from_millis(delay_ms);
		}
		if let Some(version) = env_parse::<String>("ATELIER_SERVER_VERSION")? {
			opts.server_version = version.into();
		}
		if let Some(detail) = env_parse("ATELIER_BROKEN_DETAIL")? {
			opts.include_broken_detail = detail;
		}
		opts.validate()?;
		Ok(opts)
	}

	pub fn validate(&self) -> AtResult<()> {
		if self.server_version.trim().is_empty() {
			return Err(Error::ConfigError("server version must not be empty".into()));
		}
		if self.load_retry_delay > Duration::from_secs(60) {
			return Err(Error::ConfigError("load retry delay must be at most 60s".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_valid() {
		let opts = CoreOpts::default();
		assert!(opts.validate().is_ok());
		assert_eq!(opts.load_retries, DEFAULT_LOAD_RETRIES);
	}

	#[test]
	fn test_validate_rejects_empty_server_version() {
		let opts = CoreOpts { server_version: " ".into(), ..Default::default() };
		assert!(matches!(opts.validate(), Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_validate_rejects_long_retry_delay() {
		let opts = CoreOpts { load_retry_delay: Duration::from_secs(120), ..Default::default() };
		assert!(matches!(opts.validate(), Err(Error::ConfigError(_))));
	}
}

// vim: ts=4
