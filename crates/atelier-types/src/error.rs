//! Error type shared by the core and every storage adapter.

pub type AtResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Referenced project, bundle, or addon version does not exist
	NotFound(String),
	PermissionDenied,
	/// Persistence unreachable or returned malformed data
	StorageError(String),
	/// Malformed input document
	ValidationError(String),
	/// Invalid options
	ConfigError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// HTTP status the transport layer should answer with
	pub fn http_status(&self) -> u16 {
		match self {
			Error::NotFound(_) => 404,
			Error::PermissionDenied => 403,
			Error::ValidationError(_) => 400,
			Error::StorageError(_) | Error::ConfigError(_) | Error::Internal(_) | Error::Io(_) => {
				500
			}
		}
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, Error::NotFound(_))
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound(msg) => write!(f, "not found: {}", msg),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::StorageError(msg) => write!(f, "storage error: {}", msg),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_http_status_mapping() {
		assert_eq!(Error::NotFound("bundle".into()).http_status(), 404);
		assert_eq!(Error::PermissionDenied.http_status(), 403);
		assert_eq!(Error::ValidationError("bad".into()).http_status(), 400);
		assert_eq!(Error::StorageError("down".into()).http_status(), 500);
	}

	#[test]
	fn test_display_keeps_reason() {
		let err = Error::NotFound("studio bundle not set for variant staging".into());
		assert_eq!(err.to_string(), "not found: studio bundle not set for variant staging");
		assert!(err.is_not_found());
	}
}

// vim: ts=4
