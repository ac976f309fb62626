pub use crate::error::{AtResult, Error};
pub use crate::types::{Channel, OverrideScope, Scope, Variant};

pub use tracing::{debug, error, info, trace, warn};

// vim: ts=4
