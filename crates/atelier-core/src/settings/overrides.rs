//! Schema-agnostic deep merging of settings documents

use serde_json::{Map, Value};

/// Merges `overrides` into `base`.
///
/// Mappings are merged key by key, recursively. Any other value (scalar,
/// array or null) replaces what `base` holds. Keys the override does not
/// mention are kept.
pub fn apply_overrides(base: &mut Value, overrides: &Value) {
	match (base, overrides) {
		(Value::Object(base), Value::Object(overrides)) => {
			for (key, value) in overrides {
				match base.get_mut(key) {
					Some(existing) => apply_overrides(existing, value),
					None => {
						base.insert(key.clone(), value.clone());
					}
				}
			}
		}
		(base, overrides) => *base = overrides.clone(),
	}
}

/// Minimal override document that recreates `current` when applied on top of
/// `defaults`. `None` if there is nothing to override.
pub fn extract_overrides(defaults: &Value, current: &Value) -> Option<Value> {
	match (defaults, current) {
		(Value::Object(defaults), Value::Object(current)) => {
			let mut overrides = Map::new();
			for (key, value) in current {
				let changed = match defaults.get(key) {
					Some(default) => extract_overrides(default, value),
					None => Some(value.clone()),
				};
				if let Some(changed) = changed {
					overrides.insert(key.clone(), changed);
				}
			}
			if overrides.is_empty() { None } else { Some(Value::Object(overrides)) }
		}
		(defaults, current) if defaults == current => None,
		(_, current) => Some(current.clone()),
	}
}

fn collect_paths(prefix: &str, value: &Value, paths: &mut Vec<String>) {
	match value {
		Value::Object(obj) => {
			for (key, child) in obj {
				let path = if prefix.is_empty() { key.clone() } else { format!("{}.{}", prefix, key) };
				collect_paths(&path, child, paths);
			}
		}
		_ if !prefix.is_empty() => paths.push(prefix.to_string()),
		_ => {}
	}
}

/// Dotted paths of every overridden leaf value, sorted
pub fn list_overrides(overrides: &Value) -> Vec<String> {
	let mut paths = Vec::new();
	collect_paths("", overrides, &mut paths);
	paths.sort();
	paths
}


// vim: ts=4
