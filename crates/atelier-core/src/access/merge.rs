//! Merging of several access group permission sets into one effective set

use super::permissions::{Category, PermissionCategory, PermissionSet};
use crate::prelude::*;

/// Folds `incoming` into `acc`: a disabled category always wins and stays
/// disabled, two enabled categories union their values.
pub fn merge_category<C: PermissionCategory>(acc: &mut C, incoming: &C) {
	if !incoming.is_enabled() {
		if acc.is_enabled() {
			*acc = C::default();
		}
		return;
	}
	if acc.is_enabled() {
		acc.union(incoming);
	}
}

fn merge_into(acc: &mut PermissionSet, incoming: &PermissionSet, category: Category) {
	match category {
		Category::Create => merge_category(&mut acc.create, &incoming.create),
		Category::Read => merge_category(&mut acc.read, &incoming.read),
		Category::Update => merge_category(&mut acc.update, &incoming.update),
		Category::Delete => merge_category(&mut acc.delete, &incoming.delete),
		Category::AttribRead => merge_category(&mut acc.attrib_read, &incoming.attrib_read),
		Category::AttribWrite => merge_category(&mut acc.attrib_write, &incoming.attrib_write),
		Category::Endpoints => merge_category(&mut acc.endpoints, &incoming.endpoints),
		Category::StudioSettings => {
			merge_category(&mut acc.studio_settings, &incoming.studio_settings);
		}
		Category::ProjectSettings => {
			merge_category(&mut acc.project_settings, &incoming.project_settings);
		}
		Category::Publish => merge_category(&mut acc.publish, &incoming.publish),
	}
}

fn normalize(set: &mut PermissionSet) {
	set.create.normalize();
	set.read.normalize();
	set.update.normalize();
	set.delete.normalize();
	set.attrib_read.normalize();
	set.attrib_write.normalize();
	set.endpoints.normalize();
	set.studio_settings.normalize();
	set.project_settings.normalize();
	set.publish.normalize();
}

/// Merges already resolved permission sets for a scope.
///
/// Studio settings only survive at the studio scope.
pub fn combine_sets<'a, I>(sets: I, scope: &Scope) -> PermissionSet
where
	I: IntoIterator<Item = &'a PermissionSet>,
{
	let mut sets = sets.into_iter();
	let Some(first) = sets.next() else {
		return PermissionSet::default();
	};

	let mut result = first.clone();
	normalize(&mut result);
	if !scope.is_studio() {
		result.studio_settings = Default::default();
	}

	for incoming in sets {
		for category in Category::ALL {
			if category == Category::StudioSettings && !scope.is_studio() {
				continue;
			}
			merge_into(&mut result, incoming, category);
		}
	}
	result
}

/// Merges the named access groups for a project (or the studio) scope.
///
/// Each name is looked up at the given scope first and at the studio scope
/// second. Names found at neither are skipped.
pub fn combine<'a, S, F>(names: &[S], scope: &Scope, lookup: F) -> PermissionSet
where
	S: AsRef<str>,
	F: Fn(&str, &Scope) -> Option<&'a PermissionSet>,
{
	let resolved = names.iter().filter_map(|name| {
		let name = name.as_ref();
		let found = lookup(name, scope).or_else(|| {
			if scope.is_studio() { None } else { lookup(name, &Scope::Studio) }
		});
		if found.is_none() {
			trace!(access_group = %name, scope = %scope, "Unknown access group skipped");
		}
		found
	});
	combine_sets(resolved, scope)
}


// vim: ts=4
