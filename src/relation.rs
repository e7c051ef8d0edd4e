use crate::{
    catalog::{Catalog, CatalogItem, Mod, Patch},
    reference::{contains_id, VersionedRef},
    selection::Selection,
};

pub fn is_patched(selection: &Selection, a: &str, b: &str) -> bool {
    selection
        .patches()
        .any(|patch| patch.targets(a) && patch.targets(b))
}

/// Whether two items conflict given the current selection. Symmetric, and
/// never true for an item against itself. A dependency in either direction,
/// or a selected patch covering both items, cancels a conflict edge.
pub fn conflict<A, B>(selection: &Selection, a: &A, b: &B) -> bool
where
    A: CatalogItem + ?Sized,
    B: CatalogItem + ?Sized,
{
    if a.id() == b.id() {
        return false;
    }
    if contains_id(a.requires(), b.id()) || contains_id(b.requires(), a.id()) {
        return false;
    }
    if is_patched(selection, a.id(), b.id()) {
        return false;
    }
    a.conflicts_with().iter().any(|id| id == b.id())
        || b.conflicts_with().iter().any(|id| id == a.id())
}

pub fn soft_conflicts<'a>(selection: &'a Selection, mod_entry: &Mod) -> Vec<&'a Mod> {
    if !mod_entry.non_conflicting {
        return Vec::new();
    }
    let mut out: Vec<&Mod> = selection
        .mods()
        .filter(|other| other.non_conflicting && conflict(selection, mod_entry, *other))
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

pub fn requirement_met(
    catalog: &Catalog,
    selection: &Selection,
    reference: &VersionedRef,
) -> bool {
    catalog.get_mod(&reference.id).is_some() && selection.has_mod(&reference.id)
}

pub fn missing_requirements<'a>(
    catalog: &Catalog,
    selection: &Selection,
    requires: &'a [VersionedRef],
) -> Vec<&'a VersionedRef> {
    requires
        .iter()
        .filter(|reference| !requirement_met(catalog, selection, reference))
        .collect()
}

pub fn requirements_met(
    catalog: &Catalog,
    selection: &Selection,
    requires: &[VersionedRef],
) -> bool {
    requires
        .iter()
        .all(|reference| requirement_met(catalog, selection, reference))
}

/// Whether an unselected mod may not be selected right now. Selected mods are
/// never reported as blocked.
pub fn is_blocked(catalog: &Catalog, selection: &Selection, mod_entry: &Mod) -> bool {
    if selection.has_mod(&mod_entry.id) {
        return false;
    }
    if !requirements_met(catalog, selection, &mod_entry.requires) {
        return true;
    }
    if mod_entry.non_conflicting {
        return false;
    }
    selection
        .mods()
        .any(|other| !other.non_conflicting && conflict(selection, mod_entry, other))
}

pub fn targets_selected_mod(catalog: &Catalog, selection: &Selection, patch: &Patch) -> bool {
    patch
        .patches
        .iter()
        .any(|target| catalog.get_mod(&target.id).is_some() && selection.has_mod(&target.id))
}

pub fn is_blocked_patch(catalog: &Catalog, selection: &Selection, patch: &Patch) -> bool {
    if selection
        .patches()
        .any(|other| conflict(selection, patch, other))
    {
        return true;
    }
    !targets_selected_mod(catalog, selection, patch)
}
