use crate::{
    catalog::{Catalog, CatalogItem, Mod, Patch},
    selection::Selection,
};

fn shown(item: &impl CatalogItem, developer_mode: bool) -> bool {
    developer_mode || !item.dev_only()
}

/// Catalog mods offered for selection; developer-only mods are hidden unless
/// `developer_mode` is on.
pub fn visible_mods(catalog: &Catalog, developer_mode: bool) -> Vec<&Mod> {
    catalog
        .mods()
        .iter()
        .filter(|mod_entry| shown(*mod_entry, developer_mode))
        .collect()
}

/// Patches offered for selection: those targeting at least one selected mod,
/// with the same developer-only rule as mods.
pub fn visible_patches<'a>(
    catalog: &'a Catalog,
    selection: &Selection,
    developer_mode: bool,
) -> Vec<&'a Patch> {
    catalog
        .patches()
        .iter()
        .filter(|patch| {
            patch
                .patches
                .iter()
                .any(|target| selection.has_mod(&target.id))
        })
        .filter(|patch| shown(*patch, developer_mode))
        .collect()
}
