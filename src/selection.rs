use crate::catalog::{Catalog, ItemKind, Mod, Patch};
use std::collections::HashMap;

/// Chosen mods and patches. Performs no validation of its own; the resolver
/// checks eligibility before and after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    mods: HashMap<String, Mod>,
    patches: HashMap<String, Patch>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the catalog item `id` of the given kind. Returns false when the
    /// catalog has no such item.
    pub fn select(&mut self, catalog: &Catalog, kind: ItemKind, id: &str) -> bool {
        match kind {
            ItemKind::Mod => {
                let Some(mod_entry) = catalog.get_mod(id) else {
                    return false;
                };
                self.mods.insert(id.to_string(), mod_entry.clone());
            }
            ItemKind::Patch => {
                let Some(patch) = catalog.get_patch(id) else {
                    return false;
                };
                self.patches.insert(id.to_string(), patch.clone());
            }
        }
        true
    }

    /// Removes `id`. Returns false when it was not selected.
    pub fn deselect(&mut self, kind: ItemKind, id: &str) -> bool {
        match kind {
            ItemKind::Mod => self.mods.remove(id).is_some(),
            ItemKind::Patch => self.patches.remove(id).is_some(),
        }
    }

    pub fn is_selected(&self, kind: ItemKind, id: &str) -> bool {
        match kind {
            ItemKind::Mod => self.has_mod(id),
            ItemKind::Patch => self.has_patch(id),
        }
    }

    pub fn has_mod(&self, id: &str) -> bool {
        self.mods.contains_key(id)
    }

    pub fn has_patch(&self, id: &str) -> bool {
        self.patches.contains_key(id)
    }

    pub fn mods(&self) -> impl Iterator<Item = &Mod> {
        self.mods.values()
    }

    pub fn patches(&self) -> impl Iterator<Item = &Patch> {
        self.patches.values()
    }

    pub fn len(&self) -> usize {
        self.mods.len() + self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty() && self.patches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::new(
            vec![Mod::from_record("M001", json!({ "name": "Base" })).unwrap()],
            vec![Patch::from_record("P001", json!({ "patches": ["M001"] })).unwrap()],
        )
    }

    #[test]
    fn select_and_deselect_by_kind() {
        let catalog = catalog();
        let mut selection = Selection::new();
        assert!(selection.select(&catalog, ItemKind::Mod, "M001"));
        assert!(selection.select(&catalog, ItemKind::Patch, "P001"));
        assert!(selection.is_selected(ItemKind::Mod, "M001"));
        assert!(!selection.is_selected(ItemKind::Patch, "M001"));
        assert_eq!(selection.len(), 2);

        assert!(selection.deselect(ItemKind::Mod, "M001"));
        assert!(!selection.deselect(ItemKind::Mod, "M001"));
        assert!(!selection.has_mod("M001"));
        assert!(selection.has_patch("P001"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn unknown_ids_are_not_inserted() {
        let catalog = catalog();
        let mut selection = Selection::new();
        assert!(!selection.select(&catalog, ItemKind::Mod, "P001"));
        assert!(!selection.select(&catalog, ItemKind::Mod, "M404"));
        assert!(selection.is_empty());
    }
}
