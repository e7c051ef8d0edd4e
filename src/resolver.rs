//! The resolver does no locking. Callers sharing one across threads must hold
//! an exclusive lock for the whole toggle-then-read sequence.

use crate::{
    catalog::{Catalog, ItemKind, Mod, Patch},
    reference::VersionedRef,
    relation,
    selection::Selection,
    visibility,
};
use serde::Serialize;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Unselectable,
    Selectable,
    Selected,
    SelectedWithWarning,
}

impl ItemStatus {
    pub fn is_selected(self) -> bool {
        matches!(self, ItemStatus::Selected | ItemStatus::SelectedWithWarning)
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::Unselectable => "blocked",
            ItemStatus::Selectable => "available",
            ItemStatus::Selected => "selected",
            ItemStatus::SelectedWithWarning => "selected!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    UnmetRequirement,
    NoSelectedTarget,
    PatchConflict,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EvictionReason::UnmetRequirement => "requirement no longer selected",
            EvictionReason::NoSelectedTarget => "no selected target mod",
            EvictionReason::PatchConflict => "conflicts with a selected patch",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eviction {
    pub id: String,
    pub kind: ItemKind,
    pub reason: EvictionReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRef {
    pub id: String,
    pub version: String,
    pub name: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLabel {
    pub id: String,
    pub name: String,
}

impl ItemLabel {
    fn of_mod(mod_entry: &Mod) -> Self {
        Self {
            id: mod_entry.id.clone(),
            name: mod_entry.display_name().to_string(),
        }
    }

    fn of_patch(patch: &Patch) -> Self {
        Self {
            id: patch.id.clone(),
            name: patch.display_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub id: String,
    pub kind: ItemKind,
    pub name: String,
    pub description: String,
    pub version: String,
    pub download: String,
    pub dev_only: bool,
    pub status: ItemStatus,
    pub unmet_requirements: Vec<ResolvedRef>,
    pub hard_conflicts: Vec<ItemLabel>,
    pub soft_conflicts: Vec<ItemLabel>,
    pub alternatives: Vec<ItemLabel>,
    pub targets: Vec<ResolvedRef>,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Catalog,
    selection: Selection,
    developer_mode: bool,
    last_evictions: Vec<Eviction>,
}

impl Resolver {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            selection: Selection::new(),
            developer_mode: false,
            last_evictions: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn developer_mode(&self) -> bool {
        self.developer_mode
    }

    pub fn set_developer_mode(&mut self, enabled: bool) {
        self.developer_mode = enabled;
    }

    /// Items evicted by the most recent successful select or deselect.
    pub fn last_evictions(&self) -> &[Eviction] {
        &self.last_evictions
    }

    pub fn toggle(&mut self, kind: ItemKind, id: &str) -> bool {
        if self.selection.is_selected(kind, id) {
            self.deselect(kind, id)
        } else {
            self.select(kind, id)
        }
    }

    /// Selects an eligible item. Selecting an already-selected item is a
    /// no-op that succeeds; unknown or blocked items are refused.
    pub fn select(&mut self, kind: ItemKind, id: &str) -> bool {
        if self.selection.is_selected(kind, id) {
            return true;
        }
        if self.is_blocked(kind, id) {
            debug!(id, kind = %kind, "selection refused");
            return false;
        }
        if !self.selection.select(&self.catalog, kind, id) {
            return false;
        }
        debug!(id, kind = %kind, "selected");
        self.last_evictions = self.reconcile();
        true
    }

    pub fn deselect(&mut self, kind: ItemKind, id: &str) -> bool {
        if !self.selection.deselect(kind, id) {
            debug!(id, kind = %kind, "deselect ignored, not selected");
            return false;
        }
        debug!(id, kind = %kind, "deselected");
        self.last_evictions = self.reconcile();
        true
    }

    /// Evicts selected items that are no longer valid, repeating until a pass
    /// removes nothing. Each pass judges every item against the same snapshot
    /// so the outcome does not depend on iteration order.
    pub fn reconcile(&mut self) -> Vec<Eviction> {
        let mut evicted = Vec::new();
        loop {
            let mut pass = self.stale_items();
            if pass.is_empty() {
                break;
            }
            pass.sort_by(|a, b| a.id.cmp(&b.id));
            for eviction in &pass {
                self.selection.deselect(eviction.kind, &eviction.id);
                debug!(
                    id = %eviction.id,
                    kind = %eviction.kind,
                    reason = %eviction.reason,
                    "evicted"
                );
            }
            evicted.extend(pass);
        }
        evicted
    }

    fn stale_items(&self) -> Vec<Eviction> {
        let mut stale = Vec::new();
        for mod_entry in self.selection.mods() {
            if !relation::requirements_met(&self.catalog, &self.selection, &mod_entry.requires) {
                stale.push(Eviction {
                    id: mod_entry.id.clone(),
                    kind: ItemKind::Mod,
                    reason: EvictionReason::UnmetRequirement,
                });
            }
        }
        for patch in self.selection.patches() {
            let reason = if self
                .selection
                .patches()
                .any(|other| relation::conflict(&self.selection, patch, other))
            {
                EvictionReason::PatchConflict
            } else if !relation::targets_selected_mod(&self.catalog, &self.selection, patch) {
                EvictionReason::NoSelectedTarget
            } else {
                continue;
            };
            stale.push(Eviction {
                id: patch.id.clone(),
                kind: ItemKind::Patch,
                reason,
            });
        }
        stale
    }

    pub fn is_blocked(&self, kind: ItemKind, id: &str) -> bool {
        match kind {
            ItemKind::Mod => match self.catalog.get_mod(id) {
                Some(mod_entry) => relation::is_blocked(&self.catalog, &self.selection, mod_entry),
                None => true,
            },
            ItemKind::Patch => {
                if self.selection.has_patch(id) {
                    return false;
                }
                match self.catalog.get_patch(id) {
                    Some(patch) => {
                        relation::is_blocked_patch(&self.catalog, &self.selection, patch)
                    }
                    None => true,
                }
            }
        }
    }

    pub fn status(&self, kind: ItemKind, id: &str) -> Option<ItemStatus> {
        match kind {
            ItemKind::Mod => self.catalog.get_mod(id).map(|m| self.mod_status(m)),
            ItemKind::Patch => self.catalog.get_patch(id).map(|p| self.patch_status(p)),
        }
    }

    fn mod_status(&self, mod_entry: &Mod) -> ItemStatus {
        if self.selection.has_mod(&mod_entry.id) {
            if relation::soft_conflicts(&self.selection, mod_entry).is_empty() {
                ItemStatus::Selected
            } else {
                ItemStatus::SelectedWithWarning
            }
        } else if relation::is_blocked(&self.catalog, &self.selection, mod_entry) {
            ItemStatus::Unselectable
        } else {
            ItemStatus::Selectable
        }
    }

    fn patch_status(&self, patch: &Patch) -> ItemStatus {
        if self.selection.has_patch(&patch.id) {
            let partial = patch
                .patches
                .iter()
                .any(|target| !self.selection.has_mod(&target.id));
            if partial {
                ItemStatus::SelectedWithWarning
            } else {
                ItemStatus::Selected
            }
        } else if relation::is_blocked_patch(&self.catalog, &self.selection, patch) {
            ItemStatus::Unselectable
        } else {
            ItemStatus::Selectable
        }
    }

    pub fn report(&self, id: &str) -> Option<ItemReport> {
        if let Some(mod_entry) = self.catalog.get_mod(id) {
            return Some(self.mod_report(mod_entry));
        }
        self.catalog.get_patch(id).map(|patch| self.patch_report(patch))
    }

    fn mod_report(&self, mod_entry: &Mod) -> ItemReport {
        let hard_conflicts = if mod_entry.non_conflicting {
            Vec::new()
        } else {
            sorted_labels(
                self.selection
                    .mods()
                    .filter(|other| {
                        !other.non_conflicting
                            && relation::conflict(&self.selection, mod_entry, *other)
                    })
                    .map(ItemLabel::of_mod),
            )
        };
        ItemReport {
            id: mod_entry.id.clone(),
            kind: ItemKind::Mod,
            name: mod_entry.display_name().to_string(),
            description: mod_entry.description.clone(),
            version: mod_entry.version.clone(),
            download: mod_entry.download.clone(),
            dev_only: mod_entry.dev_only,
            status: self.mod_status(mod_entry),
            unmet_requirements: self.unmet(&mod_entry.requires),
            hard_conflicts,
            soft_conflicts: relation::soft_conflicts(&self.selection, mod_entry)
                .into_iter()
                .map(ItemLabel::of_mod)
                .collect(),
            alternatives: self
                .catalog
                .alternatives_of(mod_entry)
                .into_iter()
                .map(ItemLabel::of_mod)
                .collect(),
            targets: Vec::new(),
        }
    }

    fn patch_report(&self, patch: &Patch) -> ItemReport {
        ItemReport {
            id: patch.id.clone(),
            kind: ItemKind::Patch,
            name: patch.display_name().to_string(),
            description: patch.description.clone(),
            version: patch.version.clone(),
            download: patch.download.clone(),
            dev_only: patch.dev_only,
            status: self.patch_status(patch),
            unmet_requirements: self.unmet(&patch.requires),
            hard_conflicts: sorted_labels(
                self.selection
                    .patches()
                    .filter(|other| relation::conflict(&self.selection, patch, *other))
                    .map(ItemLabel::of_patch),
            ),
            soft_conflicts: Vec::new(),
            alternatives: Vec::new(),
            targets: patch
                .patches
                .iter()
                .map(|target| self.resolve_ref(target))
                .collect(),
        }
    }

    fn unmet(&self, requires: &[VersionedRef]) -> Vec<ResolvedRef> {
        relation::missing_requirements(&self.catalog, &self.selection, requires)
            .into_iter()
            .map(|reference| self.resolve_ref(reference))
            .collect()
    }

    fn resolve_ref(&self, reference: &VersionedRef) -> ResolvedRef {
        ResolvedRef {
            id: reference.id.clone(),
            version: reference.version.clone(),
            name: self.catalog.display_name(&reference.id).map(str::to_string),
            selected: self.selection.has_mod(&reference.id),
        }
    }

    pub fn visible_mods(&self) -> Vec<&Mod> {
        visibility::visible_mods(&self.catalog, self.developer_mode)
    }

    pub fn visible_patches(&self) -> Vec<&Patch> {
        visibility::visible_patches(&self.catalog, &self.selection, self.developer_mode)
    }

    pub fn selected_mods(&self) -> Vec<&Mod> {
        self.catalog
            .mods()
            .iter()
            .filter(|mod_entry| self.selection.has_mod(&mod_entry.id))
            .collect()
    }

    pub fn selected_patches(&self) -> Vec<&Patch> {
        self.catalog
            .patches()
            .iter()
            .filter(|patch| self.selection.has_patch(&patch.id))
            .collect()
    }
}

fn sorted_labels(labels: impl Iterator<Item = ItemLabel>) -> Vec<ItemLabel> {
    let mut out: Vec<ItemLabel> = labels.collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}
