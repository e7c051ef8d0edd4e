use modpicker::{
    relation::{conflict, is_blocked},
    Catalog, Eviction, EvictionReason, ItemKind, ItemStatus, Mod, Patch, Resolver,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn mod_entry(id: &str, record: Value) -> Mod {
    Mod::from_record(id, record).expect("mod record")
}

fn patch(id: &str, record: Value) -> Patch {
    Patch::from_record(id, record).expect("patch record")
}

fn sample_catalog() -> Catalog {
    Catalog::new(
        vec![
            mod_entry("M001", json!({ "name": "Core" })),
            mod_entry("M002", json!({ "name": "Core Plus", "requires": ["M001", "1.1"] })),
            mod_entry("M003", json!({ "name": "Deep Plus", "requires": ["M002"] })),
            mod_entry("M004", json!({ "name": "Arena", "conflictsWith": ["M005"] })),
            mod_entry("M005", json!({ "name": "Arena Alt", "alternatives": ["M004"] })),
            mod_entry(
                "M006",
                json!({ "name": "Skins A", "nonConflicting": true, "conflictsWith": ["M007"] }),
            ),
            mod_entry("M007", json!({ "name": "Skins B", "nonConflicting": true })),
            mod_entry("M008", json!({ "name": "Debug Tools", "devOnly": true })),
        ],
        vec![
            patch("P001", json!({ "patches": ["M001", "M002"] })),
            patch("P002", json!({ "patches": ["M004", "M005"] })),
            patch("P003", json!({ "patches": ["M001"], "conflictsWith": ["P004"] })),
            patch("P004", json!({ "patches": ["M001", "2.0"] })),
        ],
    )
}

/// Every item's status, keyed by id.
fn snapshot(resolver: &Resolver) -> BTreeMap<String, ItemStatus> {
    let catalog = resolver.catalog();
    let mut out = BTreeMap::new();
    for mod_entry in catalog.mods() {
        let status = resolver.status(ItemKind::Mod, &mod_entry.id).unwrap();
        out.insert(mod_entry.id.clone(), status);
    }
    for patch in catalog.patches() {
        let status = resolver.status(ItemKind::Patch, &patch.id).unwrap();
        out.insert(patch.id.clone(), status);
    }
    out
}

fn toggle_all(resolver: &mut Resolver, ids: &[&str]) {
    for id in ids {
        let kind = resolver.catalog().kind_of(id).unwrap();
        assert!(resolver.toggle(kind, id), "toggle {id} rejected");
    }
}

#[test]
fn conflict_is_symmetric_and_irreflexive_across_catalog() {
    let mut resolver = Resolver::new(sample_catalog());
    toggle_all(&mut resolver, &["M001", "M004", "P003"]);
    let catalog = resolver.catalog();
    let selection = resolver.selection();

    for a in catalog.mods() {
        assert!(!conflict(selection, a, a));
        for b in catalog.mods() {
            assert_eq!(conflict(selection, a, b), conflict(selection, b, a));
        }
    }
    for a in catalog.patches() {
        assert!(!conflict(selection, a, a));
        for b in catalog.patches() {
            assert_eq!(conflict(selection, a, b), conflict(selection, b, a));
        }
    }
}

#[test]
fn selected_mods_are_never_blocked() {
    let mut resolver = Resolver::new(sample_catalog());
    toggle_all(&mut resolver, &["M001", "M002", "M003", "M006", "M007", "M004"]);
    for mod_entry in resolver.selected_mods() {
        assert!(!is_blocked(resolver.catalog(), resolver.selection(), mod_entry));
    }
}

#[test]
fn reconcile_is_idempotent_after_toggles() {
    let mut resolver = Resolver::new(sample_catalog());
    toggle_all(&mut resolver, &["M001", "M002", "M003", "P001", "P004"]);
    toggle_all(&mut resolver, &["M002"]);
    assert!(resolver.reconcile().is_empty());
    toggle_all(&mut resolver, &["M001"]);
    assert!(resolver.reconcile().is_empty());
    assert!(resolver.selection().is_empty());
}

#[test]
fn deselecting_chain_root_cascades() {
    let mut resolver = Resolver::new(sample_catalog());
    toggle_all(&mut resolver, &["M001", "M002", "M003"]);
    assert_eq!(resolver.selected_mods().len(), 3);

    assert!(resolver.deselect(ItemKind::Mod, "M001"));
    assert!(resolver.selected_mods().is_empty());
    assert_eq!(resolver.status(ItemKind::Mod, "M003"), Some(ItemStatus::Unselectable));
}

#[test]
fn patch_is_evicted_with_its_only_target() {
    let mut resolver = Resolver::new(sample_catalog());
    toggle_all(&mut resolver, &["M001", "P004"]);
    assert!(resolver.selection().has_patch("P004"));

    toggle_all(&mut resolver, &["M001"]);
    assert!(!resolver.selection().has_patch("P004"));
    assert!(resolver.visible_patches().is_empty());
}

#[test]
fn selection_order_does_not_matter() {
    let mut forward = Resolver::new(sample_catalog());
    toggle_all(&mut forward, &["M001", "M004", "M006", "M007"]);

    let mut backward = Resolver::new(sample_catalog());
    toggle_all(&mut backward, &["M007", "M006", "M004", "M001"]);

    assert_eq!(forward.selection(), backward.selection());
    assert_eq!(snapshot(&forward), snapshot(&backward));
}

#[test]
fn tolerant_mods_coexist_with_warnings() {
    let mut resolver = Resolver::new(sample_catalog());
    toggle_all(&mut resolver, &["M006", "M007"]);
    assert_eq!(
        resolver.status(ItemKind::Mod, "M006"),
        Some(ItemStatus::SelectedWithWarning)
    );

    let report = resolver.report("M007").unwrap();
    let ids: Vec<&str> = report.soft_conflicts.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["M006"]);
}

#[test]
fn strict_conflict_rejects_second_toggle() {
    let mut resolver = Resolver::new(sample_catalog());
    assert!(resolver.toggle(ItemKind::Mod, "M005"));
    assert!(!resolver.toggle(ItemKind::Mod, "M004"));
    assert!(!resolver.selection().has_mod("M004"));

    let report = resolver.report("M004").unwrap();
    assert_eq!(report.status, ItemStatus::Unselectable);
    assert_eq!(report.hard_conflicts[0].id, "M005");
    assert_eq!(report.alternatives[0].id, "M005");
}

#[test]
fn bridging_patch_allows_conflicting_pair() {
    let mut resolver = Resolver::new(sample_catalog());
    toggle_all(&mut resolver, &["M005", "P002"]);
    assert_eq!(resolver.status(ItemKind::Mod, "M004"), Some(ItemStatus::Selectable));
    toggle_all(&mut resolver, &["M004"]);
    assert_eq!(resolver.selected_mods().len(), 2);
}

#[test]
fn conflicting_patches_exclude_each_other() {
    let mut resolver = Resolver::new(sample_catalog());
    toggle_all(&mut resolver, &["M001", "P004"]);
    assert_eq!(resolver.status(ItemKind::Patch, "P003"), Some(ItemStatus::Unselectable));
    assert!(!resolver.toggle(ItemKind::Patch, "P003"));
}

#[test]
fn base_addon_patch_walkthrough() {
    let catalog = Catalog::new(
        vec![
            mod_entry("M001", json!({})),
            mod_entry("M002", json!({ "requires": ["M001"] })),
        ],
        vec![patch("P001", json!({ "patches": ["M001", "M002"] }))],
    );
    let mut resolver = Resolver::new(catalog);
    assert!(resolver.is_blocked(ItemKind::Mod, "M002"));
    assert!(resolver.is_blocked(ItemKind::Patch, "P001"));

    assert!(resolver.toggle(ItemKind::Mod, "M001"));
    assert!(!resolver.is_blocked(ItemKind::Mod, "M002"));
    assert!(!resolver.is_blocked(ItemKind::Patch, "P001"));

    assert!(resolver.toggle(ItemKind::Mod, "M002"));
    assert!(resolver.toggle(ItemKind::Patch, "P001"));

    assert!(resolver.toggle(ItemKind::Mod, "M001"));
    assert!(!resolver.selection().has_mod("M002"));
    assert!(!resolver.selection().has_patch("P001"));
}

#[test]
fn developer_mode_only_changes_visibility() {
    let mut resolver = Resolver::new(sample_catalog());
    assert!(resolver.visible_mods().iter().all(|m| m.id != "M008"));

    resolver.set_developer_mode(true);
    assert!(resolver.visible_mods().iter().any(|m| m.id == "M008"));
    toggle_all(&mut resolver, &["M008"]);

    resolver.set_developer_mode(false);
    assert!(resolver.selection().has_mod("M008"));
    assert_eq!(resolver.selected_mods()[0].id, "M008");
}

#[test]
fn removing_bridge_evicts_both_conflicting_patches() {
    let catalog = Catalog::new(
        vec![mod_entry("M001", json!({ "name": "Core" }))],
        vec![
            patch("P001", json!({ "patches": ["M001"], "conflictsWith": ["P002"] })),
            patch("P002", json!({ "patches": ["M001"] })),
            patch("P003", json!({ "patches": ["M001", "P001", "P002"] })),
        ],
    );
    let mut resolver = Resolver::new(catalog);
    toggle_all(&mut resolver, &["M001", "P003", "P001", "P002"]);
    assert!(resolver.last_evictions().is_empty());
    assert_eq!(resolver.selected_patches().len(), 3);

    assert!(resolver.toggle(ItemKind::Patch, "P003"));
    let expected: Vec<Eviction> = ["P001", "P002"]
        .iter()
        .map(|id| Eviction {
            id: id.to_string(),
            kind: ItemKind::Patch,
            reason: EvictionReason::PatchConflict,
        })
        .collect();
    assert_eq!(resolver.last_evictions(), expected.as_slice());
    assert!(resolver.selected_patches().is_empty());
    assert!(resolver.selection().has_mod("M001"));
    assert!(resolver.reconcile().is_empty());
}
