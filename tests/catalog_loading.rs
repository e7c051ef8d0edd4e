use modpicker::{loader, template, ItemKind, ItemStatus, Resolver, VersionedRef};
use pretty_assertions::assert_eq;
use std::{fs, path::Path};

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn seed_catalog(dir: &Path) {
    write(
        dir,
        "index.json",
        r#"{ "mods": ["M001", "M002", "M003"], "patches": ["P001", "P002"] }"#,
    );
    write(
        dir,
        "M001.json",
        r#"{ "name": "Combat Rework", "description": "New stances", "version": "2.1",
             "download": "https://example.invalid/m001", "screenshots": ["a.png", "b.png"] }"#,
    );
    write(
        dir,
        "M002.json",
        r#"{ "name": "Stance Pack", "requires": ["M001", "2.0"], "alternatives": ["M003"] }"#,
    );
    write(dir, "M003.json", "not a record");
    write(
        dir,
        "P001.json",
        r#"{ "name": "Rework x Pack", "patches": ["M001", "M002", "1.0"] }"#,
    );
    write(dir, "P002.json", r#"{ "patches": [{ "id": "M001", "version": "2.1" }] }"#);
}

#[test]
fn loaded_catalog_drives_the_resolver() {
    let temp = tempfile::tempdir().unwrap();
    seed_catalog(temp.path());

    let catalog = loader::load_dir(temp.path()).unwrap();
    assert_eq!(catalog.mods().len(), 2);
    assert_eq!(catalog.patches().len(), 2);
    assert_eq!(
        catalog.get_patch("P002").unwrap().patches,
        vec![VersionedRef::new("M001", "2.1")]
    );

    let mut resolver = Resolver::new(catalog);
    assert_eq!(resolver.status(ItemKind::Mod, "M002"), Some(ItemStatus::Unselectable));
    assert!(resolver.toggle(ItemKind::Mod, "M001"));
    assert!(resolver.toggle(ItemKind::Mod, "M002"));
    assert!(resolver.toggle(ItemKind::Patch, "P001"));

    let report = resolver.report("M002").unwrap();
    assert_eq!(report.status, ItemStatus::Selected);
    assert!(report.alternatives.is_empty());
    assert_eq!(resolver.report("P002").unwrap().name, "P002");

    assert!(resolver.toggle(ItemKind::Mod, "M001"));
    assert!(resolver.selection().is_empty());
}

#[test]
fn generated_template_joins_a_catalog() {
    let temp = tempfile::tempdir().unwrap();
    let catalog_dir = temp.path().join("mods");
    let cooked = temp.path().join("cooked/Content/Maps");
    fs::create_dir_all(&catalog_dir).unwrap();
    fs::create_dir_all(&cooked).unwrap();
    fs::write(cooked.join("Arena.umap"), b"").unwrap();

    let count = template::write_template(
        &temp.path().join("cooked"),
        template::DEFAULT_ROOT,
        &catalog_dir.join("P000.json"),
    )
    .unwrap();
    assert_eq!(count, 1);

    write(&catalog_dir, "index.json", r#"{ "mods": [], "patches": ["P000"] }"#);
    let catalog = loader::load_dir(&catalog_dir).unwrap();
    let patch = catalog.get_patch("P000").unwrap();
    assert_eq!(
        patch.conflicts_with,
        vec!["Absolver/Content/Maps/Arena.umap".to_string()]
    );
    assert!(!patch.dev_only);
}
