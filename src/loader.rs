use crate::{
    catalog::{Catalog, CatalogIndex},
    error::CatalogError,
};
use anyhow::{Context, Result};
use serde_json::Value;
use std::{collections::HashMap, fs, path::Path};
use tracing::{info, warn};

pub const INDEX_FILE: &str = "index.json";

/// Reads `index.json` from a catalog directory.
pub fn load_index(dir: &Path) -> Result<CatalogIndex, CatalogError> {
    if !dir.is_dir() {
        return Err(CatalogError::MissingDir(dir.to_path_buf()));
    }
    let path = dir.join(INDEX_FILE);
    let raw = fs::read_to_string(&path).map_err(|source| CatalogError::ReadIndex {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::ParseIndex { path, source })
}

/// Loads a catalog laid out as `index.json` plus one `<id>.json` per item.
/// Records that cannot be read or parsed are skipped with a warning.
pub fn load_dir(dir: &Path) -> Result<Catalog, CatalogError> {
    let index = load_index(dir)?;
    let mut records = HashMap::new();
    for id in index.mods.iter().chain(index.patches.iter()) {
        if records.contains_key(id) {
            continue;
        }
        match read_record(dir, id) {
            Ok(record) => {
                records.insert(id.clone(), record);
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(id = %id, error = %reason, "catalog record skipped");
            }
        }
    }

    let catalog = Catalog::from_records(&index, records);
    info!(
        dir = %dir.display(),
        mods = catalog.mods().len(),
        patches = catalog.patches().len(),
        "catalog loaded"
    );
    Ok(catalog)
}

fn read_record(dir: &Path, id: &str) -> Result<Value> {
    if id.is_empty() || id.contains(|ch: char| ch == '/' || ch == '\\') || id.contains("..") {
        anyhow::bail!("invalid item id");
    }
    let path = dir.join(format!("{id}.json"));
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}
