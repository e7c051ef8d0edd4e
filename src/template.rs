//! Patch record skeletons generated from a folder of cooked assets.

use crate::error::TemplateError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

pub const DEFAULT_ROOT: &str = "Absolver";
pub const DEFAULT_OUTPUT: &str = "P000.json";

const ASSET_EXTENSIONS: [&str; 2] = ["umap", "uasset"];

/// Field order matches the hand-written catalog records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTemplate {
    pub name: String,
    pub description: String,
    pub version: String,
    pub patches: Vec<String>,
    pub dev_only: bool,
    pub conflicts_with: Vec<String>,
    pub download: String,
}

impl PatchTemplate {
    pub fn with_assets(conflicts_with: Vec<String>) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            version: String::new(),
            patches: Vec::new(),
            dev_only: false,
            conflicts_with,
            download: String::new(),
        }
    }

    /// Tab-indented JSON, the layout catalog authors edit by hand.
    pub fn render(&self) -> Result<String, TemplateError> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Collects asset files under `folder` as `<root>/<relative/path>`, sorted.
pub fn collect_asset_paths(folder: &Path, root: &str) -> Result<Vec<String>, TemplateError> {
    if !folder.is_dir() {
        return Err(TemplateError::MissingFolder(folder.to_path_buf()));
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(|source| TemplateError::Walk {
            path: folder.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !is_asset(entry.path()) {
            continue;
        }
        let rel = entry.path().strip_prefix(folder).unwrap_or(entry.path());
        let rel = rel.to_string_lossy().replace('\\', "/");
        paths.push(format!("{root}/{rel}"));
    }
    paths.sort();
    Ok(paths)
}

pub fn build_template(folder: &Path, root: &str) -> Result<PatchTemplate, TemplateError> {
    let paths = collect_asset_paths(folder, root)?;
    if paths.is_empty() {
        return Err(TemplateError::NoAssets(folder.to_path_buf()));
    }
    Ok(PatchTemplate::with_assets(paths))
}

/// Writes the template for `folder` to `output`; returns the asset count.
pub fn write_template(folder: &Path, root: &str, output: &Path) -> Result<usize, TemplateError> {
    let template = build_template(folder, root)?;
    let raw = template.render()?;
    fs::write(output, raw).map_err(|source| TemplateError::Write {
        path: PathBuf::from(output),
        source,
    })?;
    Ok(template.conflicts_with.len())
}

fn is_asset(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ASSET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
