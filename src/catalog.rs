use crate::reference::{parse_refs, RefToken, VersionedRef};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Mod,
    Patch,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Mod => "mod",
            ItemKind::Patch => "patch",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

pub trait CatalogItem {
    fn id(&self) -> &str;
    fn requires(&self) -> &[VersionedRef];
    fn conflicts_with(&self) -> &[String];
    fn dev_only(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mod {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub download: String,
    pub screenshots: Vec<String>,
    pub non_conflicting: bool,
    pub requires: Vec<VersionedRef>,
    pub conflicts_with: Vec<String>,
    pub alternatives: Vec<String>,
    pub dev_only: bool,
}

impl Mod {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn lists_alternative(&self, id: &str) -> bool {
        self.alternatives.iter().any(|alt| alt == id)
    }
}

impl CatalogItem for Mod {
    fn id(&self) -> &str {
        &self.id
    }

    fn requires(&self) -> &[VersionedRef] {
        &self.requires
    }

    fn conflicts_with(&self) -> &[String] {
        &self.conflicts_with
    }

    fn dev_only(&self) -> bool {
        self.dev_only
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub download: String,
    pub screenshots: Vec<String>,
    pub patches: Vec<VersionedRef>,
    pub requires: Vec<VersionedRef>,
    pub conflicts_with: Vec<String>,
    pub dev_only: bool,
}

impl Patch {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn targets(&self, id: &str) -> bool {
        self.patches.iter().any(|target| target.id == id)
    }
}

impl CatalogItem for Patch {
    fn id(&self) -> &str {
        &self.id
    }

    fn requires(&self) -> &[VersionedRef] {
        &self.requires
    }

    fn conflicts_with(&self) -> &[String] {
        &self.conflicts_with
    }

    fn dev_only(&self) -> bool {
        self.dev_only
    }
}

// On-disk record shapes. Every field is optional; `null` or an unexpected
// type falls back to the default instead of rejecting the record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawMod {
    #[serde(deserialize_with = "text_or_default")]
    name: String,
    #[serde(deserialize_with = "text_or_default")]
    description: String,
    #[serde(deserialize_with = "text_or_default")]
    version: String,
    #[serde(deserialize_with = "text_or_default")]
    download: String,
    #[serde(deserialize_with = "list_or_default")]
    screenshots: Vec<String>,
    #[serde(deserialize_with = "flag_or_default")]
    non_conflicting: bool,
    #[serde(deserialize_with = "refs_or_default")]
    requires: Vec<RefToken>,
    #[serde(deserialize_with = "list_or_default")]
    conflicts_with: Vec<String>,
    #[serde(deserialize_with = "list_or_default")]
    alternatives: Vec<String>,
    #[serde(deserialize_with = "flag_or_default")]
    dev_only: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPatch {
    #[serde(deserialize_with = "text_or_default")]
    name: String,
    #[serde(deserialize_with = "text_or_default")]
    description: String,
    #[serde(deserialize_with = "text_or_default")]
    version: String,
    #[serde(deserialize_with = "text_or_default")]
    download: String,
    #[serde(deserialize_with = "list_or_default")]
    screenshots: Vec<String>,
    #[serde(deserialize_with = "refs_or_default")]
    patches: Vec<RefToken>,
    #[serde(deserialize_with = "refs_or_default")]
    requires: Vec<RefToken>,
    #[serde(deserialize_with = "list_or_default")]
    conflicts_with: Vec<String>,
    #[serde(deserialize_with = "flag_or_default")]
    dev_only: bool,
}

fn text_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    })
}

fn flag_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::Null => false,
        Value::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

fn list_or_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn refs_or_default<'de, D>(deserializer: D) -> Result<Vec<RefToken>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Number(number) => Some(RefToken::Token(number.to_string())),
            other => serde_json::from_value(other).ok(),
        })
        .collect())
}

impl Mod {
    pub fn from_record(id: &str, record: Value) -> Option<Self> {
        if !record.is_object() {
            return None;
        }
        let raw: RawMod = serde_json::from_value(record).ok()?;
        Some(Self {
            id: id.to_string(),
            name: raw.name,
            description: raw.description,
            version: raw.version,
            download: raw.download,
            screenshots: raw.screenshots,
            non_conflicting: raw.non_conflicting,
            requires: parse_refs(&raw.requires),
            conflicts_with: raw.conflicts_with,
            alternatives: raw.alternatives,
            dev_only: raw.dev_only,
        })
    }
}

impl Patch {
    pub fn from_record(id: &str, record: Value) -> Option<Self> {
        if !record.is_object() {
            return None;
        }
        let raw: RawPatch = serde_json::from_value(record).ok()?;
        Some(Self {
            id: id.to_string(),
            name: raw.name,
            description: raw.description,
            version: raw.version,
            download: raw.download,
            screenshots: raw.screenshots,
            patches: parse_refs(&raw.patches),
            requires: parse_refs(&raw.requires),
            conflicts_with: raw.conflicts_with,
            dev_only: raw.dev_only,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogIndex {
    #[serde(default)]
    pub mods: Vec<String>,
    #[serde(default)]
    pub patches: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    mods: Vec<Mod>,
    patches: Vec<Patch>,
    mod_index: HashMap<String, usize>,
    patch_index: HashMap<String, usize>,
}

impl Catalog {
    /// Assembles a catalog from already-normalized items. Duplicate ids are
    /// dropped (first wins, mods before patches).
    pub fn new(mods: Vec<Mod>, patches: Vec<Patch>) -> Self {
        let mut catalog = Catalog::default();
        for mod_entry in mods {
            if catalog.contains(&mod_entry.id) {
                warn!(id = %mod_entry.id, "duplicate catalog id, dropping mod");
                continue;
            }
            catalog
                .mod_index
                .insert(mod_entry.id.clone(), catalog.mods.len());
            catalog.mods.push(mod_entry);
        }
        for patch in patches {
            if catalog.contains(&patch.id) {
                warn!(id = %patch.id, "duplicate catalog id, dropping patch");
                continue;
            }
            catalog
                .patch_index
                .insert(patch.id.clone(), catalog.patches.len());
            catalog.patches.push(patch);
        }
        catalog
    }

    pub fn from_records(index: &CatalogIndex, mut records: HashMap<String, Value>) -> Self {
        let mut seen = HashSet::new();
        let mut mods = Vec::new();
        for id in &index.mods {
            if !seen.insert(id.as_str()) {
                warn!(id = %id, kind = "mod", "duplicate catalog id, dropping mod");
                continue;
            }
            let Some(record) = records.remove(id) else {
                warn!(id = %id, kind = "mod", "no record for indexed id");
                continue;
            };
            match Mod::from_record(id, record) {
                Some(mod_entry) => mods.push(mod_entry),
                None => warn!(id = %id, kind = "mod", "malformed record dropped"),
            }
        }

        let mut patches = Vec::new();
        for id in &index.patches {
            if !seen.insert(id.as_str()) {
                warn!(id = %id, kind = "patch", "duplicate catalog id, dropping patch");
                continue;
            }
            let Some(record) = records.remove(id) else {
                warn!(id = %id, kind = "patch", "no record for indexed id");
                continue;
            };
            match Patch::from_record(id, record) {
                Some(patch) => patches.push(patch),
                None => warn!(id = %id, kind = "patch", "malformed record dropped"),
            }
        }

        Catalog::new(mods, patches)
    }

    pub fn mods(&self) -> &[Mod] {
        &self.mods
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn get_mod(&self, id: &str) -> Option<&Mod> {
        self.mod_index.get(id).map(|index| &self.mods[*index])
    }

    pub fn get_patch(&self, id: &str) -> Option<&Patch> {
        self.patch_index.get(id).map(|index| &self.patches[*index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.mod_index.contains_key(id) || self.patch_index.contains_key(id)
    }

    pub fn kind_of(&self, id: &str) -> Option<ItemKind> {
        if self.mod_index.contains_key(id) {
            Some(ItemKind::Mod)
        } else if self.patch_index.contains_key(id) {
            Some(ItemKind::Patch)
        } else {
            None
        }
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        if let Some(mod_entry) = self.get_mod(id) {
            return Some(mod_entry.display_name());
        }
        self.get_patch(id).map(Patch::display_name)
    }

    pub fn alternatives_of(&self, mod_entry: &Mod) -> Vec<&Mod> {
        self.mods
            .iter()
            .filter(|other| other.id != mod_entry.id)
            .filter(|other| {
                other.lists_alternative(&mod_entry.id) || mod_entry.lists_alternative(&other.id)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty() && self.patches.is_empty()
    }
}
