//! Compatibility resolution for mod and patch selections.
//!
//! A [`Catalog`] of mods and patches is loaded once; a [`Resolver`] then owns
//! the user's selection, refuses toggles that would break dependency or
//! conflict rules, and evicts items that become invalid after a change.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod reference;
pub mod relation;
pub mod resolver;
pub mod selection;
pub mod template;
pub mod visibility;

pub use catalog::{Catalog, CatalogIndex, CatalogItem, ItemKind, Mod, Patch};
pub use error::{CatalogError, TemplateError};
pub use reference::{parse_refs, RefToken, VersionedRef};
pub use resolver::{Eviction, EvictionReason, ItemReport, ItemStatus, Resolver};
pub use selection::Selection;
