use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog directory {} does not exist", .0.display())]
    MissingDir(PathBuf),

    #[error("read catalog index {}: {source}", .path.display())]
    ReadIndex {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse catalog index {}: {source}", .path.display())]
    ParseIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template source folder {} does not exist", .0.display())]
    MissingFolder(PathBuf),

    #[error("no .umap or .uasset files under {}", .0.display())]
    NoAssets(PathBuf),

    #[error("walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("serialize patch template: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write patch template {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
