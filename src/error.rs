use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    /// The project root itself could not be enumerated. This is the only
    /// failure that aborts a graph build.
    #[error("cannot enumerate project root {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error in {path}: {detail}")]
    Config { path: PathBuf, detail: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImpactError>;
