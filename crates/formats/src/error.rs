use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("project parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported project version: {found}")]
    UnsupportedVersion { found: u32 },
}
