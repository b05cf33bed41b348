use std::path::PathBuf;

use hypergen_core::{DeclarationError, SchemaError};
use thiserror::Error;

/// Errors surfaced by the `hypergen` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No hyperschema source configured. Pass --source or set `source` in hypergen.toml.")]
    MissingSource,

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetching {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid JSON from {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Declaration(#[from] DeclarationError),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}
