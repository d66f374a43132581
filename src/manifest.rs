//! Reading `package.json` manifests

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Name of the manifest file probed in every candidate directory
pub const MANIFEST_FILENAME: &str = "package.json";

/// Top-level field marking a manifest as a workspace root
pub const WORKSPACES_FIELD: &str = "workspaces";

/// Errors that can occur while reading a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Unable to read manifest {path}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("Unable to parse manifest {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// A parsed manifest. Only top-level JSON objects are accepted.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    /// Parse a manifest from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Json` if the text is not a JSON object.
    pub fn parse(contents: &str, path: &Path) -> Result<Manifest, ManifestError> {
        serde_json::from_str(contents).map_err(|e| ManifestError::Json {
            source: e,
            path: path.to_path_buf(),
        })
    }

    /// Read and parse the manifest in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Io` if the file cannot be read, or
    /// `ManifestError::Json` if it cannot be parsed.
    pub async fn from_dir(dir: &Path) -> Result<Manifest, ManifestError> {
        let path = dir.join(MANIFEST_FILENAME);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ManifestError::Io {
                source: e,
                path: path.clone(),
            })?;
        Self::parse(&contents, &path)
    }

    /// Whether the manifest declares workspace sub-packages.
    ///
    /// The field only has to be truthy: an empty list still counts, while
    /// `false`, `null`, `0` and `""` do not.
    #[must_use]
    pub fn declares_workspaces(&self) -> bool {
        self.0.get(WORKSPACES_FIELD).is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
