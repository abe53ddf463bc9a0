use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{Company, CompanyEntry};

/// JSON document mapping company name to its persisted entry.
///
/// Saving merges into whatever is on disk: every in-memory company replaces
/// its whole entry, other names are left untouched.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document, or an empty mapping when absent or unreadable.
    pub async fn read(&self) -> Map<String, Value> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "JSON document does not exist yet");
                return Map::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Unexpected error reading JSON document: {}", e);
                return Map::new();
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %self.path.display(), "JSON document is not a mapping: {}", e);
                Map::new()
            }
        }
    }

    /// Merge `companies` into the document and write the union back.
    ///
    /// The new document is written next to the old one and renamed over it,
    /// so a failure leaves the previous document intact.
    ///
    /// # Returns
    /// * `Result<usize>` - Number of entries in the written document
    pub async fn merge(&self, companies: &[Company]) -> Result<usize> {
        if companies.is_empty() {
            return Ok(0);
        }

        let mut document = self.read().await;
        for company in companies {
            document.insert(company.name.clone(), serde_json::to_value(company.to_entry())?);
        }

        let body = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating directory for {}", self.path.display()))?;
        }

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, body)
            .await
            .with_context(|| format!("writing {}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;

        Ok(document.len())
    }

    /// Every entry of the document as a company. Malformed entries are skipped.
    pub async fn load_companies(&self) -> Vec<Company> {
        self.read()
            .await
            .into_iter()
            .filter_map(|(name, value)| match serde_json::from_value::<CompanyEntry>(value) {
                Ok(entry) => Some(Company::from_entry(&name, entry)),
                Err(e) => {
                    warn!(company = %name, path = %self.path.display(), "Skipping malformed entry: {}", e);
                    None
                }
            })
            .collect()
    }
}
