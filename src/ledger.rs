//! Append-only record of companies already applied to

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Newline-terminated company names, read once per run.
///
/// Membership means the name followed by a line terminator appears as a
/// line of the file. The file is only ever appended to.
pub struct AppliedLedger {
    path: PathBuf,
    lines: Vec<String>,
}

impl AppliedLedger {
    /// Read the ledger. A missing or unreadable file is an empty ledger.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lines = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw.split_inclusive('\n').map(str::to_string).collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No applied ledger yet, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %path.display(), "Applied ledger cannot be read, treating as empty: {}", e);
                Vec::new()
            }
        };

        Self { path, lines }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        let entry = format!("{name}\n");
        self.lines.iter().any(|line| *line == entry)
    }

    /// Append `name` to the file, creating it on first write.
    ///
    /// An unterminated last line is closed first so the new entry always
    /// lands on a line of its own.
    pub async fn append(&mut self, name: &str) -> Result<()> {
        let entry = format!("{name}\n");
        let needs_break = ends_unterminated(&self.path).await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening {}", self.path.display()))?;
        if needs_break {
            file.write_all(b"\n")
                .await
                .with_context(|| format!("appending to {}", self.path.display()))?;
            if let Some(last) = self.lines.last_mut()
                && !last.ends_with('\n')
            {
                last.push('\n');
            }
        }
        file.write_all(entry.as_bytes())
            .await
            .with_context(|| format!("appending to {}", self.path.display()))?;
        file.flush().await?;

        self.lines.push(entry);
        Ok(())
    }
}

/// Whether the file exists, is non-empty and its last byte is not `\n`.
async fn ends_unterminated(path: &Path) -> bool {
    match tokio::fs::read(path).await {
        Ok(bytes) => bytes.last().is_some_and(|&b| b != b'\n'),
        Err(_) => false,
    }
}
