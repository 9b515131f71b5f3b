/*!
 * Source documents fed to the pipeline.
 */

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::cache::fingerprint;
use crate::file_utils::FileManager;

/// A source document, immutable while it is processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Logical identity: path relative to the source root, `/`-separated
    key: String,
    /// Location on disk, when the document came from a file
    path: Option<PathBuf>,
    /// Original text
    raw_content: String,
    /// SHA-256 hex digest of `raw_content`
    fingerprint: String,
}

impl Document {
    /// Create an in-memory document
    pub fn new(key: impl Into<String>, raw_content: impl Into<String>) -> Self {
        let raw_content = raw_content.into();
        Self {
            key: key.into(),
            path: None,
            fingerprint: fingerprint(&raw_content),
            raw_content,
        }
    }

    /// Read a document from disk, keyed by its path relative to `root`
    pub fn from_file(root: &Path, path: &Path) -> Result<Self> {
        let raw_content = FileManager::read_to_string(path)
            .with_context(|| format!("Failed to load document {:?}", path))?;

        let mut document = Self::new(FileManager::relative_key(root, path), raw_content);
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Whether there is anything to translate at all
    pub fn is_empty(&self) -> bool {
        self.raw_content.trim().is_empty()
    }
}
