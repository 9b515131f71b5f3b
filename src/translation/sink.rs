/*!
 * Destinations for reconstructed documents.
 */

use log::debug;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::document::Document;
use crate::errors::TranslationError;
use crate::file_utils::FileManager;

/// Receives each translated document as soon as its language completes
pub trait DocumentSink: Send + Sync {
    /// Persist `content`, the translation of `document` into `language`
    fn write(&self, document: &Document, language: &str, content: &str) -> Result<(), TranslationError>;
}

/// Writes `<output_dir>/<language>/<document key>` atomically
#[derive(Debug, Clone)]
pub struct DirectorySink {
    output_dir: PathBuf,
}

impl DirectorySink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the translation of `document_key` into `language` lands
    pub fn target_path(&self, language: &str, document_key: &str) -> PathBuf {
        FileManager::output_path(&self.output_dir, language, document_key)
    }
}

impl DocumentSink for DirectorySink {
    fn write(&self, document: &Document, language: &str, content: &str) -> Result<(), TranslationError> {
        let path = self.target_path(language, document.key());
        FileManager::write_atomic(&path, content)
            .map_err(|e| TranslationError::Output(format!("{:?}: {:#}", path, e)))?;

        debug!("Wrote {} translation of '{}' to {:?}", language, document.key(), path);
        Ok(())
    }
}

/// Drops every translation; callers read results from the `PipelineRun`
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl DocumentSink for DiscardSink {
    fn write(&self, _document: &Document, _language: &str, _content: &str) -> Result<(), TranslationError> {
        Ok(())
    }
}

/// Keeps translations in memory, keyed by `(document key, language)`
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    documents: Arc<Mutex<BTreeMap<(String, String), String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored translation, if any
    pub fn get(&self, document_key: &str, language: &str) -> Option<String> {
        self.documents
            .lock()
            .get(&(document_key.to_string(), language.to_string()))
            .cloned()
    }

    /// Number of stored translations
    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }
}

impl DocumentSink for MemorySink {
    fn write(&self, document: &Document, language: &str, content: &str) -> Result<(), TranslationError> {
        self.documents
            .lock()
            .insert((document.key().to_string(), language.to_string()), content.to_string());
        Ok(())
    }
}
