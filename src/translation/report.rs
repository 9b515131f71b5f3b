/*!
 * Outcome types reported by the pipeline.
 */

use std::collections::BTreeMap;

use crate::errors::TranslationError;

/// Terminal state of one document run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Translation was attempted for every requested language
    Translated,
    /// Fingerprint matched the cache; nothing was sent to the provider
    Unchanged,
    /// The document was rejected before any provider call
    Invalid,
    /// Cancellation was requested before the document started
    Cancelled,
}

/// Translation of a document into one language
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    /// Target language code
    pub language: String,
    /// Reconstructed document in the target language
    pub translated_content: String,
    /// Provider quality estimate from 0 to 100; 0 when scoring is off or failed
    pub quality_score: u8,
    /// Placeholder indices the provider dropped; their content is missing from the output
    pub missing_placeholders: Vec<usize>,
}

/// A target language that could not be produced
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageFailure {
    /// Target language code
    pub language: String,
    /// Last error observed
    pub error: TranslationError,
    /// Provider attempts made, retries included
    pub attempts: u32,
}

/// Everything that happened to one document
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Document key
    pub document_key: String,
    /// Terminal state
    pub status: RunStatus,
    /// Resolved source language, once known
    pub source_language: Option<String>,
    /// Successful translations by language
    pub results: BTreeMap<String, TranslationResult>,
    /// Failed languages
    pub failures: Vec<LanguageFailure>,
    /// Targets skipped because they equal the source language
    pub skipped_languages: Vec<String>,
    /// Document-level error for `Invalid` runs
    pub error: Option<TranslationError>,
    /// Whether the change cache was written for this document
    pub cache_updated: bool,
}

impl PipelineRun {
    pub(crate) fn new(document_key: &str, status: RunStatus) -> Self {
        Self {
            document_key: document_key.to_string(),
            status,
            source_language: None,
            results: BTreeMap::new(),
            failures: Vec::new(),
            skipped_languages: Vec::new(),
            error: None,
            cache_updated: false,
        }
    }

    pub(crate) fn invalid(document_key: &str, error: TranslationError) -> Self {
        let mut run = Self::new(document_key, RunStatus::Invalid);
        run.error = Some(error);
        run
    }

    /// No language failed and the document was not rejected
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.status != RunStatus::Invalid
    }

    /// Codes of the languages that failed
    pub fn failed_languages(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.language.as_str()).collect()
    }

    /// Whether any translation lost placeholders
    pub fn has_missing_placeholders(&self) -> bool {
        self.results.values().any(|r| !r.missing_placeholders.is_empty())
    }
}

/// Outcome of a run over many documents
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// One entry per document, ordered by key
    pub runs: Vec<PipelineRun>,
    /// Whether cancellation was requested during the run
    pub cancelled: bool,
}

impl RunSummary {
    fn count(&self, status: RunStatus) -> usize {
        self.runs.iter().filter(|r| r.status == status).count()
    }

    /// Documents sent to the provider
    pub fn translated_documents(&self) -> usize {
        self.count(RunStatus::Translated)
    }

    /// Documents skipped by the change cache
    pub fn unchanged_documents(&self) -> usize {
        self.count(RunStatus::Unchanged)
    }

    /// Documents never started because of cancellation
    pub fn cancelled_documents(&self) -> usize {
        self.count(RunStatus::Cancelled)
    }

    /// Documents rejected or with at least one failed language
    pub fn failed_documents(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| r.status != RunStatus::Cancelled && !r.is_success())
            .count()
    }

    /// Successful document-language pairs
    pub fn translations(&self) -> usize {
        self.runs.iter().map(|r| r.results.len()).sum()
    }

    /// Failed document-language pairs
    pub fn language_failures(&self) -> usize {
        self.runs.iter().map(|r| r.failures.len()).sum()
    }

    /// Every run completed without failures
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failed_documents() == 0
    }
}
