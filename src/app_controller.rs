use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_detector::LanguageDetector;
use crate::providers::{LingoClient, TranslationProvider};
use crate::translation::{
    CacheStats, CancellationFlag, ChangeCache, DirectorySink, Document, Pipeline, PipelineRun, RunStatus,
    RunSummary,
};

// @module: Application controller for documentation translation

/// Snapshot reported by the `status` command
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Documents currently discoverable
    pub documents: usize,
    /// Change cache statistics
    pub cache: CacheStats,
    /// Whether an API key is available from config or environment
    pub api_key_configured: bool,
}

/// Main application controller for documentation translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the Lingo client from the configured credentials
    pub fn build_provider(&self) -> Result<Arc<dyn TranslationProvider>, AppError> {
        let api_key = self
            .config
            .require_api_key()
            .map_err(|e| AppError::Config(e.to_string()))?;
        let client = LingoClient::new(self.config.provider_settings(api_key))?;
        Ok(Arc::new(client))
    }

    /// Change cache at the configured location
    pub fn cache(&self) -> ChangeCache {
        ChangeCache::new(&self.config.cache_dir)
    }

    /// Directories holding generated translations, never read as sources
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        self.config
            .target_languages
            .iter()
            .map(|language| self.config.output_dir.join(language))
            .collect()
    }

    /// Every source document under the source directory
    pub fn discover_documents(&self) -> Result<Vec<Document>> {
        let source_dir = &self.config.source_dir;
        if !FileManager::dir_exists(source_dir) {
            return Err(anyhow!("Source directory does not exist: {:?}", source_dir));
        }

        let extensions = FileManager::document_extensions(self.config.include_txt);
        let files = FileManager::find_files(source_dir, &extensions, &self.output_dirs())?;

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            match Document::from_file(source_dir, &file) {
                Ok(document) => documents.push(document),
                Err(e) => warn!("Skipping unreadable document {:?}: {:#}", file, e),
            }
        }

        debug!("Discovered {} document(s) in {:?}", documents.len(), source_dir);
        Ok(documents)
    }

    /// Translate every document with the configured provider
    pub async fn run(&self, cancel: CancellationFlag) -> Result<RunSummary> {
        let provider = self.build_provider()?;
        self.run_with_provider(provider, cancel).await
    }

    /// Translate every document with the given provider
    pub async fn run_with_provider(
        &self,
        provider: Arc<dyn TranslationProvider>,
        cancel: CancellationFlag,
    ) -> Result<RunSummary> {
        let start_time = Instant::now();
        let documents = self.discover_documents()?;
        if documents.is_empty() {
            warn!("No documents found in {:?}", self.config.source_dir);
            return Ok(RunSummary::default());
        }

        info!(
            "Translating {} document(s) into {} via {}",
            documents.len(),
            self.config.target_languages.join(", "),
            provider.name()
        );

        let pipeline = Pipeline::new(provider, Some(self.cache()), self.config.pipeline_options());
        let sink = DirectorySink::new(&self.config.output_dir);

        let progress_bar = ProgressBar::new(documents.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} docs ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=>-"));

        let summary = pipeline
            .run_documents(documents, &sink, &cancel, |run: &PipelineRun| {
                progress_bar.inc(1);
                progress_bar.set_message(run.document_key.clone());
            })
            .await;

        progress_bar.finish_and_clear();
        Self::log_summary(&summary, start_time.elapsed());
        Ok(summary)
    }

    fn log_summary(summary: &RunSummary, elapsed: Duration) {
        for run in &summary.runs {
            if run.status == RunStatus::Invalid {
                if let Some(e) = &run.error {
                    warn!("{}: {}", run.document_key, e);
                }
            }
            for failure in &run.failures {
                error!(
                    "{} [{}] failed after {} attempt(s): {}",
                    run.document_key, failure.language, failure.attempts, failure.error
                );
            }
        }

        if summary.cancelled {
            warn!(
                "Run cancelled: {} document(s) were not started",
                summary.cancelled_documents()
            );
        }

        info!(
            "Done in {}: {} translated, {} unchanged, {} failed ({} translations, {} language failures)",
            Self::format_duration(elapsed),
            summary.translated_documents(),
            summary.unchanged_documents(),
            summary.failed_documents(),
            summary.translations(),
            summary.language_failures()
        );
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Document count, cache state and credential availability
    pub fn status(&self) -> Result<StatusReport> {
        let documents = if FileManager::dir_exists(&self.config.source_dir) {
            self.discover_documents()?.len()
        } else {
            0
        };

        Ok(StatusReport {
            documents,
            cache: self.cache().stats(),
            api_key_configured: self.config.resolved_api_key().is_some(),
        })
    }

    /// Remove every change cache record
    pub fn clear_cache(&self) -> Result<usize> {
        let removed = self.cache().clear().context("Failed to clear the change cache")?;
        info!("Cleared {} cache record(s) from {:?}", removed, self.config.cache_dir);
        Ok(removed)
    }

    /// Detect the language of a file; the provider is asked only when a key is available
    pub async fn detect_file(&self, path: &Path) -> Result<String> {
        let content = FileManager::read_to_string(path)?;

        let detector = match self.config.resolved_api_key() {
            Some(_) => LanguageDetector::with_provider(self.build_provider()?),
            None => LanguageDetector::heuristic(),
        };

        Ok(detector.detect(&content).await)
    }
}
