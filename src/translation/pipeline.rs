/*!
 * Pipeline orchestration.
 *
 * For each document: validate, consult the change cache, resolve the source
 * language, extract protected spans, then translate into every target language in
 * order. Each language is retried, reconstructed, scored and handed to the sink on
 * its own, so one failing language never blocks the others. The cache is updated
 * once all languages were attempted, according to the `CachePolicy`.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::cache::{CacheEntry, ChangeCache};
use super::concurrency::{CallLimiter, RetryPolicy, with_retry};
use super::document::Document;
use super::report::{LanguageFailure, PipelineRun, RunStatus, RunSummary, TranslationResult};
use super::sink::DocumentSink;
use crate::errors::TranslationError;
use crate::extraction::{ContentExtractor, ExtractionResult, ExtractorOptions, reconstruct_with_report};
use crate::language_detector::{LanguageDetector, detect_heuristic};
use crate::language_utils::same_language;
use crate::providers::TranslationProvider;

/// Source language value that triggers detection
pub const AUTO_LANGUAGE: &str = "auto";

/// Whether `code` asks for detection (`auto` or blank)
pub fn is_auto_language(code: &str) -> bool {
    let code = code.trim();
    code.is_empty() || code.eq_ignore_ascii_case(AUTO_LANGUAGE)
}

/// When the change cache is written after a document was processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CachePolicy {
    /// After every language was attempted, even if some failed
    #[default]
    Always,
    /// Only when no language failed
    OnFullSuccess,
}

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Source language code, or `auto`
    pub source_language: String,
    /// Target language codes, processed in this order
    pub target_languages: Vec<String>,
    /// Skip documents whose fingerprint matches the cache
    pub incremental: bool,
    /// When to write the change cache
    pub cache_policy: CachePolicy,
    /// Ask the provider for a quality score per translation
    pub quality_scoring: bool,
    /// Ceiling on in-flight provider calls
    pub max_concurrent_requests: usize,
    /// Documents processed at the same time
    pub max_concurrent_documents: usize,
    /// Bound on each provider call
    pub call_timeout: Duration,
    /// Retry behaviour for translation calls
    pub retry: RetryPolicy,
    /// What the extractor protects
    pub extractor: ExtractorOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            source_language: AUTO_LANGUAGE.to_string(),
            target_languages: Vec::new(),
            incremental: false,
            cache_policy: CachePolicy::Always,
            quality_scoring: true,
            max_concurrent_requests: 4,
            max_concurrent_documents: 4,
            call_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            extractor: ExtractorOptions::default(),
        }
    }
}

impl PipelineOptions {
    /// Options for a source language and target list, other settings at their defaults
    pub fn new<S: AsRef<str>>(source_language: &str, target_languages: &[S]) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_languages: target_languages.iter().map(|t| t.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    pub fn cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }

    pub fn quality_scoring(mut self, quality_scoring: bool) -> Self {
        self.quality_scoring = quality_scoring;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn concurrency(mut self, requests: usize, documents: usize) -> Self {
        self.max_concurrent_requests = requests;
        self.max_concurrent_documents = documents;
        self
    }
}

/// Cooperative cancellation shared between the pipeline and whoever stops it
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; documents already started still finish
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Document translation pipeline
#[derive(Debug)]
pub struct Pipeline {
    provider: Arc<dyn TranslationProvider>,
    detector: LanguageDetector,
    extractor: ContentExtractor,
    cache: Option<ChangeCache>,
    limiter: CallLimiter,
    options: PipelineOptions,
}

impl Pipeline {
    /// Build a pipeline; without a cache every document is processed every time
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        cache: Option<ChangeCache>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            detector: LanguageDetector::with_provider(provider.clone()),
            extractor: ContentExtractor::with_options(options.extractor.clone()),
            limiter: CallLimiter::new(options.max_concurrent_requests, options.call_timeout),
            provider,
            cache,
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn cache(&self) -> Option<&ChangeCache> {
        self.cache.as_ref()
    }

    pub fn provider(&self) -> &Arc<dyn TranslationProvider> {
        &self.provider
    }

    /// Process one document against the configured languages
    pub async fn process_document(&self, document: &Document, sink: &dyn DocumentSink) -> PipelineRun {
        self.process_with(
            document,
            &self.options.source_language,
            &self.options.target_languages,
            sink,
        )
        .await
    }

    /// Process one document with an explicit source language and target list
    pub async fn process_with(
        &self,
        document: &Document,
        source_language: &str,
        target_languages: &[String],
        sink: &dyn DocumentSink,
    ) -> PipelineRun {
        let key = document.key();

        if document.is_empty() {
            warn!("Skipping '{}': document is empty", key);
            return PipelineRun::invalid(key, TranslationError::Validation(format!("Document '{}' is empty", key)));
        }
        if target_languages.is_empty() {
            return PipelineRun::invalid(
                key,
                TranslationError::Validation("No target languages requested".to_string()),
            );
        }

        if self.options.incremental {
            if let Some(cache) = &self.cache {
                if cache.is_unchanged(key, document.fingerprint()) {
                    info!("Unchanged, skipping: {}", key);
                    return PipelineRun::new(key, RunStatus::Unchanged);
                }
            }
        }

        let mut run = PipelineRun::new(key, RunStatus::Translated);

        let source = self.resolve_source(document, source_language).await;
        debug!("Source language for '{}': {}", key, source);
        run.source_language = Some(source.clone());

        let extraction = self.extractor.extract(document.raw_content());
        if extraction.metadata.has_placeholder_collision {
            warn!(
                "'{}' already contains placeholder-shaped text; it may be altered on reconstruction",
                key
            );
        }

        for target in target_languages {
            if same_language(&source, target) {
                debug!("Skipping {} for '{}': same as source", target, key);
                run.skipped_languages.push(target.clone());
                continue;
            }

            match self.translate_language(&extraction, &source, target, key).await {
                Ok((result, attempts)) => match sink.write(document, target, &result.translated_content) {
                    Ok(()) => {
                        info!("Translated {} -> {} ({})", key, target, source);
                        run.results.insert(target.clone(), result);
                    }
                    Err(e) => {
                        error!("Cannot write {} translation of '{}': {}", target, key, e);
                        run.failures.push(LanguageFailure {
                            language: target.clone(),
                            error: e,
                            attempts,
                        });
                    }
                },
                Err(failure) => {
                    error!("Translation of '{}' into {} failed: {}", key, target, failure.error);
                    run.failures.push(failure);
                }
            }
        }

        run.cache_updated = self.update_cache(document, &run);
        run
    }

    /// Process many documents concurrently, checking `cancel` before each one
    pub async fn run_documents<F>(
        &self,
        documents: Vec<Document>,
        sink: &dyn DocumentSink,
        cancel: &CancellationFlag,
        on_complete: F,
    ) -> RunSummary
    where
        F: Fn(&PipelineRun),
    {
        let on_complete = &on_complete;
        let concurrency = self.options.max_concurrent_documents.max(1);

        let mut runs = stream::iter(documents)
            .map(|document| async move {
                if cancel.is_cancelled() {
                    debug!("Cancelled before start: {}", document.key());
                    return PipelineRun::new(document.key(), RunStatus::Cancelled);
                }

                let run = self.process_document(&document, sink).await;
                on_complete(&run);
                run
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .await;

        runs.sort_by(|a, b| a.document_key.cmp(&b.document_key));

        RunSummary {
            runs,
            cancelled: cancel.is_cancelled(),
        }
    }

    async fn resolve_source(&self, document: &Document, configured: &str) -> String {
        if !is_auto_language(configured) {
            return configured.trim().to_lowercase();
        }

        match self.limiter.bounded(self.detector.detect(document.raw_content())).await {
            Some(language) => language,
            None => {
                warn!("Language detection for '{}' timed out, using heuristic", document.key());
                detect_heuristic(document.raw_content()).to_string()
            }
        }
    }

    async fn translate_language(
        &self,
        extraction: &ExtractionResult,
        source: &str,
        target: &str,
        key: &str,
    ) -> Result<(TranslationResult, u32), LanguageFailure> {
        let label = format!("{} [{}]", key, target);
        let text = extraction.translatable_text.as_str();

        let (outcome, attempts) = with_retry(&self.options.retry, &label, || {
            self.limiter.call(self.provider.translate(text, source, target))
        })
        .await;

        let translated = outcome.map_err(|error| LanguageFailure {
            language: target.to_string(),
            error,
            attempts,
        })?;

        let reconstruction = reconstruct_with_report(&translated, &extraction.protected_spans);
        if !reconstruction.is_complete() {
            warn!(
                "{}: provider dropped {} placeholder(s) {:?}; their content is missing",
                label,
                reconstruction.missing.len(),
                reconstruction.missing
            );
        }

        let quality_score = if self.options.quality_scoring {
            self.limiter
                .bounded(self.provider.quality_score(text, &translated))
                .await
                .unwrap_or_else(|| {
                    warn!("{}: quality assessment timed out", label);
                    0
                })
        } else {
            0
        };

        let result = TranslationResult {
            language: target.to_string(),
            translated_content: reconstruction.content,
            quality_score,
            missing_placeholders: reconstruction.missing,
        };
        Ok((result, attempts))
    }

    fn update_cache(&self, document: &Document, run: &PipelineRun) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };

        if self.options.cache_policy == CachePolicy::OnFullSuccess && !run.failures.is_empty() {
            debug!("Not caching '{}': {} language(s) failed", document.key(), run.failures.len());
            return false;
        }

        match cache.set(document.key(), &CacheEntry::new(document.fingerprint())) {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache update failed for '{}': {}", document.key(), e);
                false
            }
        }
    }
}
