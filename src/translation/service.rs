/*!
 * Programmatic translation API.
 *
 * `TranslationService` is the request/response surface used by integrations:
 * detect a language, translate one piece of content into several languages,
 * batch-translate plain texts, and list supported languages. Requests are
 * validated before any provider call.
 */

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::document::Document;
use super::pipeline::{AUTO_LANGUAGE, Pipeline, PipelineOptions, is_auto_language};
use super::report::RunStatus;
use super::sink::DiscardSink;
use crate::errors::TranslationError;
use crate::extraction::word_count;
use crate::language_detector::LanguageDetector;
use crate::language_utils::{LanguageInfo, same_language, supported_languages, validate_language_code};
use crate::providers::TranslationProvider;

/// Key given to request content inside the pipeline
const REQUEST_KEY: &str = "request";

/// Language detection answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    /// Detected language code
    pub language: String,
    /// Confidence label
    pub confidence: String,
}

/// Translation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// Markdown content to translate
    pub content: String,
    /// Source language code, or `auto`
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Target language codes
    #[serde(default)]
    pub target_languages: Vec<String>,
}

fn default_source_language() -> String {
    AUTO_LANGUAGE.to_string()
}

impl TranslateRequest {
    pub fn new<S: AsRef<str>>(content: impl Into<String>, source_language: &str, target_languages: &[S]) -> Self {
        Self {
            content: content.into(),
            source_language: source_language.to_string(),
            target_languages: target_languages.iter().map(|t| t.as_ref().to_string()).collect(),
        }
    }
}

/// Metadata attached to a translation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Words in the source content
    pub source_word_count: usize,
    /// RFC 3339 time the response was produced
    pub timestamp: String,
}

/// Translation answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    /// Resolved source language
    pub source_language: String,
    /// Reconstructed content by language
    pub translations: BTreeMap<String, String>,
    /// Quality scores by language
    pub scores: BTreeMap<String, u8>,
    /// Error messages by failed language
    pub failures: BTreeMap<String, String>,
    pub metadata: ResponseMetadata,
}

/// Request/response API over the pipeline
#[derive(Debug)]
pub struct TranslationService {
    provider: Arc<dyn TranslationProvider>,
    detector: LanguageDetector,
    pipeline: Pipeline,
}

impl TranslationService {
    /// Build a service; `options` supplies concurrency, timeout, retry and extraction
    /// settings, while languages come from each request
    pub fn new(provider: Arc<dyn TranslationProvider>, options: PipelineOptions) -> Self {
        let options = options.incremental(false);
        Self {
            detector: LanguageDetector::with_provider(provider.clone()),
            pipeline: Pipeline::new(provider.clone(), None, options),
            provider,
        }
    }

    /// Detect the language of `text`
    pub async fn detect_language(&self, text: &str) -> Result<DetectResponse, TranslationError> {
        if text.trim().is_empty() {
            return Err(TranslationError::Validation("Text is required".to_string()));
        }

        Ok(DetectResponse {
            language: self.detector.detect(text).await,
            confidence: "high".to_string(),
        })
    }

    /// Translate content into every requested language
    pub async fn translate(&self, request: &TranslateRequest) -> Result<TranslateResponse, TranslationError> {
        if request.content.trim().is_empty() {
            return Err(TranslationError::Validation("Content is required".to_string()));
        }
        if request.target_languages.is_empty() {
            return Err(TranslationError::Validation("Target languages are required".to_string()));
        }

        let invalid: Vec<&str> = request
            .target_languages
            .iter()
            .filter(|code| validate_language_code(code).is_err())
            .map(String::as_str)
            .collect();
        if !invalid.is_empty() {
            return Err(TranslationError::Validation(format!(
                "Invalid target language code(s): {}",
                invalid.join(", ")
            )));
        }

        let source_language = if is_auto_language(&request.source_language) {
            self.detector.detect(&request.content).await
        } else {
            request.source_language.trim().to_lowercase()
        };

        let targets: Vec<String> = request
            .target_languages
            .iter()
            .filter(|target| !same_language(&source_language, target))
            .cloned()
            .collect();
        if targets.is_empty() {
            return Err(TranslationError::Validation(format!(
                "No valid target languages (all match source language '{}')",
                source_language
            )));
        }

        let document = Document::new(REQUEST_KEY, request.content.as_str());
        let run = self
            .pipeline
            .process_with(&document, &source_language, &targets, &DiscardSink)
            .await;

        if run.status == RunStatus::Invalid {
            return Err(run
                .error
                .unwrap_or_else(|| TranslationError::Validation("Request rejected".to_string())));
        }

        let mut translations = BTreeMap::new();
        let mut scores = BTreeMap::new();
        for (language, result) in run.results {
            scores.insert(language.clone(), result.quality_score);
            translations.insert(language, result.translated_content);
        }
        let failures: BTreeMap<String, String> = run
            .failures
            .into_iter()
            .map(|failure| (failure.language, failure.error.to_string()))
            .collect();

        info!(
            "Translated request into {} language(s), {} failed",
            translations.len(),
            failures.len()
        );

        Ok(TranslateResponse {
            source_language,
            translations,
            scores,
            failures,
            metadata: ResponseMetadata {
                source_word_count: word_count(&request.content),
                timestamp: Utc::now().to_rfc3339(),
            },
        })
    }

    /// Translate several plain texts into several languages in one provider round
    pub async fn batch_translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_languages: &[String],
    ) -> Result<BTreeMap<String, Vec<String>>, TranslationError> {
        if texts.is_empty() || texts.iter().all(|t| t.trim().is_empty()) {
            return Err(TranslationError::Validation("Texts are required".to_string()));
        }
        if target_languages.is_empty() {
            return Err(TranslationError::Validation("Target languages are required".to_string()));
        }

        let timeout = self.pipeline.options().call_timeout;
        match tokio::time::timeout(
            timeout,
            self.provider.batch_translate(texts, source_language, target_languages),
        )
        .await
        {
            Ok(result) => result.map_err(TranslationError::from),
            Err(_) => Err(TranslationError::Timeout(format!("no response within {:?}", timeout))),
        }
    }

    /// Languages offered to callers; the built-in list when the provider cannot answer
    pub async fn supported_languages(&self) -> Vec<LanguageInfo> {
        match self.provider.supported_languages().await {
            Ok(languages) if !languages.is_empty() => languages,
            Ok(_) => supported_languages(),
            Err(e) => {
                warn!("Cannot list provider languages, using built-in list: {}", e);
                supported_languages()
            }
        }
    }
}
