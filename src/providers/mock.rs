/*!
 * Mock provider implementation for testing.
 *
 * `MockProvider` never touches the network. Its behaviour is scripted:
 * - `MockProvider::working()` - always succeeds, prefixing text with `[<target>] `
 * - `MockProvider::failing()` - every translation fails
 * - `MockProvider::working().fail_for("fr")` - only the listed languages fail
 * - `MockProvider::new(MockBehavior::Intermittent { fail_every: 2 })` - every 2nd call fails
 *
 * Every call is counted so tests can assert on how many requests a run issued.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::TranslationProvider;
use crate::errors::ProviderError;
use crate::extraction::extractor::PLACEHOLDER_REGEX;
use crate::language_utils::{LanguageInfo, supported_languages};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth translate call
    Intermittent { fail_every: usize },
    /// Always fails with an API error
    Failing,
    /// Succeeds but strips every placeholder token from the output
    DropPlaceholders,
    /// Answers with a payload that cannot be understood
    Malformed,
    /// Sleeps before answering (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    failing_languages: HashSet<String>,
    detected_language: Option<String>,
    quality: Option<u8>,
    translate_calls: Arc<AtomicUsize>,
    detect_calls: Arc<AtomicUsize>,
    score_calls: Arc<AtomicUsize>,
    requested_languages: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            failing_languages: HashSet::new(),
            detected_language: None,
            quality: Some(90),
            translate_calls: Arc::new(AtomicUsize::new(0)),
            detect_calls: Arc::new(AtomicUsize::new(0)),
            score_calls: Arc::new(AtomicUsize::new(0)),
            requested_languages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Make translations into `language` fail
    pub fn fail_for(mut self, language: &str) -> Self {
        self.failing_languages.insert(language.to_string());
        self
    }

    /// Answer language detection with `language`; without it detection fails
    pub fn detects(mut self, language: &str) -> Self {
        self.detected_language = Some(language.to_string());
        self
    }

    /// Quality score to report; `None` simulates an assessment failure
    pub fn with_quality(mut self, quality: Option<u8>) -> Self {
        self.quality = quality;
        self
    }

    /// Number of translate calls received (batch items count individually)
    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    /// Number of detect calls received
    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    /// Number of quality score calls received
    pub fn score_calls(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }

    /// Target languages requested, in call order
    pub fn requested_languages(&self) -> Vec<String> {
        self.requested_languages.lock().clone()
    }

    /// The text the mock returns for a successful translation
    pub fn render(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    fn api_failure(message: &str) -> ProviderError {
        ProviderError::ApiError {
            status_code: 500,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.translate_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_languages.lock().push(target_language.to_string());

        if self.failing_languages.contains(target_language) {
            return Err(Self::api_failure(&format!("Mock failure for {}", target_language)));
        }

        match self.behavior {
            MockBehavior::Working => Ok(Self::render(text, target_language)),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(Self::api_failure("Intermittent mock failure"))
                } else {
                    Ok(Self::render(text, target_language))
                }
            }
            MockBehavior::Failing => Err(Self::api_failure("Mock provider always fails")),
            MockBehavior::DropPlaceholders => {
                let stripped = PLACEHOLDER_REGEX.replace_all(text, "");
                Ok(Self::render(&stripped, target_language))
            }
            MockBehavior::Malformed => Err(ProviderError::ParseError(
                "Response is missing 'translated_text'".to_string(),
            )),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(Self::render(text, target_language))
            }
        }
    }

    async fn detect_language(&self, _text: &str) -> Result<String, ProviderError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        self.detected_language
            .clone()
            .ok_or_else(|| Self::api_failure("Mock detection unavailable"))
    }

    async fn quality_score(&self, _original: &str, _translated: &str) -> u8 {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        self.quality.map(|q| q.min(100)).unwrap_or(0)
    }

    async fn supported_languages(&self) -> Result<Vec<LanguageInfo>, ProviderError> {
        Ok(supported_languages())
    }
}
