/*!
 * Provider implementations for the translation service.
 *
 * - `lingo`: HTTP client for the Lingo translation API
 * - `mock`: in-process provider with scripted behaviour, used by tests and dry runs
 */

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::language_utils::LanguageInfo;

/// Common trait for all translation providers
///
/// Implementations are stateless adapters: they build requests, validate responses
/// and surface errors. Retrying is left to the caller.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Translate a single text
    ///
    /// # Arguments
    /// * `text` - Text to translate, placeholder tokens included
    /// * `source_language` - Source language code
    /// * `target_language` - Target language code
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Translate several texts into several languages
    ///
    /// The default implementation issues one `translate` call per text and language.
    async fn batch_translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_languages: &[String],
    ) -> Result<BTreeMap<String, Vec<String>>, ProviderError> {
        let mut results = BTreeMap::new();
        for target in target_languages {
            let mut translations = Vec::with_capacity(texts.len());
            for text in texts {
                translations.push(self.translate(text, source_language, target).await?);
            }
            results.insert(target.clone(), translations);
        }
        Ok(results)
    }

    /// Detect the language of a text
    async fn detect_language(&self, text: &str) -> Result<String, ProviderError>;

    /// Score a translation from 0 to 100; failures yield 0
    async fn quality_score(&self, original: &str, translated: &str) -> u8;

    /// Languages the provider can translate between
    async fn supported_languages(&self) -> Result<Vec<LanguageInfo>, ProviderError>;
}

/// Clamp a provider-supplied score into 0..=100
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

pub mod lingo;
pub mod mock;

pub use self::lingo::{LingoClient, ProviderSettings};
pub use self::mock::{MockBehavior, MockProvider};
