use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{TranslationProvider, clamp_score};
use crate::errors::ProviderError;
use crate::language_utils::LanguageInfo;

/// Default public API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.lingo.ai/v1";

/// Default model requested for translations
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// Connection settings for the Lingo API
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Bearer credential sent with every request
    pub api_key: String,
    /// Base URL of the API
    pub endpoint: String,
    /// Model requested for translations
    pub model: String,
    /// Bound on every request
    pub timeout: Duration,
}

impl ProviderSettings {
    /// Settings for the public endpoint with the default model and a 30 second bound
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the request bound
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Translation request body
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    pub text: &'a str,
    pub source_language: &'a str,
    pub target_language: &'a str,
    pub model: &'a str,
    pub preserve_formatting: bool,
    pub preserve_code_blocks: bool,
}

/// Translation response body
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    /// Explicit success flag; absent means "judge by the payload"
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub translated_text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Batch translation request body
#[derive(Debug, Serialize)]
pub struct BatchTranslateRequest<'a> {
    pub texts: &'a [String],
    pub source_language: &'a str,
    pub target_language: &'a str,
    pub model: &'a str,
}

/// Batch translation response body
#[derive(Debug, Deserialize)]
pub struct BatchTranslateResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub translated_texts: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

/// Language detection response body
#[derive(Debug, Deserialize)]
pub struct DetectResponse {
    #[serde(default, alias = "language")]
    pub language_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct QualityRequest<'a> {
    original_text: &'a str,
    translated_text: &'a str,
}

/// Quality assessment response body
#[derive(Debug, Deserialize)]
pub struct QualityResponse {
    pub score: f64,
}

#[derive(Debug, Deserialize)]
struct LanguagesResponse {
    #[serde(default)]
    languages: Vec<LanguageInfo>,
}

/// Client for the Lingo translation API
#[derive(Debug)]
pub struct LingoClient {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL, always ending with a slash so relative joins keep the path
    base_url: Url,
    /// Model requested for translations
    model: String,
}

impl LingoClient {
    /// Create a new client; fails on a missing key or an unusable endpoint
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        if settings.api_key.trim().is_empty() {
            return Err(ProviderError::AuthenticationError("API key is required".to_string()));
        }

        let mut endpoint = settings.endpoint.trim().to_string();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let base_url = Url::parse(&endpoint)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", settings.endpoint, e)))?;

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: settings.api_key,
            base_url,
            model: settings.model,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid request path '{}': {}", path, e)))
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ProviderError> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Lingo API error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ProviderError::AuthenticationError(error_text)
                }
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(error_text),
                _ => ProviderError::ApiError {
                    status_code: status.as_u16(),
                    message: error_text,
                },
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::ParseError(format!("{} in body '{}'", e, preview(&body, 120)))
        })
    }
}

/// First `max_chars` characters of a body, for error messages
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

fn rejection(error: Option<String>, fallback: &str) -> ProviderError {
    ProviderError::Rejected(error.unwrap_or_else(|| fallback.to_string()))
}

#[async_trait]
impl TranslationProvider for LingoClient {
    fn name(&self) -> &str {
        "lingo"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = TranslateRequest {
            text,
            source_language,
            target_language,
            model: &self.model,
            preserve_formatting: true,
            preserve_code_blocks: true,
        };

        let response: TranslateResponse = self.post("translations/create", &request).await?;
        let succeeded = response.success.unwrap_or(response.translated_text.is_some());

        match (succeeded, response.translated_text) {
            (true, Some(translated)) => Ok(translated),
            (true, None) => Err(ProviderError::ParseError(
                "Response is missing 'translated_text'".to_string(),
            )),
            (false, _) => Err(rejection(response.error, "Translation failed")),
        }
    }

    async fn batch_translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_languages: &[String],
    ) -> Result<BTreeMap<String, Vec<String>>, ProviderError> {
        let mut results = BTreeMap::new();

        for target_language in target_languages {
            let request = BatchTranslateRequest {
                texts,
                source_language,
                target_language,
                model: &self.model,
            };

            let response: BatchTranslateResponse = self.post("translations/batch", &request).await?;
            if response.success == Some(false) {
                return Err(rejection(response.error, "Batch translation failed"));
            }

            let translations = response.translated_texts.ok_or_else(|| {
                ProviderError::ParseError("Response is missing 'translated_texts'".to_string())
            })?;
            if translations.len() != texts.len() {
                return Err(ProviderError::ParseError(format!(
                    "Expected {} translations for '{}', got {}",
                    texts.len(),
                    target_language,
                    translations.len()
                )));
            }

            results.insert(target_language.clone(), translations);
        }

        Ok(results)
    }

    async fn detect_language(&self, text: &str) -> Result<String, ProviderError> {
        let response: DetectResponse = self.post("language/detect", &DetectRequest { text }).await?;

        match response.language_code {
            Some(code) if !code.trim().is_empty() => Ok(code.trim().to_lowercase()),
            _ => Err(rejection(response.error, "No language code in response")),
        }
    }

    async fn quality_score(&self, original: &str, translated: &str) -> u8 {
        let request = QualityRequest {
            original_text: original,
            translated_text: translated,
        };

        match self.post::<_, QualityResponse>("quality/assess", &request).await {
            Ok(response) => clamp_score(response.score),
            Err(e) => {
                warn!("Quality assessment failed: {}", e);
                0
            }
        }
    }

    async fn supported_languages(&self) -> Result<Vec<LanguageInfo>, ProviderError> {
        let response: LanguagesResponse = self.get("languages").await?;
        Ok(response.languages)
    }
}
