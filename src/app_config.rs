use anyhow::{Context, Result, anyhow};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::extraction::ExtractorOptions;
use crate::language_utils::validate_language_code;
use crate::providers::ProviderSettings;
use crate::providers::lingo::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::translation::concurrency::RetryPolicy;
use crate::translation::pipeline::{AUTO_LANGUAGE, CachePolicy, PipelineOptions};

/// Application configuration module
/// This module handles loading, validating and saving `devdocs.config.json`.

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "devdocs.config.json";

/// Environment variable consulted when the config carries no API key
pub const API_KEY_ENV: &str = "LINGO_API_KEY";

/// Value written by older `init` runs in place of a real key
const API_KEY_PLACEHOLDER: &str = "your-lingo-api-key";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Source language code, or `auto` to detect per document
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Directory scanned for documents
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Target language codes, in processing order
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Translations land in `<output_dir>/<language>/`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Provider credential; empty means "read LINGO_API_KEY"
    #[serde(default)]
    pub api_key: String,

    /// Change cache directory
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Skip documents unchanged since the last run
    #[serde(default)]
    pub incremental: bool,

    /// Also translate `.txt` files
    #[serde(default)]
    pub include_txt: bool,

    /// When to write the change cache
    #[serde(default)]
    pub cache_policy: CachePolicy,

    /// Ask the provider to score each translation
    #[serde(default = "default_true")]
    pub quality_scoring: bool,

    /// What the extractor protects from translation
    #[serde(default)]
    pub extraction: ExtractorOptions,

    /// Provider connection and throughput settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Provider configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Timeout seconds per call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Max concurrent provider calls
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Max documents in flight
    #[serde(default = "default_concurrent_documents")]
    pub concurrent_documents: usize,

    // @field: Retries after the first attempt
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    // @field: Base backoff, doubled per retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            concurrent_requests: default_concurrent_requests(),
            concurrent_documents: default_concurrent_documents(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    AUTO_LANGUAGE.to_string()
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("./docs")
}

fn default_target_languages() -> Vec<String> {
    ["es", "fr", "de", "ja", "hi", "zh"].iter().map(|s| s.to_string()).collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./docs")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./.lingo-cache")
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_concurrent_documents() -> usize {
    4
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Load a configuration file, or the defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !self.source_language.eq_ignore_ascii_case(AUTO_LANGUAGE) {
            validate_language_code(&self.source_language)
                .with_context(|| format!("Invalid source language '{}'", self.source_language))?;
        }

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for code in &self.target_languages {
            validate_language_code(code).with_context(|| format!("Invalid target language '{}'", code))?;
        }

        if self.provider.timeout_secs == 0 {
            return Err(anyhow!("provider.timeoutSecs must be greater than zero"));
        }
        if self.provider.concurrent_requests == 0 || self.provider.concurrent_documents == 0 {
            return Err(anyhow!("provider concurrency settings must be greater than zero"));
        }

        Ok(())
    }

    /// The API key from the config, or from `LINGO_API_KEY` when unset
    pub fn resolved_api_key(&self) -> Option<String> {
        let configured = self.api_key.trim();
        if !configured.is_empty() && configured != API_KEY_PLACEHOLDER {
            return Some(configured.to_string());
        }

        std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// The API key, or an error naming both places it can come from
    pub fn require_api_key(&self) -> Result<String> {
        self.resolved_api_key().ok_or_else(|| {
            anyhow!(
                "API key required. Set apiKey in {} or the {} environment variable",
                DEFAULT_CONFIG_FILE,
                API_KEY_ENV
            )
        })
    }

    /// Connection settings for the provider client
    pub fn provider_settings(&self, api_key: impl Into<String>) -> ProviderSettings {
        ProviderSettings::new(api_key)
            .endpoint(self.provider.endpoint.clone())
            .model(self.provider.model.clone())
            .timeout(Duration::from_secs(self.provider.timeout_secs))
    }

    /// Pipeline settings derived from this configuration
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            source_language: self.source_language.clone(),
            target_languages: self.target_languages.clone(),
            incremental: self.incremental,
            cache_policy: self.cache_policy,
            quality_scoring: self.quality_scoring,
            max_concurrent_requests: self.provider.concurrent_requests,
            max_concurrent_documents: self.provider.concurrent_documents,
            call_timeout: Duration::from_secs(self.provider.timeout_secs),
            retry: RetryPolicy::new(self.provider.retry_count, self.provider.retry_backoff_ms),
            extractor: self.extraction.clone(),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            source_dir: default_source_dir(),
            target_languages: default_target_languages(),
            output_dir: default_output_dir(),
            api_key: String::new(),
            cache_dir: default_cache_dir(),
            incremental: false,
            include_txt: false,
            cache_policy: CachePolicy::default(),
            quality_scoring: true,
            extraction: ExtractorOptions::default(),
            provider: ProviderConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
