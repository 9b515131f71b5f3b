/*!
 * Error types for the devdocs-global pipeline.
 *
 * The library reports failures through `thiserror` enums:
 * - `ProviderError`: anything that went wrong talking to the translation provider
 * - `TranslationError`: the pipeline taxonomy (validation, provider, timeout, cache, output)
 * - `AppError`: application-level wrapper used by the controller and CLI
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The provider answered but flagged the request as unsuccessful
    #[error("Provider rejected the request: {0}")]
    Rejected(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// No response within the configured bound
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors produced by the translation pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// Empty or missing required input; raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider failed or returned a malformed response
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// No response from the provider within the bound
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The change cache could not be read or written
    #[error("Cache I/O error: {0}")]
    CacheIo(String),

    /// A reconstructed document could not be persisted
    #[error("Output error: {0}")]
    Output(String),
}

impl TranslationError {
    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Provider(provider) => !matches!(provider, ProviderError::AuthenticationError(_)),
            _ => false,
        }
    }
}

impl From<ProviderError> for TranslationError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Timeout(message) => Self::Timeout(message),
            other => Self::Provider(other),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
