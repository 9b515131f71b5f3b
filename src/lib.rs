/*!
 * # devdocs-global - documentation translation pipeline
 *
 * A Rust library for translating markdown documentation into many languages
 * while keeping code untouched.
 *
 * ## Features
 *
 * - Code fences, inline code and URLs are protected from translation with
 *   placeholder tokens and restored verbatim afterwards
 * - Incremental runs: a fingerprint cache skips documents that did not change
 * - Source language detection through the provider with a local fallback
 * - Per-language failure isolation, retries with backoff and bounded concurrency
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `extraction`: Protected span extraction and document reconstruction
 * - `translation`: Pipeline and supporting pieces:
 *   - `translation::pipeline`: Per-document orchestration
 *   - `translation::cache`: Change cache for incremental runs
 *   - `translation::concurrency`: Call limiter and retry policy
 *   - `translation::service`: Request/response API
 * - `language_detector`: Source language detection
 * - `providers`: Translation provider clients:
 *   - `providers::lingo`: Lingo API client
 *   - `providers::mock`: Scripted provider for tests
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod extraction;
pub mod file_utils;
pub mod language_detector;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, ProviderError, TranslationError};
pub use extraction::{ContentExtractor, ExtractionResult, reconstruct};
pub use language_detector::LanguageDetector;
pub use providers::{LingoClient, MockProvider, TranslationProvider};
pub use translation::{
    CachePolicy, CancellationFlag, ChangeCache, Document, Pipeline, PipelineOptions, PipelineRun, RunSummary,
    TranslationService,
};
