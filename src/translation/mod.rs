/*!
 * Document translation.
 *
 * - `document`: the source document model
 * - `cache`: file-backed change cache for incremental runs
 * - `concurrency`: call limiter and retry policy for provider calls
 * - `pipeline`: per-document orchestration and multi-document runs
 * - `report`: run outcomes
 * - `sink`: destinations for translated documents
 * - `service`: request/response API
 */

pub mod cache;
pub mod concurrency;
pub mod document;
pub mod pipeline;
pub mod report;
pub mod service;
pub mod sink;

pub use self::cache::{CacheEntry, CacheStats, ChangeCache};
pub use self::concurrency::{CallLimiter, RetryPolicy};
pub use self::document::Document;
pub use self::pipeline::{CachePolicy, CancellationFlag, Pipeline, PipelineOptions};
pub use self::report::{LanguageFailure, PipelineRun, RunStatus, RunSummary, TranslationResult};
pub use self::service::{DetectResponse, TranslateRequest, TranslateResponse, TranslationService};
pub use self::sink::{DirectorySink, DiscardSink, DocumentSink, MemorySink};
