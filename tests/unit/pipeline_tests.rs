/*!
 * Tests for pipeline orchestration
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use devdocs_global::errors::TranslationError;
use devdocs_global::providers::{MockBehavior, MockProvider};
use devdocs_global::translation::concurrency::RetryPolicy;
use devdocs_global::translation::{
    CachePolicy, CancellationFlag, ChangeCache, Document, DocumentSink, MemorySink, Pipeline, PipelineOptions,
    RunStatus,
};

/// Sink whose every write fails
struct ReadOnlySink;

impl DocumentSink for ReadOnlySink {
    fn write(&self, _document: &Document, language: &str, _content: &str) -> Result<(), TranslationError> {
        Err(TranslationError::Output(format!("read-only destination for {}", language)))
    }
}

use crate::common::{self, SAMPLE_MARKDOWN};

fn options(targets: &[&str]) -> PipelineOptions {
    PipelineOptions::new("en", targets).retry(RetryPolicy::none())
}

fn pipeline(provider: &MockProvider, cache: Option<ChangeCache>, options: PipelineOptions) -> Pipeline {
    Pipeline::new(Arc::new(provider.clone()), cache, options)
}

#[tokio::test]
async fn test_process_document_withWorkingProvider_shouldTranslateEveryTarget() {
    common::init_logging();
    let provider = MockProvider::working();
    let pipeline = pipeline(&provider, None, options(&["es", "fr"]));
    let sink = MemorySink::new();
    let document = Document::new("intro.md", SAMPLE_MARKDOWN);

    let run = pipeline.process_document(&document, &sink).await;

    assert_eq!(run.status, RunStatus::Translated);
    assert_eq!(run.source_language.as_deref(), Some("en"));
    assert_eq!(run.results.len(), 2);
    assert!(run.failures.is_empty());
    assert_eq!(provider.requested_languages(), vec!["es", "fr"]);

    let spanish = sink.get("intro.md", "es").unwrap();
    assert!(spanish.starts_with("[es] # Getting Started"));
    assert!(spanish.contains("```bash\nnpm run build\n```"));
    assert!(spanish.contains("`npm install devdocs`"));
    assert!(spanish.contains("https://example.com/docs"));
    assert_eq!(run.results["es"].translated_content, spanish);
    assert_eq!(run.results["es"].quality_score, 90);
}

#[tokio::test]
async fn test_process_document_withEmptyContent_shouldFailValidationWithoutCalls() {
    let provider = MockProvider::working();
    let dir = common::create_temp_dir().unwrap();
    let pipeline = pipeline(&provider, Some(ChangeCache::new(dir.path())), options(&["es"]));

    let run = pipeline.process_document(&Document::new("empty.md", "  \n"), &MemorySink::new()).await;

    assert_eq!(run.status, RunStatus::Invalid);
    assert!(matches!(run.error, Some(TranslationError::Validation(_))));
    assert!(!run.cache_updated);
    assert_eq!(provider.translate_calls(), 0);
    assert_eq!(provider.detect_calls(), 0);
}

#[tokio::test]
async fn test_process_document_twiceIncremental_shouldMakeNoCallsSecondTime() {
    let provider = MockProvider::working();
    let dir = common::create_temp_dir().unwrap();
    let pipeline = pipeline(
        &provider,
        Some(ChangeCache::new(dir.path())),
        options(&["es", "fr"]).incremental(true),
    );
    let sink = MemorySink::new();
    let document = Document::new("intro.md", SAMPLE_MARKDOWN);

    let first = pipeline.process_document(&document, &sink).await;
    let calls_after_first = provider.translate_calls();
    let second = pipeline.process_document(&document, &sink).await;

    assert_eq!(first.status, RunStatus::Translated);
    assert!(first.cache_updated);
    assert_eq!(second.status, RunStatus::Unchanged);
    assert_eq!(provider.translate_calls(), calls_after_first);
    assert_eq!(provider.score_calls(), 2);
}

#[tokio::test]
async fn test_process_document_withChangedContent_shouldTranslateAgain() {
    let provider = MockProvider::working();
    let dir = common::create_temp_dir().unwrap();
    let pipeline = pipeline(
        &provider,
        Some(ChangeCache::new(dir.path())),
        options(&["es"]).incremental(true),
    );
    let sink = MemorySink::new();

    pipeline.process_document(&Document::new("a.md", "Version one"), &sink).await;
    let run = pipeline.process_document(&Document::new("a.md", "Version two"), &sink).await;

    assert_eq!(run.status, RunStatus::Translated);
    assert_eq!(provider.translate_calls(), 2);
}

#[tokio::test]
async fn test_process_document_withoutIncremental_shouldIgnoreCacheButUpdateIt() {
    let provider = MockProvider::working();
    let dir = common::create_temp_dir().unwrap();
    let cache = ChangeCache::new(dir.path());
    let pipeline = pipeline(&provider, Some(cache.clone()), options(&["es"]));
    let document = Document::new("a.md", "Same text");

    pipeline.process_document(&document, &MemorySink::new()).await;
    pipeline.process_document(&document, &MemorySink::new()).await;

    assert_eq!(provider.translate_calls(), 2);
    assert!(cache.is_unchanged("a.md", document.fingerprint()));
}

#[tokio::test]
async fn test_process_document_withTargetEqualToSource_shouldSkipNotFail() {
    let provider = MockProvider::working();
    let pipeline = pipeline(&provider, None, options(&["eng", "es"]));

    let run = pipeline.process_document(&Document::new("a.md", "Hello"), &MemorySink::new()).await;

    assert_eq!(run.skipped_languages, vec!["eng"]);
    assert!(run.failures.is_empty());
    assert_eq!(run.results.keys().collect::<Vec<_>>(), vec!["es"]);
    assert_eq!(provider.requested_languages(), vec!["es"]);
}

#[tokio::test]
async fn test_process_document_withOneFailingLanguage_shouldIsolateFailureAndCache() {
    let provider = MockProvider::working().fail_for("fr");
    let dir = common::create_temp_dir().unwrap();
    let cache = ChangeCache::new(dir.path());
    let pipeline = pipeline(&provider, Some(cache.clone()), options(&["es", "fr"]));
    let sink = MemorySink::new();
    let document = Document::new("a.md", "Hello world");

    let run = pipeline.process_document(&document, &sink).await;

    assert_eq!(run.status, RunStatus::Translated);
    assert!(run.results.contains_key("es"));
    assert_eq!(run.failed_languages(), vec!["fr"]);
    assert!(sink.get("a.md", "es").is_some());
    assert!(sink.get("a.md", "fr").is_none());
    assert!(run.cache_updated);
    assert!(cache.is_unchanged("a.md", document.fingerprint()));
}

#[tokio::test]
async fn test_process_document_withOnFullSuccessPolicy_shouldNotCachePartialFailure() {
    let provider = MockProvider::working().fail_for("fr");
    let dir = common::create_temp_dir().unwrap();
    let cache = ChangeCache::new(dir.path());
    let pipeline = pipeline(
        &provider,
        Some(cache.clone()),
        options(&["es", "fr"]).cache_policy(CachePolicy::OnFullSuccess),
    );
    let document = Document::new("a.md", "Hello world");

    let run = pipeline.process_document(&document, &MemorySink::new()).await;

    assert!(!run.cache_updated);
    assert!(cache.get("a.md").is_none());
}

#[tokio::test]
async fn test_process_document_withTransientFailure_shouldSucceedOnRetry() {
    let provider = MockProvider::new(MockBehavior::Intermittent { fail_every: 2 });
    let opts = PipelineOptions::new("en", &["es", "fr"]).retry(RetryPolicy::new(2, 1));
    let pipeline = pipeline(&provider, None, opts);

    let run = pipeline.process_document(&Document::new("a.md", "Hello"), &MemorySink::new()).await;

    // Second call fails, third succeeds
    assert!(run.failures.is_empty());
    assert_eq!(run.results.len(), 2);
    assert_eq!(provider.translate_calls(), 3);
}

#[tokio::test]
async fn test_process_document_withPersistentFailure_shouldReportAttempts() {
    let provider = MockProvider::failing();
    let opts = PipelineOptions::new("en", &["es"]).retry(RetryPolicy::new(2, 1));
    let pipeline = pipeline(&provider, None, opts);

    let run = pipeline.process_document(&Document::new("a.md", "Hello"), &MemorySink::new()).await;

    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].attempts, 3);
    assert!(matches!(run.failures[0].error, TranslationError::Provider(_)));
}

#[tokio::test]
async fn test_process_document_withSlowProvider_shouldTimeOut() {
    let provider = MockProvider::new(MockBehavior::Slow { delay_ms: 500 });
    let opts = options(&["es"]).call_timeout(Duration::from_millis(20));
    let pipeline = pipeline(&provider, None, opts);

    let run = pipeline.process_document(&Document::new("a.md", "Hello"), &MemorySink::new()).await;

    assert!(matches!(run.failures[0].error, TranslationError::Timeout(_)));
}

#[tokio::test]
async fn test_process_document_withMalformedResponse_shouldRecordProviderFailure() {
    let provider = MockProvider::new(MockBehavior::Malformed);
    let pipeline = pipeline(&provider, None, options(&["es"]));

    let run = pipeline.process_document(&Document::new("a.md", "Hello"), &MemorySink::new()).await;

    assert!(run.results.is_empty());
    assert!(matches!(run.failures[0].error, TranslationError::Provider(_)));
}

#[tokio::test]
async fn test_process_document_withDroppedPlaceholders_shouldReportMissing() {
    let provider = MockProvider::new(MockBehavior::DropPlaceholders);
    let pipeline = pipeline(&provider, None, options(&["de"]));

    let run = pipeline
        .process_document(&Document::new("a.md", SAMPLE_MARKDOWN), &MemorySink::new())
        .await;

    let result = &run.results["de"];
    assert_eq!(result.missing_placeholders, vec![0, 1, 2]);
    assert!(!result.translated_content.contains("npm run build"));
    assert!(run.has_missing_placeholders());
}

#[tokio::test]
async fn test_process_document_withScoringDisabled_shouldScoreZero() {
    let provider = MockProvider::working();
    let pipeline = pipeline(&provider, None, options(&["es"]).quality_scoring(false));

    let run = pipeline.process_document(&Document::new("a.md", "Hello"), &MemorySink::new()).await;

    assert_eq!(run.results["es"].quality_score, 0);
    assert_eq!(provider.score_calls(), 0);
}

#[tokio::test]
async fn test_process_document_withFailingQualityScore_shouldScoreZero() {
    let provider = MockProvider::working().with_quality(None);
    let pipeline = pipeline(&provider, None, options(&["es"]));

    let run = pipeline.process_document(&Document::new("a.md", "Hello"), &MemorySink::new()).await;

    assert_eq!(run.results["es"].quality_score, 0);
    assert!(run.failures.is_empty());
}

#[tokio::test]
async fn test_process_document_withAutoSource_shouldDetectThenSkipSource() {
    let provider = MockProvider::working().detects("fr");
    let pipeline = pipeline(
        &provider,
        None,
        PipelineOptions::new("auto", &["fr", "es"]).retry(RetryPolicy::none()),
    );

    let run = pipeline
        .process_document(&Document::new("a.md", "Bonjour tout le monde"), &MemorySink::new())
        .await;

    assert_eq!(run.source_language.as_deref(), Some("fr"));
    assert_eq!(run.skipped_languages, vec!["fr"]);
    assert_eq!(provider.detect_calls(), 1);
}

#[tokio::test]
async fn test_process_document_withAutoSourceAndNoProviderAnswer_shouldUseHeuristic() {
    let provider = MockProvider::working();
    let pipeline = pipeline(
        &provider,
        None,
        PipelineOptions::new("auto", &["ja", "es"]).retry(RetryPolicy::none()),
    );

    let run = pipeline
        .process_document(&Document::new("a.md", "これはテストです"), &MemorySink::new())
        .await;

    assert_eq!(run.source_language.as_deref(), Some("ja"));
    assert_eq!(run.skipped_languages, vec!["ja"]);
}

#[tokio::test]
async fn test_process_document_withNoTargets_shouldBeInvalid() {
    let provider = MockProvider::working();
    let pipeline = pipeline(&provider, None, options(&[]));

    let run = pipeline.process_document(&Document::new("a.md", "Hello"), &MemorySink::new()).await;

    assert_eq!(run.status, RunStatus::Invalid);
    assert_eq!(provider.translate_calls(), 0);
}

#[tokio::test]
async fn test_run_documents_shouldProcessAllAndSortByKey() {
    let provider = MockProvider::working();
    let pipeline = pipeline(&provider, None, options(&["es"]).concurrency(2, 3));
    let sink = MemorySink::new();
    let documents = vec![
        Document::new("c.md", "Third"),
        Document::new("a.md", "First"),
        Document::new("b.md", "Second"),
    ];
    let completed = AtomicUsize::new(0);

    let summary = pipeline
        .run_documents(documents, &sink, &CancellationFlag::new(), |_| {
            completed.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    let keys: Vec<&str> = summary.runs.iter().map(|r| r.document_key.as_str()).collect();
    assert_eq!(keys, vec!["a.md", "b.md", "c.md"]);
    assert_eq!(summary.translated_documents(), 3);
    assert_eq!(completed.load(Ordering::SeqCst), 3);
    assert_eq!(sink.len(), 3);
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_run_documents_withCancelledFlag_shouldNotStartDocuments() {
    let provider = MockProvider::working();
    let pipeline = pipeline(&provider, None, options(&["es"]));
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let summary = pipeline
        .run_documents(
            vec![Document::new("a.md", "One"), Document::new("b.md", "Two")],
            &MemorySink::new(),
            &cancel,
            |_| {},
        )
        .await;

    assert!(summary.cancelled);
    assert_eq!(summary.cancelled_documents(), 2);
    assert_eq!(provider.translate_calls(), 0);
}

#[tokio::test]
async fn test_run_documents_withCancelMidRun_shouldFinishStartedDocuments() {
    let provider = MockProvider::working();
    // One document at a time so cancellation lands between documents
    let pipeline = pipeline(&provider, None, options(&["es"]).concurrency(1, 1));
    let cancel = CancellationFlag::new();
    let documents = (0..5).map(|i| Document::new(format!("{}.md", i), "Text")).collect();

    let summary = pipeline
        .run_documents(documents, &MemorySink::new(), &cancel, |_| cancel.cancel())
        .await;

    assert_eq!(summary.translated_documents(), 1);
    assert_eq!(summary.cancelled_documents(), 4);
    assert_eq!(provider.translate_calls(), 1);
}

#[tokio::test]
async fn test_process_document_withFailingSink_shouldKeepTranslationAttempts() {
    // Call 0 (fr) succeeds, call 1 (es) fails, call 2 (es) succeeds
    let provider = MockProvider::new(MockBehavior::Intermittent { fail_every: 2 });
    let opts = PipelineOptions::new("en", &["fr", "es"]).retry(RetryPolicy::new(2, 1));
    let pipeline = pipeline(&provider, None, opts);

    let run = pipeline.process_document(&Document::new("a.md", "Hello"), &ReadOnlySink).await;

    assert!(run.results.is_empty());
    assert_eq!(run.failed_languages(), vec!["fr", "es"]);
    assert!(matches!(run.failures[0].error, TranslationError::Output(_)));
    assert_eq!(run.failures[0].attempts, 1);
    assert_eq!(run.failures[1].attempts, 2);
}
