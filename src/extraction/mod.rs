/*!
 * Markdown extraction and reconstruction.
 *
 * - `extractor`: replaces protected spans (code fences, inline code, URLs) with
 *   placeholder tokens so only prose reaches the provider
 * - `reconstructor`: restores the protected spans into translated text
 */

pub mod extractor;
pub mod reconstructor;

pub use self::extractor::{
    ContentExtractor, DocumentOutline, DocumentStats, ExtractionMetadata, ExtractionResult,
    ExtractorOptions, ProtectedSpan, SpanKind, word_count,
};
pub use self::reconstructor::{reconstruct, reconstruct_with_report, Reconstruction};
