/*!
 * Reconstruction of translated documents.
 *
 * Placeholder tokens are resolved in a single left-to-right pass over the
 * translated text, so restored span content is never scanned again.
 */

use regex::Captures;

use super::extractor::{PLACEHOLDER_REGEX, ProtectedSpan, SpanKind};

/// Reconstructed content plus the spans the provider lost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    /// The document with protected spans restored
    pub content: String,
    /// Indices of spans whose placeholder was not found in the translated text
    pub missing: Vec<usize>,
}

impl Reconstruction {
    /// All protected spans made it back into the document
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Restore protected spans into translated text
pub fn reconstruct(translated_text: &str, protected_spans: &[ProtectedSpan]) -> String {
    reconstruct_with_report(translated_text, protected_spans).content
}

/// Restore protected spans and report which placeholders were missing
///
/// Each span is restored at most once (its first occurrence). Tokens with an
/// unknown index, a kind that does not match the span, or a repeated index are
/// left as they are.
pub fn reconstruct_with_report(translated_text: &str, protected_spans: &[ProtectedSpan]) -> Reconstruction {
    let mut restored = vec![false; protected_spans.len()];

    let content = PLACEHOLDER_REGEX
        .replace_all(translated_text, |caps: &Captures| {
            let token = caps[0].to_string();
            let Some(kind) = SpanKind::from_token_prefix(&caps[1]) else {
                return token;
            };
            let Ok(index) = caps[2].parse::<usize>() else {
                return token;
            };

            match protected_spans.get(index) {
                Some(span) if span.kind == kind && !restored[index] => {
                    restored[index] = true;
                    span.content.clone()
                }
                _ => token,
            }
        })
        .into_owned();

    let missing = restored
        .iter()
        .enumerate()
        .filter(|(_, done)| !**done)
        .map(|(index, _)| index)
        .collect();

    Reconstruction { content, missing }
}
