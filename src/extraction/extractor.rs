/*!
 * Content extraction for markdown documents.
 *
 * Protected spans are pulled out in three passes (code fences, inline code, URLs)
 * and replaced by `[KIND_<n>]` tokens, where `n` is the span's index in
 * `ExtractionResult::protected_spans`. Later passes only see the text left by the
 * earlier ones and skip any match that would wrap an earlier placeholder, so a
 * placeholder is never nested inside another protected span.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Fenced code blocks, non-greedy and across lines
static CODE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```.*?```").expect("Invalid code block regex")
});

/// Single-backtick inline code on one line
static INLINE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`[^`\n]+`").expect("Invalid inline code regex")
});

/// Bare http(s) URLs up to whitespace, a closing parenthesis, a backtick or `[`
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://[^\s)`\[]+").expect("Invalid URL regex")
});

/// Any placeholder token produced by the extractor
pub(crate) static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(CODEBLOCK|INLINECODE|URL)_(\d+)\]").expect("Invalid placeholder regex")
});

static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^#{1,6} .+$").expect("Invalid heading regex")
});

static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^# (.+)$").expect("Invalid title regex")
});

/// Kind of protected span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// Triple-backtick fenced block
    CodeBlock,
    /// Single-backtick inline code
    InlineCode,
    /// Bare http(s) URL
    Url,
}

impl SpanKind {
    /// Token prefix used in placeholders for this kind
    pub fn token_prefix(&self) -> &'static str {
        match self {
            Self::CodeBlock => "CODEBLOCK",
            Self::InlineCode => "INLINECODE",
            Self::Url => "URL",
        }
    }

    /// Parse a token prefix back into a kind
    pub fn from_token_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "CODEBLOCK" => Some(Self::CodeBlock),
            "INLINECODE" => Some(Self::InlineCode),
            "URL" => Some(Self::Url),
            _ => None,
        }
    }

    /// Placeholder token for the span at `index`
    pub fn placeholder(&self, index: usize) -> String {
        format!("[{}_{}]", self.token_prefix(), index)
    }
}

/// A substring excluded from translation and restored verbatim afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedSpan {
    /// What kind of span this is
    pub kind: SpanKind,
    /// The original text, byte for byte
    pub content: String,
}

/// Flags describing what the extractor saw in the original content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// The content contains inline code
    pub has_inline_code: bool,
    /// The content contains bare URLs
    pub has_urls: bool,
    /// The content already contained placeholder-looking text before substitution
    pub has_placeholder_collision: bool,
}

/// Output of `ContentExtractor::extract`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Content with every protected span replaced by its placeholder
    pub translatable_text: String,
    /// Protected spans, indexed by placeholder number
    pub protected_spans: Vec<ProtectedSpan>,
    /// Detection flags
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// Number of placeholders substituted into `translatable_text`
    pub fn placeholder_count(&self) -> usize {
        self.protected_spans.len()
    }

    /// Number of fenced code blocks that were protected
    pub fn code_block_count(&self) -> usize {
        self.protected_spans
            .iter()
            .filter(|span| span.kind == SpanKind::CodeBlock)
            .count()
    }

    /// Whether anything other than placeholders and whitespace is left to translate
    pub fn has_prose(&self) -> bool {
        !PLACEHOLDER_REGEX
            .replace_all(&self.translatable_text, "")
            .trim()
            .is_empty()
    }
}

/// Which span kinds are protected besides code fences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorOptions {
    /// Replace inline code with placeholders
    #[serde(default = "default_true")]
    pub protect_inline_code: bool,

    /// Replace bare URLs with placeholders
    #[serde(default = "default_true")]
    pub protect_urls: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            protect_inline_code: true,
            protect_urls: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Title and heading summary of a markdown document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOutline {
    /// First level-one heading, or "Untitled"
    pub title: String,
    /// Number of ATX headings
    pub headings: usize,
    /// Whitespace-separated word count
    pub word_count: usize,
}

/// Size statistics for a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
    pub code_blocks: usize,
}

/// Splits markdown into translatable text and protected spans
#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    options: ExtractorOptions,
}

impl ContentExtractor {
    /// Create an extractor with the default protection options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with explicit options
    pub fn with_options(options: ExtractorOptions) -> Self {
        Self { options }
    }

    /// The active options
    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Extract translatable text from markdown content
    pub fn extract(&self, content: &str) -> ExtractionResult {
        let metadata = ExtractionMetadata {
            has_inline_code: INLINE_CODE_REGEX.is_match(content),
            has_urls: URL_REGEX.is_match(content),
            has_placeholder_collision: PLACEHOLDER_REGEX.is_match(content),
        };

        let mut spans = Vec::new();
        let mut text = substitute(content, &CODE_BLOCK_REGEX, SpanKind::CodeBlock, &mut spans);

        if self.options.protect_inline_code {
            text = substitute(&text, &INLINE_CODE_REGEX, SpanKind::InlineCode, &mut spans);
        }

        if self.options.protect_urls {
            text = substitute(&text, &URL_REGEX, SpanKind::Url, &mut spans);
        }

        ExtractionResult {
            translatable_text: text,
            protected_spans: spans,
            metadata,
        }
    }

    /// Title, heading count and word count
    pub fn outline(content: &str) -> DocumentOutline {
        let title = TITLE_REGEX
            .captures(content)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| "Untitled".to_string());

        DocumentOutline {
            title,
            headings: HEADING_REGEX.find_iter(content).count(),
            word_count: word_count(content),
        }
    }

    /// Character, word, line and code block counts
    pub fn stats(content: &str) -> DocumentStats {
        DocumentStats {
            characters: content.chars().count(),
            words: word_count(content),
            lines: content.split('\n').count(),
            code_blocks: content.matches("```").count() / 2,
        }
    }

    /// Markdown worth processing is any non-empty text
    pub fn is_valid_markdown(content: &str) -> bool {
        !content.trim().is_empty()
    }
}

/// Whitespace-separated word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Replace every match of `regex` with a placeholder. A match that would wrap a
/// placeholder from an earlier pass is left in place.
fn substitute(text: &str, regex: &Regex, kind: SpanKind, spans: &mut Vec<ProtectedSpan>) -> String {
    let earlier = spans.len();
    regex
        .replace_all(text, |caps: &Captures| {
            if wraps_placeholder(&caps[0], &spans[..earlier]) {
                return caps[0].to_string();
            }

            let index = spans.len();
            spans.push(ProtectedSpan {
                kind,
                content: caps[0].to_string(),
            });
            kind.placeholder(index)
        })
        .into_owned()
}

fn wraps_placeholder(matched: &str, earlier: &[ProtectedSpan]) -> bool {
    PLACEHOLDER_REGEX.captures_iter(matched).any(|caps| {
        let kind = SpanKind::from_token_prefix(&caps[1]);
        caps[2]
            .parse::<usize>()
            .ok()
            .and_then(|index| earlier.get(index))
            .is_some_and(|span| Some(span.kind) == kind)
    })
}
