/*!
 * Source language detection.
 *
 * Detection asks the provider first (when one is configured) and falls back to a
 * local heuristic over the start of the text. Script ranges are checked before
 * stopword frequencies: a script match is unambiguous, stopwords are a guess.
 */

use log::{debug, warn};
use std::sync::Arc;

use crate::language_utils::{normalize_to_part1_or_part2t, validate_language_code};
use crate::providers::TranslationProvider;

/// Number of characters inspected by the heuristic
pub const SAMPLE_CHARS: usize = 500;

/// Code returned when nothing else matches
pub const DEFAULT_LANGUAGE: &str = "en";

/// Share of sampled words that must be stopwords of a language
const STOPWORD_RATIO: f64 = 0.15;

/// Minimum stopword hits before the ratio is considered
const MIN_STOPWORD_HITS: usize = 2;

/// CJK unified ideographs, shared by Chinese and Japanese
const HAN_RANGE: (char, char) = ('\u{4E00}', '\u{9FFF}');

/// Hiragana and katakana
const KANA_RANGES: &[(char, char)] = &[('\u{3040}', '\u{309F}'), ('\u{30A0}', '\u{30FF}')];

/// Katakana middle dot, also used in Chinese between transliterated names
const MIDDLE_DOT: char = '\u{30FB}';

/// Non-CJK script ranges in priority order
const SCRIPT_RANGES: &[(&str, &[(char, char)])] = &[
    ("ko", &[('\u{AC00}', '\u{D7AF}')]),
    ("ar", &[('\u{0600}', '\u{06FF}')]),
    ("ru", &[('\u{0400}', '\u{04FF}')]),
    ("hi", &[('\u{0900}', '\u{097F}')]),
];

/// Stopwords for Latin-script languages, in priority order
const STOPWORDS: &[(&str, &[&str])] = &[
    (
        "es",
        &[
            "el", "los", "las", "del", "que", "y", "por", "con", "para", "una", "su", "está", "es",
            "como", "pero", "más",
        ],
    ),
    (
        "fr",
        &[
            "le", "les", "des", "et", "est", "pour", "avec", "une", "qui", "dans", "sur", "pas",
            "ce", "du", "au", "à",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "und", "den", "von", "zu", "das", "mit", "sich", "des", "auf", "für",
            "ist", "nicht", "ein", "eine",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "do", "da", "dos", "das", "não", "uma", "com", "é", "em", "na", "no", "um",
            "ao", "pelo",
        ],
    ),
];

/// Detects the source language of a document
#[derive(Debug, Clone, Default)]
pub struct LanguageDetector {
    provider: Option<Arc<dyn TranslationProvider>>,
}

impl LanguageDetector {
    /// Heuristic-only detector
    pub fn heuristic() -> Self {
        Self { provider: None }
    }

    /// Detector that asks the provider first
    pub fn with_provider(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Detect the language of `text`; always returns a best-effort code
    pub async fn detect(&self, text: &str) -> String {
        if let Some(provider) = &self.provider {
            match provider.detect_language(text).await {
                Ok(code) => match validate_language_code(&code) {
                    Ok(_) => {
                        let code = normalize_to_part1_or_part2t(&code).unwrap_or(code);
                        debug!("Provider detected language: {}", code);
                        return code;
                    }
                    Err(_) => warn!("Provider returned unusable language code '{}', using fallback", code),
                },
                Err(e) => warn!("Provider language detection failed, using fallback: {}", e),
            }
        }

        detect_heuristic(text).to_string()
    }
}

/// Local detection by script ranges, then stopword frequency, then the default
pub fn detect_heuristic(text: &str) -> &'static str {
    let sample: String = text.chars().take(SAMPLE_CHARS).collect::<String>().to_lowercase();

    if let Some(code) = detect_script(&sample) {
        return code;
    }

    detect_stopwords(&sample).unwrap_or(DEFAULT_LANGUAGE)
}

fn detect_script(sample: &str) -> Option<&'static str> {
    if let Some(code) = detect_cjk(sample) {
        return Some(code);
    }

    SCRIPT_RANGES
        .iter()
        .find(|(_, ranges)| {
            sample
                .chars()
                .any(|c| ranges.iter().any(|(start, end)| (*start..=*end).contains(&c)))
        })
        .map(|(code, _)| *code)
}

/// Han text is Chinese unless kana outnumbers it
fn detect_cjk(sample: &str) -> Option<&'static str> {
    let (han, kana) = sample.chars().fold((0usize, 0usize), |(han, kana), c| {
        if (HAN_RANGE.0..=HAN_RANGE.1).contains(&c) {
            (han + 1, kana)
        } else if c != MIDDLE_DOT && KANA_RANGES.iter().any(|(start, end)| (*start..=*end).contains(&c)) {
            (han, kana + 1)
        } else {
            (han, kana)
        }
    });

    if kana > han {
        Some("ja")
    } else if han > 0 {
        Some("zh")
    } else {
        None
    }
}

fn detect_stopwords(sample: &str) -> Option<&'static str> {
    let words: Vec<&str> = sample
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return None;
    }

    STOPWORDS
        .iter()
        .find(|(_, stopwords)| {
            let hits = words.iter().filter(|w| stopwords.contains(*w)).count();
            hits >= MIN_STOPWORD_HITS && hits as f64 / words.len() as f64 >= STOPWORD_RATIO
        })
        .map(|(code, _)| *code)
}
