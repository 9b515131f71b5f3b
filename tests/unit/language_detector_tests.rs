/*!
 * Tests for source language detection
 */

use std::sync::Arc;

use devdocs_global::language_detector::{DEFAULT_LANGUAGE, LanguageDetector, SAMPLE_CHARS, detect_heuristic};
use devdocs_global::providers::MockProvider;

#[test]
fn test_detect_heuristic_withJapaneseKanjiAndKana_shouldPreferJapanese() {
    assert_eq!(detect_heuristic("日本語のドキュメントです"), "ja");
}

#[test]
fn test_detect_heuristic_withChineseNameSeparators_shouldReturnChinese() {
    assert_eq!(detect_heuristic("列奥纳多・达・芬奇是意大利文艺复兴时期的画家"), "zh");
}

#[test]
fn test_detect_heuristic_withChineseQuotingKatakanaWord_shouldReturnChinese() {
    assert_eq!(detect_heuristic("这个项目的名字叫做「テスト」，用于测试文档翻译流程"), "zh");
}

#[test]
fn test_detect_heuristic_withCjkAndSpanishStopwords_shouldReturnScript() {
    let text = "los usuarios y el equipo para la guía 中文";
    assert_eq!(detect_heuristic(text), "zh");
}

#[test]
fn test_detect_heuristic_withEnglishProse_shouldNotGuessSpanish() {
    let text = "The configuration file is read once. Use the CLI to translate the docs and see the output.";
    assert_eq!(detect_heuristic(text), DEFAULT_LANGUAGE);
}

#[test]
fn test_detect_heuristic_withScriptBeyondSample_shouldIgnoreIt() {
    let text = format!("{}Это тест", "a".repeat(SAMPLE_CHARS));
    assert_eq!(detect_heuristic(&text), "en");
}

#[tokio::test]
async fn test_detect_withProviderPart2bCode_shouldNormalize() {
    let provider = Arc::new(MockProvider::working().detects("ger"));
    let detector = LanguageDetector::with_provider(provider);

    assert_eq!(detector.detect("Irgendein Text").await, "de");
}

#[tokio::test]
async fn test_detect_withHeuristicOnly_shouldNotNeedProvider() {
    let detector = LanguageDetector::heuristic();
    assert_eq!(detector.detect("Le guide est pour les équipes et les utilisateurs").await, "fr");
}
