/*!
 * Lingo client tests against a local mock HTTP server
 */

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devdocs_global::errors::ProviderError;
use devdocs_global::providers::{LingoClient, ProviderSettings, TranslationProvider};

fn client_for(server: &MockServer) -> LingoClient {
    let settings = ProviderSettings::new("test-key")
        .endpoint(format!("{}/v1", server.uri()))
        .timeout(Duration::from_secs(5));
    LingoClient::new(settings).unwrap()
}

#[tokio::test]
async fn test_translate_shouldPostToVersionedPathWithBearerToken() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/translations/create"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "text": "Hello [INLINECODE_0]",
            "source_language": "en",
            "target_language": "es",
            "preserve_code_blocks": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "translated_text": "Hola [INLINECODE_0]"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let translated = client_for(&server).translate("Hello [INLINECODE_0]", "en", "es").await.unwrap();

    assert_eq!(translated, "Hola [INLINECODE_0]");
}

#[tokio::test]
async fn test_translate_withUnauthorized_shouldReturnAuthenticationError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/translations/create"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let result = client_for(&server).translate("Hello", "en", "es").await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(message)) if message == "bad key"));
}

#[tokio::test]
async fn test_translate_withTooManyRequests_shouldReturnRateLimitExceeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let result = client_for(&server).translate("Hello", "en", "es").await;

    assert!(matches!(result, Err(ProviderError::RateLimitExceeded(_))));
}

#[tokio::test]
async fn test_translate_withServerError_shouldCarryStatusCode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let result = client_for(&server).translate("Hello", "en", "es").await;

    match result {
        Err(ProviderError::ApiError { status_code, message }) => {
            assert_eq!(status_code, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("Expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_withUnsuccessfulFlag_shouldReturnRejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "unsupported language pair"
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).translate("Hello", "en", "tlh").await;

    assert!(matches!(result, Err(ProviderError::Rejected(message)) if message == "unsupported language pair"));
}

#[tokio::test]
async fn test_translate_withoutTranslatedText_shouldReturnParseError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let result = client_for(&server).translate("Hello", "en", "es").await;

    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_translate_withNonJsonBody_shouldReturnParseError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server).translate("Hello", "en", "es").await;

    assert!(matches!(result, Err(ProviderError::ParseError(message)) if message.contains("<html>")));
}

#[tokio::test]
async fn test_detect_language_shouldReturnLowercasedCode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/language/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "language_code": "FR" })))
        .mount(&server)
        .await;

    let language = client_for(&server).detect_language("Bonjour").await.unwrap();

    assert_eq!(language, "fr");
}

#[tokio::test]
async fn test_detect_language_withoutCode_shouldReturnRejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/language/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "text too short" })))
        .mount(&server)
        .await;

    let result = client_for(&server).detect_language("a").await;

    assert!(matches!(result, Err(ProviderError::Rejected(_))));
}

#[tokio::test]
async fn test_quality_score_shouldClampProviderScore() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/quality/assess"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "score": 87.6 })))
        .mount(&server)
        .await;

    let score = client_for(&server).quality_score("Hello", "Hola").await;

    assert_eq!(score, 88);
}

#[tokio::test]
async fn test_quality_score_withServerError_shouldReturnZero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/quality/assess"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let score = client_for(&server).quality_score("Hello", "Hola").await;

    assert_eq!(score, 0);
}

#[tokio::test]
async fn test_supported_languages_shouldGetLanguageList() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "languages": [
                { "code": "es", "name": "Spanish" },
                { "code": "ja", "name": "Japanese" }
            ]
        })))
        .mount(&server)
        .await;

    let languages = client_for(&server).supported_languages().await.unwrap();

    assert_eq!(languages.len(), 2);
    assert_eq!(languages[1].code, "ja");
}

#[tokio::test]
async fn test_batch_translate_shouldCallOncePerLanguage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/translations/batch"))
        .and(body_partial_json(json!({ "target_language": "es" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "translated_texts": ["Uno", "Dos"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/translations/batch"))
        .and(body_partial_json(json!({ "target_language": "fr" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "translated_texts": ["Un", "Deux"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let texts = vec!["One".to_string(), "Two".to_string()];
    let targets = vec!["es".to_string(), "fr".to_string()];
    let result = client_for(&server).batch_translate(&texts, "en", &targets).await.unwrap();

    assert_eq!(result["es"], vec!["Uno", "Dos"]);
    assert_eq!(result["fr"], vec!["Un", "Deux"]);
}

#[tokio::test]
async fn test_batch_translate_withWrongCount_shouldReturnParseError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/translations/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "translated_texts": ["Uno"]
        })))
        .mount(&server)
        .await;

    let texts = vec!["One".to_string(), "Two".to_string()];
    let result = client_for(&server)
        .batch_translate(&texts, "en", &["es".to_string()])
        .await;

    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}
