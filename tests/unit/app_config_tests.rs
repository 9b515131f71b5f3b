/*!
 * Tests for application configuration functionality
 */

use std::path::PathBuf;
use std::time::Duration;

use devdocs_global::app_config::{Config, LogLevel};
use devdocs_global::translation::CachePolicy;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "auto");
    assert_eq!(config.source_dir, PathBuf::from("./docs"));
    assert_eq!(config.output_dir, PathBuf::from("./docs"));
    assert_eq!(config.cache_dir, PathBuf::from("./.lingo-cache"));
    assert_eq!(config.target_languages, vec!["es", "fr", "de", "ja", "hi", "zh"]);
    assert_eq!(config.cache_policy, CachePolicy::Always);
    assert_eq!(config.provider.timeout_secs, 30);
    assert_eq!(config.provider.concurrent_requests, 4);
    assert!(config.quality_scoring);
    assert!(!config.incremental);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_config_load_withPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "devdocs.config.json",
        r#"{
            "sourceLanguage": "en",
            "targetLanguages": ["es", "fr"],
            "cachePolicy": "onFullSuccess",
            "provider": { "retryCount": 5 }
        }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_languages, vec!["es", "fr"]);
    assert_eq!(config.cache_policy, CachePolicy::OnFullSuccess);
    assert_eq!(config.provider.retry_count, 5);
    assert_eq!(config.provider.timeout_secs, 30);
    assert_eq!(config.cache_dir, PathBuf::from("./.lingo-cache"));
    assert!(config.extraction.protect_urls);
}

#[test]
fn test_config_save_thenLoad_shouldRoundTripCamelCase() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("devdocs.config.json");
    let mut config = Config::default();
    config.include_txt = true;
    config.target_languages = vec!["ja".to_string()];

    config.save(&path).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();

    assert!(raw.contains("\"targetLanguages\""));
    assert!(raw.contains("\"includeTxt\": true"));
    assert_eq!(Config::load(&path).unwrap(), config);
}

#[test]
fn test_config_load_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "bad.json", "{ nope").unwrap();

    assert!(Config::load(&path).is_err());
    assert!(Config::load(dir.path().join("absent.json")).is_err());
    assert_eq!(
        Config::load_or_default(dir.path().join("absent.json")).unwrap(),
        Config::default()
    );
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();
    assert!(config.validate().is_ok());

    config.target_languages = vec![];
    assert!(config.validate().is_err());
    config.target_languages = vec!["es".to_string(), "123".to_string()];
    assert!(config.validate().is_err());
    config.target_languages = vec!["es".to_string()];

    config.provider.concurrent_requests = 0;
    assert!(config.validate().is_err());
    config.provider.concurrent_requests = 2;

    config.provider.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_resolvedApiKey_withConfiguredKey_shouldPreferConfig() {
    let config = Config {
        api_key: "  from-file ".to_string(),
        ..Config::default()
    };

    assert_eq!(config.resolved_api_key().as_deref(), Some("from-file"));
    assert_eq!(config.require_api_key().unwrap(), "from-file");
}

#[test]
fn test_config_pipelineOptions_shouldCarrySettings() {
    let mut config = Config::default();
    config.incremental = true;
    config.cache_policy = CachePolicy::OnFullSuccess;
    config.provider.timeout_secs = 12;
    config.provider.retry_count = 3;
    config.provider.concurrent_documents = 7;

    let options = config.pipeline_options();

    assert!(options.incremental);
    assert_eq!(options.cache_policy, CachePolicy::OnFullSuccess);
    assert_eq!(options.call_timeout, Duration::from_secs(12));
    assert_eq!(options.retry.max_retries, 3);
    assert_eq!(options.max_concurrent_documents, 7);
    assert_eq!(options.target_languages, config.target_languages);
}

#[test]
fn test_logLevel_toLevelFilter_shouldMapEveryLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
