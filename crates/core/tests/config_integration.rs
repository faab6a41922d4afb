//! logiq.toml 통합 설정 테스트
//!
//! - logiq.toml.example 파싱 테스트
//! - 파일 로딩 + 환경변수 우선순위 테스트
//! - 잘못된 형식 에러 테스트

use logiq_core::config::LogiqConfig;
use logiq_core::error::{ConfigError, LogiqError};
use logiq_core::types::Severity;
use serial_test::serial;

// =============================================================================
// logiq.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../logiq.toml.example");
    let config = LogiqConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.state_file, "logiq_state.json");
    assert_eq!(config.scan.log_paths, vec!["logs/*.log"]);
    assert_eq!(config.scan.timestamp_patterns.len(), 2);
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../logiq.toml.example");
    let config = LogiqConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_alert_rules_keep_declaration_order() {
    let content = include_str!("../../../logiq.toml.example");
    let config = LogiqConfig::parse(content).expect("should parse");

    let keywords: Vec<&str> = config
        .alert_rules
        .iter()
        .map(|r| r.keyword.as_str())
        .collect();
    assert_eq!(keywords, vec!["ERROR", "(?i)panic|fatal", "timeout"]);
    assert_eq!(config.alert_rules[1].severity, Severity::Critical);
}

// =============================================================================
// 파일 로딩
// =============================================================================

#[tokio::test]
#[serial]
async fn load_applies_env_overrides_after_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("logiq.toml");
    std::fs::write(
        &path,
        "[analysis]\nthreshold_spike = 0.5\n\n[scan]\nlog_paths = [\"a/*.log\"]\n",
    )
    .expect("write config");

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("LOGIQ_ANALYSIS_THRESHOLD_SPIKE", "0.1") };
    let config = LogiqConfig::load(&path).await;
    unsafe { std::env::remove_var("LOGIQ_ANALYSIS_THRESHOLD_SPIKE") };

    let config = config.expect("config should load");
    assert_eq!(config.analysis.threshold_spike, 0.1);
    assert_eq!(config.scan.log_paths, vec!["a/*.log"]);
}

#[tokio::test]
#[serial]
async fn load_rejects_env_override_that_breaks_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("logiq.toml");
    std::fs::write(&path, "").expect("write config");

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("LOGIQ_GENERAL_LOG_FORMAT", "xml") };
    let result = LogiqConfig::load(&path).await;
    unsafe { std::env::remove_var("LOGIQ_GENERAL_LOG_FORMAT") };

    assert!(matches!(
        result,
        Err(LogiqError::Config(ConfigError::InvalidValue { .. }))
    ));
}

#[tokio::test]
async fn from_file_with_malformed_toml_is_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[scan\nlog_paths = ").expect("write config");

    let result = LogiqConfig::from_file(&path).await;
    assert!(matches!(
        result,
        Err(LogiqError::Config(ConfigError::ParseFailed { .. }))
    ));
}
