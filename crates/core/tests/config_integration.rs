//! pacsprobe.toml 통합 설정 테스트
//!
//! - pacsprobe.toml.example 파싱 테스트
//! - 파일 로딩 + 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::fs;

use pacsprobe_core::config::ProbeConfig;
use pacsprobe_core::error::{ConfigError, PacsProbeError};
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../pacsprobe.toml.example");
    let config = ProbeConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "warn");
    assert_eq!(config.relay.outbound_budget_bytes, 1024);
    assert_eq!(config.relay.inbound_budget_bytes, 10240);
    assert_eq!(config.tools.find, "findscu");
    assert_eq!(config.scenarios.unknown_ae_title, "HICtestBadName");
}

#[test]
fn example_config_matches_defaults() {
    let content = include_str!("../../../pacsprobe.toml.example");
    let parsed = ProbeConfig::parse(content).expect("should parse");
    let defaults = ProbeConfig::default();

    assert_eq!(parsed.relay.accept_timeout_secs, defaults.relay.accept_timeout_secs);
    assert_eq!(parsed.relay.buffer_size, defaults.relay.buffer_size);
    assert_eq!(parsed.tools.timeout_secs, defaults.tools.timeout_secs);
    assert_eq!(parsed.artifacts.dir, defaults.artifacts.dir);
}

#[tokio::test]
#[serial]
async fn load_applies_env_over_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("pacsprobe.toml");
    fs::write(&path, "[tools]\nfind = \"/usr/local/bin/findscu\"\n").expect("write config");

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("PACSPROBE_TOOLS_FIND", "/opt/findscu") };
    let config = ProbeConfig::load(&path).await;
    unsafe { std::env::remove_var("PACSPROBE_TOOLS_FIND") };

    let config = config.expect("config should load");
    assert_eq!(config.tools.find, "/opt/findscu");
}

#[tokio::test]
#[serial]
async fn load_rejects_invalid_env_value() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("pacsprobe.toml");
    fs::write(&path, "").expect("write config");

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("PACSPROBE_GENERAL_LOG_FORMAT", "xml") };
    let result = ProbeConfig::load(&path).await;
    unsafe { std::env::remove_var("PACSPROBE_GENERAL_LOG_FORMAT") };

    let err = result.expect_err("invalid log format should be rejected");
    assert!(matches!(
        err,
        PacsProbeError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
async fn empty_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("empty.toml");
    fs::write(&path, "").expect("write config");

    let config = ProbeConfig::from_file(&path).await.expect("empty file is valid");
    assert_eq!(config.relay.connect_timeout_secs, 10);
}

#[tokio::test]
async fn malformed_file_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("bad.toml");
    fs::write(&path, "[relay\naccept_timeout_secs = 1\n").expect("write config");

    let err = ProbeConfig::from_file(&path).await.expect_err("should fail");
    assert!(matches!(
        err,
        PacsProbeError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[tokio::test]
async fn out_of_range_value_fails_validation() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("zero.toml");
    fs::write(&path, "[relay]\nconnect_timeout_secs = 0\n").expect("write config");

    let err = ProbeConfig::from_file(&path).await.expect_err("should fail");
    assert!(err.to_string().contains("connect_timeout_secs"));
}
