//! 설정 관리 -- logiq.toml 파싱 및 런타임 설정
//!
//! [`LogiqConfig`]는 스캐너, 분석기, 출력 싱크, 데몬 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGIQ_ANALYSIS_THRESHOLD_SPIKE=0.2` 형식)
//! 3. 설정 파일 (`logiq.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logiq_core::error::LogiqError> {
//! use logiq_core::config::LogiqConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogiqConfig::load("logiq.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogiqConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogiqError};
use crate::types::AlertRule;

/// 리포트 형식으로 허용되는 값
pub const REPORT_FORMATS: &[&str] = &["json", "html", "all"];

/// `interval_seconds`가 0일 때 사용하는 기본 주기 (초)
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// logiq 통합 설정
///
/// `logiq.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogiqConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스캔 대상 및 라인 필터
    #[serde(default)]
    pub scan: ScanConfig,
    /// 알림 규칙 목록 (선언 순서 유지)
    #[serde(default)]
    pub alert_rules: Vec<AlertRule>,
    /// 분석 설정
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// 리포트 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
    /// 배치 출력 디렉토리
    #[serde(default)]
    pub output_paths: OutputPathsConfig,
    /// Prometheus 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogiqConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogiqError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogiqError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogiqError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogiqError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogiqError> {
        toml::from_str(toml_str).map_err(|e| {
            LogiqError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGIQ_{SECTION}_{FIELD}`
    /// 목록 값은 쉼표로 구분합니다. 예: `LOGIQ_SCAN_LOG_PATHS=/var/log/*.log,/srv/app/*.log`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGIQ_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGIQ_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.state_file, "LOGIQ_GENERAL_STATE_FILE");

        // Scan
        override_csv(&mut self.scan.log_paths, "LOGIQ_SCAN_LOG_PATHS");
        override_csv(
            &mut self.scan.include_patterns,
            "LOGIQ_SCAN_INCLUDE_PATTERNS",
        );
        override_csv(
            &mut self.scan.exclude_patterns,
            "LOGIQ_SCAN_EXCLUDE_PATTERNS",
        );
        override_csv(
            &mut self.scan.timestamp_patterns,
            "LOGIQ_SCAN_TIMESTAMP_PATTERNS",
        );

        // Analysis
        override_f64(
            &mut self.analysis.threshold_spike,
            "LOGIQ_ANALYSIS_THRESHOLD_SPIKE",
        );
        override_u64(
            &mut self.analysis.interval_seconds,
            "LOGIQ_ANALYSIS_INTERVAL_SECONDS",
        );

        // Output
        override_string(&mut self.output.format, "LOGIQ_OUTPUT_FORMAT");
        override_string(&mut self.output.report_file, "LOGIQ_OUTPUT_REPORT_FILE");
        override_string(
            &mut self.output_paths.json_dir_path,
            "LOGIQ_OUTPUT_PATHS_JSON_DIR_PATH",
        );
        override_string(
            &mut self.output_paths.parquet_dir_path,
            "LOGIQ_OUTPUT_PATHS_PARQUET_DIR_PATH",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGIQ_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "LOGIQ_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "LOGIQ_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogiqError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.general.state_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.state_file".to_owned(),
                reason: "state file path must not be empty".to_owned(),
            }
            .into());
        }

        // NaN은 범위 비교를 모두 통과하지 못하므로 여기서 함께 걸러집니다
        let threshold = self.analysis.threshold_spike;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidValue {
                field: "analysis.threshold_spike".to_owned(),
                reason: format!("must be between 0.0 and 1.0, got {threshold}"),
            }
            .into());
        }

        for format in self.output.formats() {
            if !REPORT_FORMATS.contains(&format.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "output.format".to_owned(),
                    reason: format!(
                        "unknown report format '{format}', expected: {}",
                        REPORT_FORMATS.join(", ")
                    ),
                }
                .into());
            }
        }

        if self.output.report_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.report_file".to_owned(),
                reason: "report file path must not be empty".to_owned(),
            }
            .into());
        }

        if self.metrics.enabled && self.metrics.endpoint != "/metrics" {
            return Err(ConfigError::InvalidValue {
                field: "metrics.endpoint".to_owned(),
                reason: "only '/metrics' is supported".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 파일별 오프셋 상태 파일 경로
    pub state_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            state_file: "logiq_state.json".to_owned(),
        }
    }
}

/// 스캔 설정
///
/// 모든 패턴은 정규식입니다. 컴파일에 실패한 패턴은 경고 후 제외됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 스캔할 파일 glob 목록
    pub log_paths: Vec<String>,
    /// 포함 패턴 (비어 있으면 모든 라인 포함)
    pub include_patterns: Vec<String>,
    /// 제외 패턴 (포함 패턴보다 우선)
    pub exclude_patterns: Vec<String>,
    /// 타임스탬프 추출 패턴 (선언 순서대로 시도)
    pub timestamp_patterns: Vec<String>,
}

/// 분석 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 스파이크 판정 비율 (0.0 ~ 1.0, 초과 시 스파이크)
    pub threshold_spike: f64,
    /// 반복 실행 주기 (초, 0이면 기본값 60)
    pub interval_seconds: u64,
}

impl AnalysisConfig {
    /// 실제 적용할 반복 주기를 반환합니다.
    pub fn effective_interval_secs(&self) -> u64 {
        if self.interval_seconds == 0 {
            DEFAULT_INTERVAL_SECS
        } else {
            self.interval_seconds
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold_spike: 0.3,
            interval_seconds: DEFAULT_INTERVAL_SECS,
        }
    }
}

/// 리포트 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 쉼표로 구분된 리포트 형식 (json, html, all)
    pub format: String,
    /// 리포트 파일 기본 경로 (확장자는 형식별로 붙음)
    pub report_file: String,
}

impl OutputConfig {
    /// 정규화된(소문자, 공백 제거) 형식 목록을 반환합니다.
    pub fn formats(&self) -> Vec<String> {
        self.format
            .split(',')
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty())
            .collect()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json,html".to_owned(),
            report_file: "reports/logiq_report".to_owned(),
        }
    }
}

/// 배치 출력 디렉토리 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPathsConfig {
    /// Parquet 파티션 루트 디렉토리
    pub parquet_dir_path: String,
    /// JSON 스냅샷 디렉토리 (사이클마다 비워짐)
    pub json_dir_path: String,
}

impl Default for OutputPathsConfig {
    fn default() -> Self {
        Self {
            parquet_dir_path: "parquetLogs".to_owned(),
            json_dir_path: "jsonLogs".to_owned(),
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
    /// 엔드포인트 경로 (현재 `/metrics`만 지원)
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_f64(target: &mut f64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<f64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
