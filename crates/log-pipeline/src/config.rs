//! 스캐너 설정
//!
//! [`ScannerConfig`]는 core의 [`LogiqConfig`]에서 스캔 관련 값만 추려
//! 워커 수, 작업 큐 용량 같은 실행 파라미터를 더한 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use logiq_core::config::LogiqConfig;
//! use logiq_log_pipeline::config::ScannerConfig;
//!
//! let core_config = LogiqConfig::default();
//! let config = ScannerConfig::from_core(&core_config);
//! ```

use std::num::NonZeroUsize;
use std::path::PathBuf;

use logiq_core::config::LogiqConfig;

use crate::error::LogPipelineError;

/// 작업 큐 기본 용량
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// 호스트 병렬성 기준 기본 워커 수
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// 스캐너 설정
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// 스캔할 파일 glob 목록
    pub log_paths: Vec<String>,
    /// 포함 패턴
    pub include_patterns: Vec<String>,
    /// 제외 패턴
    pub exclude_patterns: Vec<String>,
    /// 타임스탬프 패턴
    pub timestamp_patterns: Vec<String>,
    /// 오프셋 상태 파일 경로
    pub state_file: PathBuf,

    // --- 실행 파라미터 (설정 파일에 노출되지 않음) ---
    /// 동시 워커 수
    pub worker_count: usize,
    /// 작업 큐 용량
    pub queue_capacity: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            log_paths: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            timestamp_patterns: Vec::new(),
            state_file: PathBuf::from("logiq_state.json"),
            worker_count: default_worker_count(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ScannerConfig {
    /// core 설정에서 스캐너 설정을 생성합니다.
    pub fn from_core(core: &LogiqConfig) -> Self {
        Self {
            log_paths: core.scan.log_paths.clone(),
            include_patterns: core.scan.include_patterns.clone(),
            exclude_patterns: core.scan.exclude_patterns.clone(),
            timestamp_patterns: core.scan.timestamp_patterns.clone(),
            state_file: PathBuf::from(&core.general.state_file),
            ..Self::default()
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if self.worker_count == 0 {
            return Err(LogPipelineError::Config {
                field: "worker_count".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.queue_capacity == 0 {
            return Err(LogPipelineError::Config {
                field: "queue_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.state_file.as_os_str().is_empty() {
            return Err(LogPipelineError::Config {
                field: "state_file".to_owned(),
                reason: "state file path must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}

/// 스캐너 설정 빌더
#[derive(Default)]
pub struct ScannerConfigBuilder {
    config: ScannerConfig,
}

impl ScannerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 로그 경로 glob 목록을 설정합니다.
    pub fn log_paths(mut self, paths: Vec<String>) -> Self {
        self.config.log_paths = paths;
        self
    }

    /// 포함 패턴을 설정합니다.
    pub fn include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.include_patterns = patterns;
        self
    }

    /// 제외 패턴을 설정합니다.
    pub fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude_patterns = patterns;
        self
    }

    /// 타임스탬프 패턴을 설정합니다.
    pub fn timestamp_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.timestamp_patterns = patterns;
        self
    }

    /// 상태 파일 경로를 설정합니다.
    pub fn state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.state_file = path.into();
        self
    }

    /// 워커 수를 설정합니다.
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// 작업 큐 용량을 설정합니다.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// 설정을 검증하고 `ScannerConfig`를 생성합니다.
    pub fn build(self) -> Result<ScannerConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
