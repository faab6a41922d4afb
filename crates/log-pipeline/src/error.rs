//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 스캐너와 탐지기 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for LogiqError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 모든 에러가 사이클을 중단시키지는 않습니다. `FileAccess`, `PatternCompile`은
//! 스캐너 내부에서 경고 로그로 처리되고, 사이클을 중단시키는 것은
//! `PathExpansion`과 `Worker`뿐입니다.

use logiq_core::error::{ConfigError, LogiqError, ScanError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// glob 패턴 확장 실패 (사이클 중단)
    #[error("path expansion error: '{pattern}': {reason}")]
    PathExpansion {
        /// 설정된 glob 패턴
        pattern: String,
        /// 실패 사유
        reason: String,
    },

    /// 단일 파일 open/seek/read 실패
    #[error("file access error: {path}: {reason}")]
    FileAccess {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 정규식 컴파일 실패
    #[error("pattern compile error: {group} pattern '{pattern}': {reason}")]
    PatternCompile {
        /// 패턴 그룹 (include, exclude, timestamp, rule)
        group: String,
        /// 원본 패턴
        pattern: String,
        /// 실패 사유
        reason: String,
    },

    /// 오프셋 상태 로드/저장 실패
    #[error("persistence error: {path}: {reason}")]
    Persistence {
        /// 상태 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 워커 태스크 실패 (panic, 채널 종료 등)
    #[error("worker error: {0}")]
    Worker(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogPipelineError> for LogiqError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::PathExpansion { pattern, reason } => {
                LogiqError::Scan(ScanError::PathExpansion { pattern, reason })
            }
            LogPipelineError::Worker(reason) => LogiqError::Scan(ScanError::Worker(reason)),
            LogPipelineError::Config { field, reason } => {
                LogiqError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::Io(e) => LogiqError::Io(e),
            other => LogiqError::Scan(ScanError::Failed(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_access_error_display() {
        let err = LogPipelineError::FileAccess {
            path: "/var/log/app.log".to_owned(),
            reason: "permission denied".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/var/log/app.log"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn pattern_compile_error_display() {
        let err = LogPipelineError::PatternCompile {
            group: "exclude".to_owned(),
            pattern: "([".to_owned(),
            reason: "unclosed group".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exclude"));
        assert!(msg.contains("(["));
    }

    #[test]
    fn path_expansion_converts_to_scan_error() {
        let err = LogPipelineError::PathExpansion {
            pattern: "logs/[".to_owned(),
            reason: "invalid range pattern".to_owned(),
        };
        let top: LogiqError = err.into();
        assert!(matches!(
            top,
            LogiqError::Scan(ScanError::PathExpansion { .. })
        ));
    }

    #[test]
    fn worker_converts_to_scan_worker() {
        let top: LogiqError = LogPipelineError::Worker("task panicked".to_owned()).into();
        assert!(matches!(top, LogiqError::Scan(ScanError::Worker(_))));
    }

    #[test]
    fn config_converts_to_config_error() {
        let err = LogPipelineError::Config {
            field: "worker_count".to_owned(),
            reason: "must be greater than 0".to_owned(),
        };
        let top: LogiqError = err.into();
        assert!(matches!(top, LogiqError::Config(_)));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let top: LogiqError = LogPipelineError::from(io).into();
        assert!(matches!(top, LogiqError::Io(_)));
    }
}
