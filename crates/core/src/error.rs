//! 에러 타입 -- 도메인별 에러 정의

/// logiq 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogiqError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캔 사이클 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// 출력(직렬화/리포트) 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 사이클 에러
///
/// 사이클 전체를 중단시키는 에러만 여기에 올라옵니다.
/// 파일 단위 실패는 스캐너 내부에서 로그로 처리됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// glob 패턴 확장 실패
    #[error("invalid log path pattern '{pattern}': {reason}")]
    PathExpansion { pattern: String, reason: String },

    /// 워커 태스크 실패
    #[error("scan worker failed: {0}")]
    Worker(String),

    /// 기타 스캔 실패
    #[error("scan failed: {0}")]
    Failed(String),
}

/// 출력 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 레코드 배치 직렬화 실패
    #[error("serialization failed in {sink}: {reason}")]
    Serialization { sink: String, reason: String },

    /// 리포트 생성 실패
    #[error("report failed: {0}")]
    Report(String),
}
