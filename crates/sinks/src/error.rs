//! 싱크 에러 타입
//!
//! 모든 싱크 에러는 사이클의 나머지 단계(분석, 리포트)를 중단시킵니다.

use logiq_core::error::{LogiqError, StorageError};

/// 출력 싱크 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// 레코드 배치 직렬화/기록 실패
    #[error("serialization error in {sink}: {reason}")]
    Serialization {
        /// 싱크 이름 (json, parquet)
        sink: String,
        /// 실패 사유
        reason: String,
    },

    /// 리포트 렌더링/기록 실패
    #[error("report error: {0}")]
    Report(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// 싱크 이름을 붙여 직렬화 에러를 생성합니다.
    pub fn serialization(sink: &str, reason: impl std::fmt::Display) -> Self {
        Self::Serialization {
            sink: sink.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl From<SinkError> for LogiqError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Serialization { sink, reason } => {
                LogiqError::Storage(StorageError::Serialization { sink, reason })
            }
            SinkError::Report(reason) => LogiqError::Storage(StorageError::Report(reason)),
            SinkError::Io(e) => LogiqError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_error_display() {
        let err = SinkError::serialization("parquet", "schema mismatch");
        let msg = err.to_string();
        assert!(msg.contains("parquet"));
        assert!(msg.contains("schema mismatch"));
    }

    #[test]
    fn converts_to_storage_error() {
        let top: LogiqError = SinkError::serialization("json", "disk full").into();
        assert!(matches!(
            top,
            LogiqError::Storage(StorageError::Serialization { .. })
        ));

        let top: LogiqError = SinkError::Report("template".to_owned()).into();
        assert!(matches!(top, LogiqError::Storage(StorageError::Report(_))));
    }
}
