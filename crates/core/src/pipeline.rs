//! 파이프라인 trait -- 모듈 확장 포인트 정의

use std::path::PathBuf;

use crate::error::LogiqError;
use crate::types::{Anomaly, LogRecord};

/// 사이클 배치를 분석하는 trait
///
/// 새로운 탐지 방식을 추가하려면 이 trait을 구현합니다.
pub trait Detector: Send + Sync {
    /// 탐지기 이름
    fn name(&self) -> &str;

    /// 배치 전체를 분석하여 이상 징후 목록을 반환
    fn detect(&self, records: &[LogRecord]) -> Vec<Anomaly>;
}

/// 레코드 배치 출력 trait
///
/// 사이클마다 배치 전체를 한 번에 받습니다.
pub trait RecordSink: Send + Sync {
    /// 싱크 이름 (로그/메트릭 레이블)
    fn name(&self) -> &str;

    /// 배치를 기록하고 생성된 파일 경로를 반환
    fn write_batch(&self, records: &[LogRecord]) -> Result<Vec<PathBuf>, LogiqError>;
}

/// 이상 징후 리포트 출력 trait
///
/// 빈 목록은 성공한 no-op으로 처리해야 합니다.
pub trait ReportSink: Send + Sync {
    /// 리포트를 렌더링하고 생성된 파일 경로를 반환
    fn render(&self, anomalies: &[Anomaly]) -> Result<Vec<PathBuf>, LogiqError>;
}
