//! JSON 배치 스냅샷 싱크
//!
//! 사이클마다 출력 디렉토리의 기존 파일을 모두 지우고
//! `<YYYY-MM-DD>_logs.json` 하나에 배치 전체를 기록합니다.
//! 누적 보관이 아니라 마지막 사이클의 스냅샷입니다.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

use logiq_core::error::LogiqError;
use logiq_core::metrics as m;
use logiq_core::pipeline::RecordSink;
use logiq_core::types::LogRecord;

use crate::error::SinkError;

const SINK_NAME: &str = "json";

/// JSON 배치 싱크
#[derive(Debug, Clone)]
pub struct JsonBatchSink {
    dir: PathBuf,
}

impl JsonBatchSink {
    /// 출력 디렉토리로 싱크를 생성합니다.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 출력 디렉토리
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 디렉토리의 일반 파일을 모두 삭제합니다. 하위 디렉토리는 건드리지 않습니다.
    fn clear_dir(&self) -> Result<usize, SinkError> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                std::fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn write(&self, records: &[LogRecord]) -> Result<PathBuf, SinkError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SinkError::serialization(SINK_NAME, e))?;
        let removed = self
            .clear_dir()
            .map_err(|e| SinkError::serialization(SINK_NAME, e))?;
        debug!(dir = %self.dir.display(), removed, "cleared previous json snapshot");

        let path = self
            .dir
            .join(format!("{}_logs.json", Local::now().format("%Y-%m-%d")));
        let json =
            serde_json::to_vec_pretty(records).map_err(|e| SinkError::serialization(SINK_NAME, e))?;
        std::fs::write(&path, json).map_err(|e| SinkError::serialization(SINK_NAME, e))?;

        info!(path = %path.display(), records = records.len(), "json batch written");
        metrics::counter!(m::SINK_FILES_WRITTEN_TOTAL, m::LABEL_SINK => SINK_NAME).increment(1);
        Ok(path)
    }
}

impl RecordSink for JsonBatchSink {
    fn name(&self) -> &str {
        SINK_NAME
    }

    fn write_batch(&self, records: &[LogRecord]) -> Result<Vec<PathBuf>, LogiqError> {
        Ok(vec![self.write(records)?])
    }
}
