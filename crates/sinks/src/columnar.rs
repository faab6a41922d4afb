//! Parquet 파티션 싱크
//!
//! 레코드를 타임스탬프의 날짜별로 묶어 날짜 파티션 디렉토리마다
//! Snappy 압축 Parquet 파일 하나를 기록합니다.
//!
//! ```text
//! <root>/year=2024/month=06/day=01/logs_20240601_081500.parquet
//! ```
//!
//! 파일 이름은 생성 시각 기준이며, 같은 초에 같은 이름이 이미 있으면
//! `_1`, `_2` 접미어를 붙입니다.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::{debug, info};

use logiq_core::error::LogiqError;
use logiq_core::metrics as m;
use logiq_core::pipeline::RecordSink;
use logiq_core::types::LogRecord;

use crate::error::SinkError;

const SINK_NAME: &str = "parquet";

/// 레코드 타임스탬프에서 우선 시도하는 형식
const TIMESTAMP_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Parquet 파일 스키마
///
/// `file_path: Utf8, line_num: UInt64, content: Utf8, timestamp: Utf8`
pub fn record_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("file_path", DataType::Utf8, false),
        Field::new("line_num", DataType::UInt64, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("timestamp", DataType::Utf8, false),
    ]))
}

/// 레코드 타임스탬프에서 파티션 날짜를 결정합니다.
///
/// `YYYY-MM-DD HH:MM:SS`, RFC 3339 순서로 시도하고, 둘 다 실패하면
/// (빈 문자열 포함) 오늘 날짜(로컬)를 사용합니다.
pub fn partition_date(timestamp: &str) -> NaiveDate {
    if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_LAYOUT) {
        return dt.date();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.date_naive();
    }
    Local::now().date_naive()
}

/// 날짜 파티션 디렉토리의 상대 경로 (`year=YYYY/month=MM/day=DD`)
pub fn partition_dir(date: NaiveDate) -> PathBuf {
    PathBuf::from(date.format("year=%Y/month=%m/day=%d").to_string())
}

/// Parquet 파티션 싱크
#[derive(Debug, Clone)]
pub struct ParquetSink {
    root: PathBuf,
}

impl ParquetSink {
    /// 파티션 루트 디렉토리로 싱크를 생성합니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 파티션 루트 디렉토리
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, records: &[LogRecord]) -> Result<Vec<PathBuf>, SinkError> {
        let mut partitions: BTreeMap<NaiveDate, Vec<&LogRecord>> = BTreeMap::new();
        for record in records {
            partitions
                .entry(partition_date(&record.timestamp))
                .or_default()
                .push(record);
        }

        let generated = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut written = Vec::with_capacity(partitions.len());

        for (date, rows) in partitions {
            let dir = self.root.join(partition_dir(date));
            std::fs::create_dir_all(&dir).map_err(|e| {
                SinkError::serialization(SINK_NAME, format!("create {}: {e}", dir.display()))
            })?;

            let path = unique_path(&dir, &generated);
            write_parquet(&path, &rows)?;

            debug!(path = %path.display(), rows = rows.len(), %date, "parquet partition written");
            metrics::counter!(m::SINK_FILES_WRITTEN_TOTAL, m::LABEL_SINK => SINK_NAME)
                .increment(1);
            written.push(path);
        }

        info!(
            root = %self.root.display(),
            files = written.len(),
            records = records.len(),
            "parquet batch written"
        );
        Ok(written)
    }
}

impl RecordSink for ParquetSink {
    fn name(&self) -> &str {
        SINK_NAME
    }

    fn write_batch(&self, records: &[LogRecord]) -> Result<Vec<PathBuf>, LogiqError> {
        Ok(self.write(records)?)
    }
}

/// 이미 존재하는 파일과 겹치지 않는 경로를 찾습니다.
fn unique_path(dir: &Path, stamp: &str) -> PathBuf {
    let base = dir.join(format!("logs_{stamp}.parquet"));
    if !base.exists() {
        return base;
    }
    (1u32..)
        .map(|n| dir.join(format!("logs_{stamp}_{n}.parquet")))
        .find(|p| !p.exists())
        .unwrap_or(base)
}

fn write_parquet(path: &Path, rows: &[&LogRecord]) -> Result<(), SinkError> {
    let schema = record_schema();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.file_path.as_str()),
        )),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.line_num))),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.content.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.timestamp.as_str()),
        )),
    ];
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns)
        .map_err(|e| SinkError::serialization(SINK_NAME, e))?;

    let file = File::create(path).map_err(|e| {
        SinkError::serialization(SINK_NAME, format!("create {}: {e}", path.display()))
    })?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))
        .map_err(|e| SinkError::serialization(SINK_NAME, e))?;
    writer
        .write(&batch)
        .map_err(|e| SinkError::serialization(SINK_NAME, e))?;
    writer
        .close()
        .map_err(|e| SinkError::serialization(SINK_NAME, e))?;
    Ok(())
}
