//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logiq_`
//! - 모듈명: `scan_`, `analysis_`, `sink_`, `cycle_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logiq_core::metrics::SCAN_FILES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 심각도 레이블 키 (info, low, medium, high, critical)
pub const LABEL_SEVERITY: &str = "severity";

/// 패턴 그룹 레이블 키 (include, exclude, timestamp, rule)
pub const LABEL_PATTERN_GROUP: &str = "group";

/// 싱크 레이블 키 (json, parquet)
pub const LABEL_SINK: &str = "sink";

/// 결과 레이블 키 (success, idle, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Scan 메트릭 ───────────────────────────────────────────────────

/// Scan: 읽기를 완료한 파일 수 (counter)
pub const SCAN_FILES_TOTAL: &str = "logiq_scan_files_total";

/// Scan: 읽기에 실패한 파일 수 (counter)
pub const SCAN_FILE_ERRORS_TOTAL: &str = "logiq_scan_file_errors_total";

/// Scan: 배치에 포함된 레코드 수 (counter)
pub const SCAN_RECORDS_TOTAL: &str = "logiq_scan_records_total";

/// Scan: 컴파일에 실패해 제외된 패턴 수 (counter, label: group)
pub const SCAN_PATTERN_ERRORS_TOTAL: &str = "logiq_scan_pattern_errors_total";

/// Scan: 오프셋 상태 저장 실패 수 (counter)
pub const SCAN_OFFSET_SAVE_ERRORS_TOTAL: &str = "logiq_scan_offset_save_errors_total";

// ─── Analysis 메트릭 ───────────────────────────────────────────────

/// Analysis: 탐지된 이상 징후 수 (counter, label: severity)
pub const ANALYSIS_ANOMALIES_TOTAL: &str = "logiq_analysis_anomalies_total";

/// Analysis: 스파이크로 판정된 이상 징후 수 (counter)
pub const ANALYSIS_SPIKES_TOTAL: &str = "logiq_analysis_spikes_total";

// ─── Sink 메트릭 ───────────────────────────────────────────────────

/// Sink: 기록된 파일 수 (counter, label: sink)
pub const SINK_FILES_WRITTEN_TOTAL: &str = "logiq_sink_files_written_total";

// ─── Cycle 메트릭 ──────────────────────────────────────────────────

/// Cycle: 실행된 사이클 수 (counter, label: result)
pub const CYCLES_TOTAL: &str = "logiq_cycles_total";

/// Cycle: 사이클 소요 시간 (histogram, 초)
pub const CYCLE_DURATION_SECONDS: &str = "logiq_cycle_duration_seconds";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 사이클 소요 시간 히스토그램 버킷 (초)
///
/// 10ms ~ 300s 범위 (대용량 파일의 첫 스캔 포함)
pub const CYCLE_DURATION_BUCKETS: [f64; 10] =
    [0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 120.0, 300.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `logiq-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Scan
    describe_counter!(SCAN_FILES_TOTAL, "Total number of files read to completion");
    describe_counter!(
        SCAN_FILE_ERRORS_TOTAL,
        "Total number of files skipped because of open/seek/read failures"
    );
    describe_counter!(
        SCAN_RECORDS_TOTAL,
        "Total number of log records emitted into cycle batches"
    );
    describe_counter!(
        SCAN_PATTERN_ERRORS_TOTAL,
        "Total number of patterns dropped because they failed to compile"
    );
    describe_counter!(
        SCAN_OFFSET_SAVE_ERRORS_TOTAL,
        "Total number of failed offset state saves"
    );

    // Analysis
    describe_counter!(
        ANALYSIS_ANOMALIES_TOTAL,
        "Total number of anomalies detected, by severity"
    );
    describe_counter!(
        ANALYSIS_SPIKES_TOTAL,
        "Total number of anomalies whose match ratio exceeded the spike threshold"
    );

    // Sink
    describe_counter!(
        SINK_FILES_WRITTEN_TOTAL,
        "Total number of output files written, by sink"
    );

    // Cycle
    describe_counter!(CYCLES_TOTAL, "Total number of scan cycles, by result");
    describe_histogram!(
        CYCLE_DURATION_SECONDS,
        "Wall-clock duration of a full scan cycle in seconds"
    );
}
