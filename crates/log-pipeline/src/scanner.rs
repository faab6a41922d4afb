//! 스캔 코디네이터 -- 한 사이클의 전체 스캔 오케스트레이션
//!
//! # 사이클 흐름
//!
//! ```text
//! expand globs ──> work queue (bounded) ──> worker × N ──> result channel ──> coordinator
//!   (fail-fast)        feeder task          spawn_blocking      (per file)      merge + save
//! ```
//!
//! 워커는 공유 상태를 직접 수정하지 않습니다. 파일 단위 결과를 채널로
//! 보내고, 코디네이터 한 곳에서만 레코드 배치와 오프셋 맵을 갱신합니다.
//! 모든 워커가 끝난 뒤 오프셋 맵을 한 번 저장합니다.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use logiq_core::metrics as m;
use logiq_core::types::LogRecord;

use crate::config::ScannerConfig;
use crate::error::LogPipelineError;
use crate::offset::{OffsetMap, OffsetStore};
use crate::pattern::PatternSet;
use crate::reader::{FileReader, ReadOutcome};

/// 한 사이클의 스캔 결과
#[derive(Debug, Default)]
pub struct ScanBatch {
    /// 병합된 레코드 (파일 간 순서는 보장되지 않음)
    pub records: Vec<LogRecord>,
    /// 이번 사이클 종료 시점의 오프셋 맵
    pub offsets: OffsetMap,
    /// glob으로 해석된 파일 수
    pub files_matched: usize,
    /// 읽기에 성공한 파일 수
    pub files_scanned: usize,
    /// 읽기에 실패해 건너뛴 파일 수
    pub files_failed: usize,
}

impl ScanBatch {
    /// 처리할 레코드가 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 워커가 코디네이터로 보내는 파일 단위 결과
struct FileResult {
    path: String,
    result: Result<ReadOutcome, LogPipelineError>,
}

/// 설정된 glob 목록을 파일 경로로 확장합니다.
///
/// 잘못된 패턴이 하나라도 있으면 즉시 실패합니다. 디렉토리는 제외되고,
/// 여러 glob에 중복으로 걸린 경로는 처음 한 번만 남습니다.
pub fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>, LogPipelineError> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|e| LogPipelineError::PathExpansion {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        for entry in matches {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "unreadable glob entry, skipping");
                    continue;
                }
            };

            if path.is_dir() {
                debug!(path = %path.display(), "glob matched a directory, skipping");
                continue;
            }

            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    Ok(paths)
}

/// 스캔 코디네이터
///
/// 사이클마다 패턴을 새로 컴파일하고 오프셋 상태를 새로 로드하므로
/// 하나의 인스턴스로 여러 사이클을 반복 실행할 수 있습니다.
pub struct ScanCoordinator {
    config: ScannerConfig,
    store: OffsetStore,
}

impl ScanCoordinator {
    /// 설정을 검증하고 코디네이터를 생성합니다.
    pub fn new(config: ScannerConfig) -> Result<Self, LogPipelineError> {
        config.validate()?;
        let store = OffsetStore::new(config.state_file.clone());
        Ok(Self { config, store })
    }

    /// 현재 설정
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// 오프셋 저장소
    pub fn offset_store(&self) -> &OffsetStore {
        &self.store
    }

    /// 한 사이클을 실행하고 병합된 배치를 반환합니다.
    ///
    /// 빈 배치는 정상 결과입니다. glob 확장 실패와 워커 태스크 실패만
    /// 에러로 반환되며, 이 경우 오프셋 상태는 저장되지 않습니다.
    pub async fn scan(&self) -> Result<ScanBatch, LogPipelineError> {
        let paths = expand_globs(&self.config.log_paths)?;
        let files_matched = paths.len();

        if paths.is_empty() {
            info!(patterns = ?self.config.log_paths, "no files matched configured log paths");
            return Ok(ScanBatch::default());
        }

        let patterns = Arc::new(PatternSet::compile(
            &self.config.include_patterns,
            &self.config.exclude_patterns,
            &self.config.timestamp_patterns,
        ));

        let mut offsets = {
            let store = self.store.clone();
            tokio::task::spawn_blocking(move || store.load())
                .await
                .map_err(|e| LogPipelineError::Worker(format!("offset load task failed: {e}")))?
        };
        let snapshot = Arc::new(offsets.clone());

        let worker_count = self.config.worker_count.min(files_matched).max(1);
        debug!(files = files_matched, workers = worker_count, "starting scan workers");

        // 작업 큐: feeder 태스크가 채우고 워커들이 나눠 가져갑니다
        let (work_tx, work_rx) = mpsc::channel::<PathBuf>(self.config.queue_capacity);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let feeder = tokio::spawn(async move {
            for path in paths {
                if work_tx.send(path).await.is_err() {
                    break;
                }
            }
        });

        let (result_tx, mut result_rx) = mpsc::channel::<FileResult>(worker_count);
        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            workers.push(tokio::spawn(run_worker(
                worker_id,
                Arc::clone(&work_rx),
                result_tx.clone(),
                Arc::clone(&patterns),
                Arc::clone(&snapshot),
            )));
        }
        drop(result_tx);

        // 병합: 코디네이터만 배치와 오프셋 맵을 수정합니다
        let mut batch = ScanBatch {
            files_matched,
            ..ScanBatch::default()
        };
        let mut fatal = None;

        while let Some(FileResult { path, result }) = result_rx.recv().await {
            match result {
                Ok(outcome) => {
                    debug!(
                        path = %path,
                        lines = outcome.lines_read,
                        records = outcome.records.len(),
                        offset = outcome.state.offset,
                        "file scanned"
                    );
                    metrics::counter!(m::SCAN_FILES_TOTAL).increment(1);
                    batch.files_scanned += 1;
                    offsets.insert(path, outcome.state);
                    batch.records.extend(outcome.records);
                }
                Err(LogPipelineError::Worker(reason)) => {
                    warn!(path = %path, error = %reason, "scan worker failed");
                    if fatal.is_none() {
                        fatal = Some(LogPipelineError::Worker(reason));
                    }
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "skipping file, offset left unchanged");
                    metrics::counter!(m::SCAN_FILE_ERRORS_TOTAL).increment(1);
                    batch.files_failed += 1;
                }
            }
        }

        // 배리어: 모든 태스크 종료 대기
        feeder
            .await
            .map_err(|e| LogPipelineError::Worker(format!("feeder task failed: {e}")))?;
        for worker in workers {
            worker
                .await
                .map_err(|e| LogPipelineError::Worker(format!("scan worker task failed: {e}")))?;
        }

        if let Some(e) = fatal {
            return Err(e);
        }

        let store = self.store.clone();
        let (offsets, save_result) = tokio::task::spawn_blocking(move || {
            let result = store.save(&offsets);
            (offsets, result)
        })
        .await
        .map_err(|e| LogPipelineError::Worker(format!("offset save task failed: {e}")))?;

        if let Err(e) = save_result {
            warn!(error = %e, "failed to save offset state, next cycle may reprocess lines");
            metrics::counter!(m::SCAN_OFFSET_SAVE_ERRORS_TOTAL).increment(1);
        }

        metrics::counter!(m::SCAN_RECORDS_TOTAL).increment(batch.records.len() as u64);
        info!(
            files = batch.files_matched,
            scanned = batch.files_scanned,
            failed = batch.files_failed,
            records = batch.records.len(),
            "scan completed"
        );

        batch.offsets = offsets;
        Ok(batch)
    }
}

/// 워커 루프: 큐가 빌 때까지 경로를 꺼내 읽고 결과를 보냅니다.
async fn run_worker(
    worker_id: usize,
    work_rx: Arc<Mutex<mpsc::Receiver<PathBuf>>>,
    result_tx: mpsc::Sender<FileResult>,
    patterns: Arc<PatternSet>,
    snapshot: Arc<OffsetMap>,
) {
    loop {
        let next = work_rx.lock().await.recv().await;
        let Some(path) = next else {
            break;
        };

        let key = path.display().to_string();
        let start = snapshot.get(&key).copied().unwrap_or_default();
        let patterns = Arc::clone(&patterns);

        let result = tokio::task::spawn_blocking(move || FileReader::new(&patterns).read(&path, start))
            .await
            .unwrap_or_else(|e| Err(LogPipelineError::Worker(format!("read task failed: {e}"))));

        if result_tx.send(FileResult { path: key, result }).await.is_err() {
            break;
        }
    }
    debug!(worker_id, "scan worker finished");
}
