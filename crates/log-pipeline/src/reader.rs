//! 파일 리더 -- 저장된 오프셋부터 새 라인만 읽기
//!
//! 동기 I/O로 구현되어 있으며, 스캐너는 `tokio::task::spawn_blocking` 안에서
//! 호출합니다.
//!
//! 오프셋이 파일 크기보다 크면 (truncate된 경우) 바로 EOF에 도달하므로
//! 레코드도 에러도 없이 상태가 그대로 유지됩니다.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use logiq_core::types::{FileState, LogRecord};

use crate::error::LogPipelineError;
use crate::pattern::PatternSet;

/// 읽기 버퍼 크기 (1 MiB)
pub const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// 한 파일을 읽은 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOutcome {
    /// 필터를 통과한 레코드 (파일 내 순서 유지)
    pub records: Vec<LogRecord>,
    /// 갱신된 재개 위치
    pub state: FileState,
    /// 이번에 읽은 물리적 라인 수 (필터링 전)
    pub lines_read: u64,
}

/// 단일 파일 증분 리더
pub struct FileReader<'a> {
    patterns: &'a PatternSet,
}

impl<'a> FileReader<'a> {
    /// 컴파일된 패턴 집합으로 리더를 생성합니다.
    pub fn new(patterns: &'a PatternSet) -> Self {
        Self { patterns }
    }

    /// `start` 위치부터 EOF까지 읽습니다.
    ///
    /// 라인 번호는 `start.last_line`에서 이어지며, 개행 없이 끝나는 마지막
    /// 라인도 한 줄로 셉니다. 실패 시 부분 결과는 버려지고 에러만 반환됩니다.
    pub fn read(&self, path: &Path, start: FileState) -> Result<ReadOutcome, LogPipelineError> {
        let file_path = path.display().to_string();
        let access_error = |op: &str, e: std::io::Error| LogPipelineError::FileAccess {
            path: file_path.clone(),
            reason: format!("{op} failed: {e}"),
        };

        let file = File::open(path).map_err(|e| access_error("open", e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        reader
            .seek(SeekFrom::Start(start.offset))
            .map_err(|e| access_error("seek", e))?;

        let mut records = Vec::new();
        let mut state = start;
        let mut lines_read = 0u64;
        let mut buf = Vec::with_capacity(512);

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| access_error("read", e))?;
            if n == 0 {
                break;
            }

            state.offset += n as u64;
            state.last_line += 1;
            lines_read += 1;

            let content = String::from_utf8_lossy(trim_line_ending(&buf));
            if !self.patterns.should_emit(&content) {
                continue;
            }

            records.push(LogRecord {
                file_path: file_path.clone(),
                line_num: state.last_line,
                timestamp: self.patterns.extract_timestamp(&content),
                content: content.into_owned(),
            });
        }

        Ok(ReadOutcome {
            records,
            state,
            lines_read,
        })
    }
}

/// 줄 끝의 `\r`, `\n`을 모두 제거합니다.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| *b != b'\n' && *b != b'\r')
        .map_or(0, |i| i + 1);
    &line[..end]
}
