//! 오프셋 저장소 -- 파일별 재개 위치 영속화
//!
//! 상태 파일은 파일 경로를 키로 하는 JSON 객체입니다.
//!
//! ```text
//! {
//!   "/var/log/app.log": { "offset": 120, "last_line": 10 }
//! }
//! ```
//!
//! 사이클 시작 시 한 번 로드하고, 모든 워커가 끝난 뒤 한 번 저장합니다.
//! 기존 상태 파일을 읽거나 파싱하지 못하면 빈 상태로 시작하므로
//! 모든 파일이 처음부터 다시 읽힙니다.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use logiq_core::types::FileState;

use crate::error::LogPipelineError;

/// 파일 경로 -> 재개 위치
pub type OffsetMap = BTreeMap<String, FileState>;

/// 상태 파일 기반 오프셋 저장소
///
/// 경로는 생성 시 명시적으로 주입되므로 여러 스캐너 인스턴스가
/// 서로 다른 상태 파일로 독립 실행될 수 있습니다.
#[derive(Debug, Clone)]
pub struct OffsetStore {
    path: PathBuf,
}

impl OffsetStore {
    /// 새 저장소를 생성합니다. 파일은 아직 읽지 않습니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 상태 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 저장된 상태를 로드합니다.
    ///
    /// 파일이 없으면 빈 맵을 반환합니다. 읽기/파싱 실패도 경고 후 빈 맵으로
    /// 처리합니다.
    pub fn load(&self) -> OffsetMap {
        match self.try_load() {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "offset state unreadable, starting from empty state (full re-scan)"
                );
                OffsetMap::new()
            }
        }
    }

    /// 저장된 상태를 로드합니다. 파일이 없을 때만 빈 맵을 반환하고
    /// 그 외 실패는 에러로 반환합니다.
    pub fn try_load(&self) -> Result<OffsetMap, LogPipelineError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no offset state yet, fresh start");
                return Ok(OffsetMap::new());
            }
            Err(e) => return Err(self.persistence_error(e)),
        };

        serde_json::from_str(&content).map_err(|e| self.persistence_error(e))
    }

    /// 전체 상태를 저장합니다.
    ///
    /// 같은 디렉토리의 임시 파일에 쓴 뒤 rename으로 교체합니다.
    pub fn save(&self, offsets: &OffsetMap) -> Result<(), LogPipelineError> {
        let json = serde_json::to_vec_pretty(offsets).map_err(|e| self.persistence_error(e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.persistence_error(e))?;
        }

        let tmp_path = self.tmp_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()
        };
        write_tmp().map_err(|e| self.persistence_error(e))?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            self.persistence_error(e)
        })?;

        debug!(path = %self.path.display(), files = offsets.len(), "offset state saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persistence_error(&self, reason: impl std::fmt::Display) -> LogPipelineError {
        LogPipelineError::Persistence {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::new(dir.path().join("state.json"));
        assert!(store.try_load().unwrap().is_empty());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::new(dir.path().join("state.json"));

        let mut offsets = OffsetMap::new();
        offsets.insert(
            "a.log".to_owned(),
            FileState {
                offset: 120,
                last_line: 10,
            },
        );
        store.save(&offsets).unwrap();

        assert_eq!(store.try_load().unwrap(), offsets);
    }

    #[test]
    fn saved_file_uses_offset_and_last_line_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = OffsetStore::new(&path);

        let mut offsets = OffsetMap::new();
        offsets.insert(
            "a.log".to_owned(),
            FileState {
                offset: 7,
                last_line: 2,
            },
        );
        store.save(&offsets).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["a.log"]["offset"], 7);
        assert_eq!(raw["a.log"]["last_line"], 2);
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = OffsetStore::new(&path);
        assert!(matches!(
            store.try_load(),
            Err(LogPipelineError::Persistence { .. })
        ));
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::new(dir.path().join("nested/dir/state.json"));
        store.save(&OffsetMap::new()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn save_overwrites_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::new(dir.path().join("state.json"));

        let mut first = OffsetMap::new();
        first.insert("a.log".to_owned(), FileState::default());
        store.save(&first).unwrap();

        let mut second = OffsetMap::new();
        second.insert(
            "b.log".to_owned(),
            FileState {
                offset: 1,
                last_line: 1,
            },
        );
        store.save(&second).unwrap();

        assert_eq!(store.load(), second);
    }
}
