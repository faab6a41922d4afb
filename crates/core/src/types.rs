//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 스캐너가 생성하고 분석기와 출력 싱크가 소비하는 데이터 구조를 정의합니다.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 로그 레코드
///
/// 파일에서 읽어 include/exclude 필터를 통과한 한 줄을 나타냅니다.
/// 사이클 배치에만 모이며 개별적으로 영속화되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// glob으로 해석된 파일 경로
    pub file_path: String,
    /// 파일 내 물리적 라인 번호 (1부터 시작, 사이클 간 연속)
    pub line_num: u64,
    /// 줄 끝 개행 문자를 제거한 라인 내용
    pub content: String,
    /// 추출된 타임스탬프 (없으면 빈 문자열)
    pub timestamp: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.file_path, self.line_num, self.content)
    }
}

/// 파일별 재개 위치
///
/// 파일이 덧붙이기(append)만 되는 동안 `offset`과 `last_line`은
/// 성공한 사이클마다 단조 증가합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// 다음 스캔을 시작할 바이트 오프셋
    pub offset: u64,
    /// 마지막으로 읽은 라인 번호
    pub last_line: u64,
}

/// 알림 규칙
///
/// `keyword`는 정규식 패턴입니다. 사이클 동안 불변입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    /// 매칭할 정규식
    pub keyword: String,
    /// 심각도
    #[serde(default)]
    pub severity: Severity,
}

impl AlertRule {
    /// 새 규칙을 생성합니다.
    pub fn new(keyword: impl Into<String>, severity: Severity) -> Self {
        Self {
            keyword: keyword.into(),
            severity,
        }
    }
}

/// 탐지된 이상 징후
///
/// 한 규칙에 매칭된 레코드들의 집계입니다. 매칭이 0건인 규칙은
/// `Anomaly`를 만들지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// 규칙 키워드 (정규식 원문)
    pub pattern: String,
    /// 매칭된 레코드 수
    pub count: usize,
    /// 규칙 심각도
    pub severity: Severity,
    /// 집계 시각 (로그 이벤트 시각이 아님)
    pub detected_at: DateTime<Utc>,
    /// 배치 대비 매칭 비율이 임계값을 초과했는지
    pub spike: bool,
    /// 파일 경로 -> 매칭된 라인 번호 (읽은 순서)
    pub files: BTreeMap<String, Vec<u64>>,
    /// `"[라인] 내용"` 형식의 샘플 라인
    pub lines: Vec<String>,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} x{}{}",
            self.severity,
            self.pattern,
            self.count,
            if self.spike { " (spike)" } else { "" },
        )
    }
}

/// 심각도 레벨
///
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Info < Low < Medium < High < Critical`).
/// 설정 파일에서는 대소문자를 구분하지 않고 약어(`crit`, `med`)도 허용합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 정보성 이벤트
    #[default]
    Info,
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적 -- 즉시 대응 필요
    Critical,
}

impl Severity {
    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "info" | "informational" => Some(Self::Info),
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }

    /// 소문자 레이블을 반환합니다 (메트릭 레이블, HTML 클래스에 사용).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_str_loose(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown severity '{raw}', expected one of: info, low, medium, high, critical"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_from_str_loose_is_case_insensitive() {
        assert_eq!(Severity::from_str_loose("CRITICAL"), Some(Severity::Critical));
        assert_eq!(Severity::from_str_loose(" med "), Some(Severity::Medium));
        assert_eq!(Severity::from_str_loose("urgent"), None);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"high\"");
    }

    #[test]
    fn severity_deserializes_loose_labels() {
        let sev: Severity = serde_json::from_str("\"Crit\"").unwrap();
        assert_eq!(sev, Severity::Critical);
        assert!(serde_json::from_str::<Severity>("\"urgent\"").is_err());
    }

    #[test]
    fn alert_rule_severity_defaults_to_info() {
        let rule: AlertRule = serde_json::from_str(r#"{"keyword":"ERROR"}"#).unwrap();
        assert_eq!(rule.severity, Severity::Info);
    }

    #[test]
    fn file_state_json_field_names() {
        let state = FileState {
            offset: 120,
            last_line: 10,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"offset":120,"last_line":10}"#);
    }

    #[test]
    fn log_record_display() {
        let record = LogRecord {
            file_path: "app.log".to_owned(),
            line_num: 2,
            content: "ERROR disk failure".to_owned(),
            timestamp: String::new(),
        };
        assert_eq!(record.to_string(), "app.log:2 ERROR disk failure");
    }
}
