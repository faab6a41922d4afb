//! 패턴 컴파일 -- include/exclude/timestamp 필터와 알림 규칙 정규식
//!
//! [`PatternSet`]은 사이클 시작 시 한 번 컴파일되어 모든 워커가 공유합니다.
//! 컴파일에 실패한 패턴은 경고 후 제외되며, 나머지 패턴은 그대로 사용됩니다.
//!
//! # 필터 규칙
//! 1. exclude 패턴 중 하나라도 매칭되면 제외
//! 2. include 목록이 비어 있으면 포함
//! 3. include 패턴 중 하나라도 매칭되면 포함

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use tracing::{debug, warn};

use logiq_core::metrics as m;
use logiq_core::types::{AlertRule, Severity};

use crate::error::LogPipelineError;

/// 패턴 그룹 -- 경고 로그와 메트릭 레이블에 사용
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternGroup {
    /// 포함 필터
    Include,
    /// 제외 필터
    Exclude,
    /// 타임스탬프 추출
    Timestamp,
    /// 알림 규칙 키워드
    Rule,
}

impl PatternGroup {
    /// 소문자 레이블을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
            Self::Timestamp => "timestamp",
            Self::Rule => "rule",
        }
    }
}

impl fmt::Display for PatternGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 단일 패턴을 컴파일합니다.
///
/// 앞뒤 공백은 컴파일 전에 제거됩니다.
pub fn try_compile(group: PatternGroup, pattern: &str) -> Result<Regex, LogPipelineError> {
    Regex::new(pattern.trim()).map_err(|e| LogPipelineError::PatternCompile {
        group: group.to_string(),
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })
}

/// 패턴 목록을 컴파일하고, 실패한 패턴은 경고 후 제외합니다.
pub fn compile_group(group: PatternGroup, patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match try_compile(group, pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(group = %group, pattern = %pattern, error = %e, "dropping invalid pattern");
                metrics::counter!(m::SCAN_PATTERN_ERRORS_TOTAL, m::LABEL_PATTERN_GROUP => group.as_str())
                    .increment(1);
                None
            }
        })
        .collect()
}

/// 컴파일된 include/exclude/timestamp 패턴 집합
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    timestamp: Vec<Regex>,
}

impl PatternSet {
    /// 세 그룹의 패턴을 컴파일합니다.
    ///
    /// 이 함수는 실패하지 않습니다. 잘못된 패턴은 해당 그룹에서 빠집니다.
    pub fn compile(include: &[String], exclude: &[String], timestamp: &[String]) -> Self {
        let set = Self {
            include: compile_group(PatternGroup::Include, include),
            exclude: compile_group(PatternGroup::Exclude, exclude),
            timestamp: compile_group(PatternGroup::Timestamp, timestamp),
        };
        debug!(
            include = set.include.len(),
            exclude = set.exclude.len(),
            timestamp = set.timestamp.len(),
            "pattern set compiled"
        );
        set
    }

    /// 라인이 배치에 포함될지 판단합니다.
    pub fn should_emit(&self, line: &str) -> bool {
        if self.exclude.iter().any(|re| re.is_match(line)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(line))
    }

    /// 설정 순서대로 타임스탬프 패턴을 시도해 첫 번째 매칭을 반환합니다.
    ///
    /// 빈 문자열에만 매칭되는 패턴은 매칭 실패로 간주합니다.
    /// 아무 패턴도 매칭되지 않으면 빈 문자열을 반환합니다.
    pub fn extract_timestamp(&self, line: &str) -> String {
        self.timestamp
            .iter()
            .filter_map(|re| re.find(line))
            .map(|m| m.as_str())
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_owned()
    }

    /// include 패턴 수
    pub fn include_len(&self) -> usize {
        self.include.len()
    }

    /// exclude 패턴 수
    pub fn exclude_len(&self) -> usize {
        self.exclude.len()
    }

    /// timestamp 패턴 수
    pub fn timestamp_len(&self) -> usize {
        self.timestamp.len()
    }
}

/// 컴파일된 알림 규칙
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// 원본 키워드 (Anomaly 패턴명)
    pub keyword: String,
    /// 규칙 심각도
    pub severity: Severity,
    regex: Regex,
}

impl CompiledRule {
    /// 내용이 규칙 키워드에 매칭되는지 확인합니다.
    pub fn is_match(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }
}

/// 알림 규칙 목록을 선언 순서대로 컴파일합니다.
///
/// 컴파일 실패한 규칙과, 앞선 규칙과 키워드가 같은 규칙은 경고 후 제외됩니다.
pub fn compile_rules(rules: &[AlertRule]) -> Vec<CompiledRule> {
    let mut seen = HashSet::new();
    let mut compiled = Vec::with_capacity(rules.len());

    for rule in rules {
        if !seen.insert(rule.keyword.as_str()) {
            warn!(keyword = %rule.keyword, "skipping duplicate alert rule keyword");
            continue;
        }
        match try_compile(PatternGroup::Rule, &rule.keyword) {
            Ok(regex) => compiled.push(CompiledRule {
                keyword: rule.keyword.clone(),
                severity: rule.severity,
                regex,
            }),
            Err(e) => {
                warn!(keyword = %rule.keyword, error = %e, "skipping alert rule with invalid keyword");
                metrics::counter!(m::SCAN_PATTERN_ERRORS_TOTAL, m::LABEL_PATTERN_GROUP => PatternGroup::Rule.as_str())
                    .increment(1);
            }
        }
    }

    compiled
}
