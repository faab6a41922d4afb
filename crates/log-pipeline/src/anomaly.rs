//! 규칙 기반 이상 탐지기
//!
//! [`AnomalyDetector`]는 사이클 배치 전체를 한 번에 분석합니다.
//! 스캔 배리어 이후 단일 스레드로 실행되며 입력 배치는 읽기 전용입니다.
//!
//! # 집계 규칙
//! - 규칙별 매칭 수, 파일별 라인 번호, `"[라인] 내용"` 샘플을 수집
//! - 매칭이 0건인 규칙은 결과에 포함하지 않음
//! - `count / 배치 크기 > threshold` 이면 스파이크 (엄격한 부등호)
//! - 매칭 수 내림차순 정렬, 동률은 규칙 선언 순서

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;

use logiq_core::metrics as m;
use logiq_core::pipeline::Detector;
use logiq_core::types::{AlertRule, Anomaly, LogRecord, Severity};

use crate::pattern::{CompiledRule, compile_rules};

/// 규칙 기반 이상 탐지기
pub struct AnomalyDetector {
    rules: Vec<AlertRule>,
    compiled: Vec<CompiledRule>,
    threshold: f64,
}

impl AnomalyDetector {
    /// 규칙 목록과 스파이크 임계값으로 탐지기를 생성합니다.
    ///
    /// 키워드 컴파일에 실패한 규칙은 경고 후 제외됩니다.
    pub fn new(rules: &[AlertRule], threshold: f64) -> Self {
        Self {
            rules: rules.to_vec(),
            compiled: compile_rules(rules),
            threshold,
        }
    }

    /// 스파이크 임계값
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 사용 가능한(컴파일된) 규칙 수
    pub fn rule_count(&self) -> usize {
        self.compiled.len()
    }

    /// 키워드와 대소문자 무시 비교로 일치하는 첫 규칙의 심각도를 반환합니다.
    ///
    /// 일치하는 규칙이 없으면 `Info`입니다.
    pub fn severity_for(&self, keyword: &str) -> Severity {
        self.rules
            .iter()
            .find(|r| r.keyword.to_lowercase() == keyword.to_lowercase())
            .map(|r| r.severity)
            .unwrap_or(Severity::Info)
    }

    /// 배치를 분석하여 매칭 수 내림차순으로 정렬된 이상 징후 목록을 반환합니다.
    pub fn analyze(&self, records: &[LogRecord]) -> Vec<Anomaly> {
        if records.is_empty() {
            return Vec::new();
        }

        let total = records.len() as f64;
        let detected_at = Utc::now();
        let mut anomalies = Vec::new();

        for rule in &self.compiled {
            let mut count = 0usize;
            let mut files: BTreeMap<String, Vec<u64>> = BTreeMap::new();
            let mut lines = Vec::new();

            for record in records.iter().filter(|r| rule.is_match(&r.content)) {
                count += 1;
                files
                    .entry(record.file_path.clone())
                    .or_default()
                    .push(record.line_num);
                lines.push(format!("[{}] {}", record.line_num, record.content));
            }

            if count == 0 {
                continue;
            }

            let ratio = count as f64 / total;
            anomalies.push(Anomaly {
                pattern: rule.keyword.clone(),
                count,
                severity: self.severity_for(&rule.keyword),
                detected_at,
                spike: ratio > self.threshold,
                files,
                lines,
            });
        }

        // sort_by는 안정 정렬이므로 동률은 규칙 선언 순서를 유지합니다
        anomalies.sort_by(|a, b| b.count.cmp(&a.count));

        for anomaly in &anomalies {
            metrics::counter!(m::ANALYSIS_ANOMALIES_TOTAL, m::LABEL_SEVERITY => anomaly.severity.as_str())
                .increment(1);
            if anomaly.spike {
                metrics::counter!(m::ANALYSIS_SPIKES_TOTAL).increment(1);
            }
        }

        debug!(
            records = records.len(),
            rules = self.compiled.len(),
            anomalies = anomalies.len(),
            "analysis completed"
        );
        anomalies
    }
}

impl Detector for AnomalyDetector {
    fn name(&self) -> &str {
        "alert_rules"
    }

    fn detect(&self, records: &[LogRecord]) -> Vec<Anomaly> {
        self.analyze(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, line_num: u64, content: &str) -> LogRecord {
        LogRecord {
            file_path: path.to_owned(),
            line_num,
            content: content.to_owned(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn empty_batch_yields_nothing() {
        let detector = AnomalyDetector::new(&[AlertRule::new("ERROR", Severity::High)], 0.3);
        assert!(detector.analyze(&[]).is_empty());
    }

    #[test]
    fn app_log_scenario() {
        let records = vec![
            record("app.log", 1, "INFO start"),
            record("app.log", 2, "ERROR disk failure"),
            record("app.log", 3, "INFO done"),
        ];
        let detector = AnomalyDetector::new(&[AlertRule::new("ERROR", Severity::Critical)], 0.3);

        let anomalies = detector.analyze(&records);
        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        assert_eq!(a.pattern, "ERROR");
        assert_eq!(a.count, 1);
        assert_eq!(a.severity, Severity::Critical);
        assert!(a.spike);
        assert_eq!(a.files["app.log"], vec![2]);
        assert_eq!(a.lines, vec!["[2] ERROR disk failure"]);
    }

    #[test]
    fn spike_uses_strict_inequality() {
        let records = vec![
            record("a", 1, "ERROR"),
            record("a", 2, "ok"),
            record("a", 3, "ok"),
        ];
        let rules = [AlertRule::new("ERROR", Severity::High)];

        assert!(AnomalyDetector::new(&rules, 0.3).analyze(&records)[0].spike);
        assert!(!AnomalyDetector::new(&rules, 0.34).analyze(&records)[0].spike);

        let half = vec![record("a", 1, "ERROR"), record("a", 2, "ok")];
        assert!(!AnomalyDetector::new(&rules, 0.5).analyze(&half)[0].spike);
    }

    #[test]
    fn zero_count_rules_are_absent() {
        let records = vec![record("a", 1, "INFO fine")];
        let detector = AnomalyDetector::new(
            &[
                AlertRule::new("ERROR", Severity::High),
                AlertRule::new("INFO", Severity::Info),
            ],
            0.3,
        );
        let anomalies = detector.analyze(&records);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].pattern, "INFO");
    }

    #[test]
    fn sorted_by_count_desc_with_declaration_order_ties() {
        let records = vec![
            record("a", 1, "timeout"),
            record("a", 2, "ERROR"),
            record("a", 3, "ERROR"),
            record("a", 4, "WARN"),
        ];
        let detector = AnomalyDetector::new(
            &[
                AlertRule::new("timeout", Severity::Medium),
                AlertRule::new("WARN", Severity::Low),
                AlertRule::new("ERROR", Severity::High),
            ],
            0.9,
        );
        let patterns: Vec<String> = detector
            .analyze(&records)
            .into_iter()
            .map(|a| a.pattern)
            .collect();
        assert_eq!(patterns, vec!["ERROR", "timeout", "WARN"]);
    }

    #[test]
    fn files_group_lines_per_path() {
        let records = vec![
            record("a.log", 1, "ERROR x"),
            record("b.log", 7, "ERROR y"),
            record("a.log", 3, "ERROR z"),
        ];
        let detector = AnomalyDetector::new(&[AlertRule::new("ERROR", Severity::High)], 0.3);
        let anomaly = &detector.analyze(&records)[0];

        assert_eq!(anomaly.count, 3);
        assert_eq!(anomaly.files["a.log"], vec![1, 3]);
        assert_eq!(anomaly.files["b.log"], vec![7]);
        assert_eq!(anomaly.lines.len(), 3);
    }

    #[test]
    fn invalid_rule_is_skipped() {
        let records = vec![record("a", 1, "ERROR")];
        let detector = AnomalyDetector::new(
            &[
                AlertRule::new("([", Severity::High),
                AlertRule::new("ERROR", Severity::Low),
            ],
            0.3,
        );
        assert_eq!(detector.rule_count(), 1);
        assert_eq!(detector.analyze(&records).len(), 1);
    }

    #[test]
    fn severity_lookup_is_case_insensitive() {
        let detector = AnomalyDetector::new(&[AlertRule::new("Error", Severity::High)], 0.3);
        assert_eq!(detector.severity_for("ERROR"), Severity::High);
        assert_eq!(detector.severity_for("missing"), Severity::Info);
    }

    #[test]
    fn detector_trait_delegates_to_analyze() {
        let detector = AnomalyDetector::new(&[AlertRule::new("ERROR", Severity::High)], 0.3);
        let d: &dyn Detector = &detector;
        assert_eq!(d.name(), "alert_rules");
        assert_eq!(d.detect(&[record("a", 1, "ERROR")]).len(), 1);
    }
}
