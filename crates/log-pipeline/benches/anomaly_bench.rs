//! 이상 탐지 벤치마크
//!
//! 배치 크기와 규칙 수에 따른 집계 성능을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use logiq_core::types::{AlertRule, LogRecord, Severity};
use logiq_log_pipeline::AnomalyDetector;

fn create_batch(size: usize) -> Vec<LogRecord> {
    (0..size)
        .map(|i| LogRecord {
            file_path: format!("/var/log/app{}.log", i % 4),
            line_num: i as u64 + 1,
            content: match i % 5 {
                0 => format!("ERROR database connection lost id={i}"),
                1 => format!("WARN upstream timeout id={i}"),
                _ => format!("INFO request served id={i}"),
            },
            timestamp: String::new(),
        })
        .collect()
}

fn create_rules(count: usize) -> Vec<AlertRule> {
    let mut rules = vec![
        AlertRule::new("ERROR", Severity::High),
        AlertRule::new("timeout", Severity::Medium),
    ];
    for i in rules.len()..count {
        rules.push(AlertRule::new(format!("never_matches_{i}"), Severity::Low));
    }
    rules
}

fn bench_batch_size(c: &mut Criterion) {
    let detector = AnomalyDetector::new(&create_rules(2), 0.3);
    let mut group = c.benchmark_group("analyze_batch_size");

    for size in [100usize, 1_000, 10_000] {
        let batch = create_batch(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &batch, |b, batch| {
            b.iter(|| detector.analyze(black_box(batch)))
        });
    }

    group.finish();
}

fn bench_rule_count(c: &mut Criterion) {
    let batch = create_batch(1_000);
    let mut group = c.benchmark_group("analyze_rule_count");

    for rules in [2usize, 10, 50] {
        let detector = AnomalyDetector::new(&create_rules(rules), 0.3);
        group.bench_with_input(BenchmarkId::from_parameter(rules), &detector, |b, detector| {
            b.iter(|| detector.analyze(black_box(&batch)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_batch_size, bench_rule_count);
criterion_main!(benches);
