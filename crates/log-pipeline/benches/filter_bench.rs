//! 라인 필터링 벤치마크
//!
//! include/exclude 필터와 타임스탬프 추출 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use logiq_log_pipeline::PatternSet;

fn sample_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            0 => format!("2024-01-15 12:00:{:02} ERROR request {i} failed: timeout", i % 60),
            1 => format!("2024-01-15 12:00:{:02} INFO request {i} ok", i % 60),
            2 => format!("2024-01-15 12:00:{:02} DEBUG healthcheck {i}", i % 60),
            _ => format!("WARN slow query id={i}"),
        })
        .collect()
}

fn bench_should_emit(c: &mut Criterion) {
    let lines = sample_lines(1_000);
    let mut group = c.benchmark_group("should_emit");
    group.throughput(Throughput::Elements(lines.len() as u64));

    let empty = PatternSet::default();
    group.bench_function("no_patterns", |b| {
        b.iter(|| lines.iter().filter(|l| empty.should_emit(black_box(l))).count())
    });

    let filtered = PatternSet::compile(
        &["ERROR".to_owned(), "WARN".to_owned()],
        &["healthcheck".to_owned(), "DEBUG".to_owned()],
        &[],
    );
    group.bench_function("include_exclude", |b| {
        b.iter(|| lines.iter().filter(|l| filtered.should_emit(black_box(l))).count())
    });

    group.finish();
}

fn bench_extract_timestamp(c: &mut Criterion) {
    let lines = sample_lines(1_000);
    let mut group = c.benchmark_group("extract_timestamp");
    group.throughput(Throughput::Elements(lines.len() as u64));

    for patterns in [1usize, 3] {
        let all = [
            r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z".to_owned(),
            r"\d{2}/\d{2}/\d{4}".to_owned(),
            r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}".to_owned(),
        ];
        let set = PatternSet::compile(&[], &[], &all[all.len() - patterns..]);
        group.bench_with_input(BenchmarkId::new("patterns", patterns), &set, |b, set| {
            b.iter(|| {
                lines
                    .iter()
                    .map(|l| set.extract_timestamp(black_box(l)).len())
                    .sum::<usize>()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_should_emit, bench_extract_timestamp);
criterion_main!(benches);
