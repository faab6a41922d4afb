//! Scan cycle execution.
//!
//! A [`CycleRunner`] owns every stage of one cycle and runs them in order:
//!
//! 1. incremental scan (offsets are persisted by the scanner after the barrier)
//! 2. record sinks, in registration order (JSON snapshot, then Parquet)
//! 3. anomaly detection over the whole batch
//! 4. report rendering, when requested
//!
//! An empty batch ends the cycle after step 1. A sink or report failure
//! aborts the remaining stages and is returned to the caller.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use logiq_core::config::LogiqConfig;
use logiq_core::error::LogiqError;
use logiq_core::metrics as m;
use logiq_core::pipeline::{Detector, RecordSink, ReportSink};
use logiq_core::types::Anomaly;
use logiq_log_pipeline::{AnomalyDetector, ScanCoordinator, ScannerConfig};
use logiq_sinks::{HtmlJsonReporter, JsonBatchSink, ParquetSink};

/// What a completed cycle produced.
#[derive(Debug, Default)]
pub struct CycleSummary {
    /// Records in the merged batch.
    pub records: usize,
    /// Files read to completion.
    pub files_scanned: usize,
    /// Files skipped because of read failures.
    pub files_failed: usize,
    /// Ranked anomalies found in the batch.
    pub anomalies: Vec<Anomaly>,
    /// Files written by the record sinks.
    pub outputs: Vec<PathBuf>,
    /// Report files written (empty when no report was requested or nothing was found).
    pub reports: Vec<PathBuf>,
}

/// Result of a single cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The scan produced no new records; nothing downstream ran.
    Idle,
    /// The batch went through every stage.
    Completed(CycleSummary),
}

impl CycleOutcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Completed(_) => "success",
        }
    }
}

/// Runs scan cycles against a fixed set of stages.
pub struct CycleRunner {
    scanner: ScanCoordinator,
    sinks: Vec<Box<dyn RecordSink>>,
    detector: Box<dyn Detector>,
    reporter: Box<dyn ReportSink>,
}

impl CycleRunner {
    /// Assemble a runner from explicit stages.
    pub fn new(
        scanner: ScanCoordinator,
        sinks: Vec<Box<dyn RecordSink>>,
        detector: Box<dyn Detector>,
        reporter: Box<dyn ReportSink>,
    ) -> Self {
        Self {
            scanner,
            sinks,
            detector,
            reporter,
        }
    }

    /// Build the standard pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the derived scanner configuration is invalid.
    pub fn from_config(config: &LogiqConfig) -> Result<Self, LogiqError> {
        let scanner = ScanCoordinator::new(ScannerConfig::from_core(config))?;
        let sinks: Vec<Box<dyn RecordSink>> = vec![
            Box::new(JsonBatchSink::new(&config.output_paths.json_dir_path)),
            Box::new(ParquetSink::new(&config.output_paths.parquet_dir_path)),
        ];
        let detector = AnomalyDetector::new(&config.alert_rules, config.analysis.threshold_spike);
        let reporter = HtmlJsonReporter::from_config(&config.output);

        info!(
            log_paths = config.scan.log_paths.len(),
            rules = detector.rule_count(),
            threshold = config.analysis.threshold_spike,
            state_file = %config.general.state_file,
            "cycle runner initialized"
        );

        Ok(Self::new(
            scanner,
            sinks,
            Box::new(detector),
            Box::new(reporter),
        ))
    }

    /// Names of the registered record sinks, in execution order.
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Run one cycle.
    ///
    /// Every call gets its own `cycle` span with a fresh `cycle_id`, and is
    /// counted in `logiq_cycles_total` under `success`, `idle`, or `failure`.
    pub async fn run_once(&self, generate_report: bool) -> Result<CycleOutcome, LogiqError> {
        let span = info_span!("cycle", cycle_id = %Uuid::new_v4());
        let started = Instant::now();

        let result = self.execute(generate_report).instrument(span).await;

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(_) => "failure",
        };
        metrics::counter!(m::CYCLES_TOTAL, m::LABEL_RESULT => label).increment(1);
        metrics::histogram!(m::CYCLE_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        result
    }

    async fn execute(&self, generate_report: bool) -> Result<CycleOutcome, LogiqError> {
        let batch = self.scanner.scan().await?;

        if batch.is_empty() {
            info!(
                files_matched = batch.files_matched,
                files_scanned = batch.files_scanned,
                "no new log records, skipping output"
            );
            return Ok(CycleOutcome::Idle);
        }

        let mut summary = CycleSummary {
            records: batch.records.len(),
            files_scanned: batch.files_scanned,
            files_failed: batch.files_failed,
            ..CycleSummary::default()
        };

        for sink in &self.sinks {
            let written = sink.write_batch(&batch.records).inspect_err(|e| {
                tracing::error!(sink = sink.name(), error = %e, "record sink failed, aborting cycle");
            })?;
            summary.outputs.extend(written);
        }

        summary.anomalies = self.detector.detect(&batch.records);
        for anomaly in &summary.anomalies {
            info!(
                detector = self.detector.name(),
                pattern = %anomaly.pattern,
                count = anomaly.count,
                severity = anomaly.severity.as_str(),
                spike = anomaly.spike,
                "anomaly detected"
            );
        }

        if generate_report {
            summary.reports = self.reporter.render(&summary.anomalies)?;
        }

        info!(
            records = summary.records,
            files_scanned = summary.files_scanned,
            files_failed = summary.files_failed,
            anomalies = summary.anomalies.len(),
            outputs = summary.outputs.len(),
            reports = summary.reports.len(),
            "cycle completed"
        );
        Ok(CycleOutcome::Completed(summary))
    }
}
