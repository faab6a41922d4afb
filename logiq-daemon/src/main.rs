use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use logiq_core::config::LogiqConfig;
use logiq_daemon::cli::{DaemonCli, RunMode};
use logiq_daemon::cycle::{CycleOutcome, CycleRunner};
use logiq_daemon::{logging, metrics_server, scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 로드: 파일 -> 환경변수 -> CLI 인자 순으로 덮어씁니다
    let mut config = LogiqConfig::load(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {e}", cli.config.display()))?;
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {e}"))?;

    let mode = cli.run_mode();
    if mode == RunMode::Validate {
        println!("configuration is valid: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(
        config = %cli.config.display(),
        version = env!("CARGO_PKG_VERSION"),
        "logiq-daemon starting"
    );

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let runner = CycleRunner::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build cycle runner: {e}"))?;

    match mode {
        RunMode::Once { report } => match runner.run_once(report).await {
            Ok(CycleOutcome::Idle) => tracing::info!("single scan finished with no new records"),
            Ok(CycleOutcome::Completed(summary)) => tracing::info!(
                records = summary.records,
                anomalies = summary.anomalies.len(),
                reports = summary.reports.len(),
                "single scan finished"
            ),
            Err(e) => {
                tracing::error!(error = %e, "scan cycle failed");
                return Err(e.into());
            }
        },
        RunMode::Interval => {
            let period = Duration::from_secs(config.analysis.effective_interval_secs());
            let shutdown = async {
                match scheduler::wait_for_shutdown_signal().await {
                    Ok(signal) => tracing::info!(signal, "shutdown signal received"),
                    Err(e) => tracing::error!(error = %e, "signal handling unavailable, stopping"),
                }
            };
            let cycles = scheduler::run_interval(&runner, period, shutdown).await;
            tracing::info!(cycles, "interval loop stopped");
        }
        RunMode::Validate => {}
    }

    tracing::info!("logiq-daemon shut down");
    Ok(())
}
