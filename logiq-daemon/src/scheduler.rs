//! Interval scheduling and shutdown signals.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;

use crate::cycle::{CycleOutcome, CycleRunner};

/// Run one cycle per `period` until `shutdown` resolves.
///
/// The first cycle starts immediately. Shutdown is only observed between
/// cycles, so a running cycle always finishes. A failed cycle is logged and
/// the loop keeps going; the next tick retries from the last saved offsets.
///
/// Returns the number of cycles that were started.
pub async fn run_interval<F>(runner: &CycleRunner, period: Duration, shutdown: F) -> u64
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    // 긴 사이클 뒤에 밀린 tick을 몰아서 실행하지 않습니다
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    tracing::info!(interval_secs = period.as_secs(), "interval loop started");
    let mut cycles = 0u64;

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                tracing::info!(cycles, "shutdown requested, stopping interval loop");
                break;
            }
            _ = ticker.tick() => {
                cycles += 1;
                match runner.run_once(true).await {
                    Ok(CycleOutcome::Idle) => tracing::debug!(cycle = cycles, "cycle idle"),
                    Ok(CycleOutcome::Completed(summary)) => tracing::debug!(
                        cycle = cycles,
                        records = summary.records,
                        anomalies = summary.anomalies.len(),
                        "cycle finished"
                    ),
                    Err(e) => tracing::error!(cycle = cycles, error = %e, "cycle failed, will retry on next tick"),
                }
            }
        }
    }

    cycles
}

/// Wait for SIGINT (ctrl-c) or, on Unix, SIGTERM.
///
/// Returns the name of the signal that was received.
pub async fn wait_for_shutdown_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {e}"))?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.map_err(|e| anyhow::anyhow!("failed to listen for ctrl-c: {e}"))?;
                Ok("SIGINT")
            }
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| anyhow::anyhow!("failed to listen for ctrl-c: {e}"))?;
        Ok("ctrl-c")
    }
}
