//! Interval loop tests on a paused clock.

use std::time::Duration;

use logiq_core::config::LogiqConfig;
use logiq_daemon::CycleRunner;
use logiq_daemon::scheduler::run_interval;

fn idle_runner(root: &std::path::Path) -> CycleRunner {
    let mut config = LogiqConfig::default();
    config.general.state_file = root.join("offsets.json").display().to_string();
    CycleRunner::from_config(&config).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_runs_one_cycle_per_tick_until_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let runner = idle_runner(dir.path());

    // tick: 0s, 60s, 120s -> 150s에 종료
    let cycles = run_interval(
        &runner,
        Duration::from_secs(60),
        tokio::time::sleep(Duration::from_secs(150)),
    )
    .await;
    assert_eq!(cycles, 3);
}

#[tokio::test(start_paused = true)]
async fn test_immediate_shutdown_runs_no_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let runner = idle_runner(dir.path());

    let cycles = run_interval(&runner, Duration::from_secs(60), async {}).await;
    assert_eq!(cycles, 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycles_do_not_stop_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = LogiqConfig::default();
    config.general.state_file = dir.path().join("offsets.json").display().to_string();
    config.scan.log_paths = vec!["/var/log/[".to_owned()];
    let runner = CycleRunner::from_config(&config).unwrap();

    let cycles = run_interval(
        &runner,
        Duration::from_secs(10),
        tokio::time::sleep(Duration::from_secs(25)),
    )
    .await;
    assert_eq!(cycles, 3);
}
