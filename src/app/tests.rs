use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;

use super::progress::{listener_progress, sender_progress};
use super::*;
use crate::args::LoadArgs;
use crate::domain::run::RunConfig;
use crate::error::{AppError, AppResult};
use crate::metrics::{SideSnapshot, TrackerSnapshot};
use crate::shutdown::{request_shutdown, shutdown_channel};
use crate::sinks::{ReportValue, ResultReport, ResultSink};
use crate::transport::test_support::RefusingChannel;
use crate::transport::{MemoryBroker, MessageChannel};

/// Virtual time after which a run is considered hung.
const RUN_DEADLINE: Duration = Duration::from_secs(3600);

#[derive(Default)]
struct CollectingSink {
    reports: Mutex<Vec<ResultReport>>,
}

impl CollectingSink {
    fn reports(&self) -> Vec<ResultReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ResultSink for CollectingSink {
    async fn write_report(&self, report: &ResultReport) -> AppResult<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }
}

fn config_from(argv: &[&str]) -> AppResult<Arc<RunConfig>> {
    let args = LoadArgs::try_parse_from(argv)
        .map_err(|err| AppError::validation(format!("Expected parse success: {}", err)))?;
    Ok(Arc::new(RunConfig::from_args(&args)?))
}

async fn run_with(argv: &[&str]) -> AppResult<(RunOutcome, ResultReport)> {
    let config = config_from(argv)?;
    let channel = Arc::new(MemoryBroker::new(config.memory_queue_capacity));
    run_on(config, channel).await
}

async fn run_on(
    config: Arc<RunConfig>,
    channel: Arc<dyn MessageChannel>,
) -> AppResult<(RunOutcome, ResultReport)> {
    let sink = CollectingSink::default();
    let (shutdown_tx, _keep_alive) = shutdown_channel();
    let outcome = tokio::time::timeout(
        RUN_DEADLINE,
        run_load(config, channel, &sink, &shutdown_tx),
    )
    .await
    .map_err(|err| AppError::validation(format!("Run never finished: {}", err)))??;
    let mut reports = sink.reports();
    if reports.len() != 1 {
        return Err(AppError::validation(format!(
            "Expected exactly one report, got {}",
            reports.len()
        )));
    }
    let report = reports
        .pop()
        .ok_or_else(|| AppError::validation("Missing report"))?;
    Ok((outcome, report))
}

fn expect_count(report: &ResultReport, key: &'static str, expected: u64) -> AppResult<()> {
    match report.get(key) {
        Some(ReportValue::Count(value)) if value == expected => Ok(()),
        other => Err(AppError::validation(format!(
            "Unexpected {}: {:?}, wanted {}",
            key, other, expected
        ))),
    }
}

#[tokio::test(start_paused = true)]
async fn zero_targets_spawn_no_workers() -> AppResult<()> {
    let (outcome, report) = run_with(&[
        "mqstress",
        "--listeners",
        "0",
        "--send-target",
        "0",
    ])
    .await?;
    if !outcome.roster.records().is_empty() {
        return Err(AppError::validation("No worker should be started"));
    }
    expect_count(&report, "senders_started", 0)?;
    expect_count(&report, "listeners_started", 0)?;
    expect_count(&report, "total_messages_sent", 0)?;
    expect_count(&report, "sender_duration_ns", 0)?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn listener_rampup_spaces_spawns() -> AppResult<()> {
    let (outcome, _report) = run_with(&[
        "mqstress",
        "--listeners",
        "3",
        "--listener-rampup-ms",
        "100",
        "--listener-settle-ms",
        "0",
        "--messages-per-sender",
        "5",
        "--messages-per-listener",
        "0",
    ])
    .await?;
    let spawned: Vec<_> = outcome.roster.spawn_times(WorkerRole::Listener).collect();
    if spawned.len() != 3 {
        return Err(AppError::validation("Expected three listeners"));
    }
    for (earlier, later) in spawned.iter().zip(spawned.iter().skip(1)) {
        if later.duration_since(*earlier) < Duration::from_millis(100) {
            return Err(AppError::validation("Listeners spawned too close together"));
        }
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn queue_run_delivers_every_message() -> AppResult<()> {
    let (outcome, report) = run_with(&[
        "mqstress",
        "--senders",
        "2",
        "--listeners",
        "2",
        "--messages-per-sender",
        "25",
        "--listener-settle-ms",
        "0",
        "--progress-interval-ms",
        "10",
        "--max-outstanding",
        "5",
    ])
    .await?;
    if outcome.cancelled || outcome.has_failures() {
        return Err(AppError::validation(format!(
            "Run should finish cleanly: {:?}",
            outcome.runtime_errors
        )));
    }
    expect_count(&report, "total_messages_sent", 50)?;
    expect_count(&report, "total_messages_received", 50)?;
    expect_count(&report, "missing_messages", 0)?;
    expect_count(&report, "distinct_sent_ids", 50)?;
    expect_count(&report, "distinct_received_ids", 50)?;
    expect_count(&report, "runtime_errors", 0)?;
    if outcome.admission.peak_outstanding > 5 {
        return Err(AppError::validation("Gate limit exceeded"));
    }
    if outcome.send_latency.count != 50 {
        return Err(AppError::validation("Every send should be in the latency histogram"));
    }
    if report.get("echoed_messages").is_some() {
        return Err(AppError::validation("Echo entry only appears with --echo"));
    }
    let keys: Vec<_> = report.entries().iter().map(|entry| entry.key).collect();
    let sender_block = [
        "sender_duration_ns",
        "sender_duration_ms",
        "sender_duration_sec",
        "sender_messages_per_sec",
        "sender_messages_per_ms",
        "listener_duration_ns",
    ];
    if !keys.windows(sender_block.len()).any(|window| window == sender_block) {
        return Err(AppError::validation(format!("Unexpected role entries: {:?}", keys)));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_sender_ends_run_with_report() -> AppResult<()> {
    let config = config_from(&[
        "mqstress",
        "--senders",
        "2",
        "--listeners",
        "1",
        "--messages-per-sender",
        "5",
        "--listener-settle-ms",
        "0",
        "--progress-interval-ms",
        "10",
    ])?;
    let channel = Arc::new(RefusingChannel::new(config.memory_queue_capacity, "sender-2"));
    let (outcome, report) = run_on(config, channel).await?;

    if outcome.cancelled {
        return Err(AppError::validation("Run was not cancelled"));
    }
    match outcome.runtime_errors.as_slice() {
        [error] if error.starts_with("sender failed") => {}
        other => {
            return Err(AppError::validation(format!(
                "Expected one sender error, got {:?}",
                other
            )));
        }
    }
    expect_count(&report, "senders_started", 2)?;
    expect_count(&report, "total_messages_sent", 5)?;
    expect_count(&report, "total_messages_received", 5)?;
    expect_count(&report, "missing_messages", 5)?;
    expect_count(&report, "runtime_errors", 1)?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_listener_ends_run_with_report() -> AppResult<()> {
    let config = config_from(&[
        "mqstress",
        "--listeners",
        "1",
        "--messages-per-sender",
        "5",
        "--max-outstanding",
        "2",
        "--listener-settle-ms",
        "0",
        "--progress-interval-ms",
        "10",
    ])?;
    let channel = Arc::new(RefusingChannel::new(config.memory_queue_capacity, "listener-1"));
    let (outcome, report) = run_on(config, channel).await?;

    match outcome.runtime_errors.as_slice() {
        [error] if error.starts_with("listener failed") => {}
        other => {
            return Err(AppError::validation(format!(
                "Expected one listener error, got {:?}",
                other
            )));
        }
    }
    expect_count(&report, "total_messages_sent", 2)?;
    expect_count(&report, "total_messages_received", 0)?;
    expect_count(&report, "missing_messages", 5)?;
    expect_count(&report, "runtime_errors", 1)?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn echo_run_relays_to_listeners() -> AppResult<()> {
    let (outcome, report) = run_with(&[
        "mqstress",
        "--echo",
        "--send-to",
        "queue://requests",
        "--listen-to",
        "queue://replies",
        "--messages-per-sender",
        "20",
        "--listener-settle-ms",
        "0",
        "--progress-interval-ms",
        "10",
    ])
    .await?;
    if outcome.echoed != Some(20) {
        return Err(AppError::validation(format!(
            "Unexpected echo count: {:?}",
            outcome.echoed
        )));
    }
    expect_count(&report, "total_messages_received", 20)?;
    expect_count(&report, "echoed_messages", 20)?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn external_cancel_still_reports() -> AppResult<()> {
    let config = config_from(&[
        "mqstress",
        "--max-outstanding",
        "0",
        "--listener-settle-ms",
        "0",
        "--progress-interval-ms",
        "10",
    ])?;
    let channel = Arc::new(MemoryBroker::new(config.memory_queue_capacity));
    let sink = CollectingSink::default();
    let (shutdown_tx, _keep_alive) = shutdown_channel();

    let trigger = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        request_shutdown(&trigger);
    });

    let outcome = run_load(config, channel, &sink, &shutdown_tx).await?;
    if !outcome.cancelled {
        return Err(AppError::validation("Run should be marked cancelled"));
    }
    let reports = sink.reports();
    let report = match reports.as_slice() {
        [report] => report,
        _ => return Err(AppError::validation("Expected exactly one report")),
    };
    expect_count(report, "total_messages_sent", 0)?;
    expect_count(report, "missing_messages", 100)?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn exits_when_every_worker_is_done() -> AppResult<()> {
    let (outcome, report) = run_with(&[
        "mqstress",
        "--listeners",
        "0",
        "--receive-target",
        "5",
        "--messages-per-sender",
        "5",
        "--progress-interval-ms",
        "10",
    ])
    .await?;
    if outcome.cancelled {
        return Err(AppError::validation("Run was not cancelled"));
    }
    expect_count(&report, "total_messages_sent", 5)?;
    expect_count(&report, "missing_messages", 5)?;
    Ok(())
}

#[test]
fn progress_lines_match_format() -> AppResult<()> {
    let config = config_from(&["mqstress", "--listeners", "0"])?;
    let snapshot = TrackerSnapshot {
        sent: SideSnapshot {
            target: 100,
            total: 500,
            distinct: 500,
            elapsed: Duration::from_secs(2),
        },
        received: SideSnapshot::default(),
    };
    let line = sender_progress(&config, &snapshot);
    if line.as_deref()
        != Some("[SENDER] 500 of 100 messages sent so far to [queue://mqstress.load] => 250.00 msg/s, 0.25 msg/ms")
    {
        return Err(AppError::validation(format!("Unexpected sender line: {:?}", line)));
    }
    if listener_progress(&config, &snapshot).is_some() {
        return Err(AppError::validation("No listener line without a receive target"));
    }
    Ok(())
}
