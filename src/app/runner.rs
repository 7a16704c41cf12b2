use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::run::RunConfig;
use crate::error::AppResult;
use crate::metrics::{LatencyHistogram, LatencyPercentiles, TrackerSnapshot};
use crate::shutdown::{ShutdownReceiver, ShutdownSender, request_shutdown};
use crate::sinks::ResultSink;
use crate::system::banner::log_run_plan;
use crate::traffic::{
    AdmissionSnapshot, ListenerReport, SenderReport, TrafficContext, spawn_listener, spawn_sender,
};
use crate::transport::{EchoResponder, MessageChannel};

use super::progress::log_progress;
use super::roster::{WorkerRole, WorkerRoster};
use super::summary::build_report;

/// Everything measured by one run, after every worker has been joined.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub roster: WorkerRoster,
    pub tracker: TrackerSnapshot,
    pub admission: AdmissionSnapshot,
    pub send_latency: LatencyPercentiles,
    /// Messages republished by the echo responder, when it ran.
    pub echoed: Option<u64>,
    pub runtime_errors: Vec<String>,
    pub cancelled: bool,
}

impl RunOutcome {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.runtime_errors.is_empty()
    }
}

#[derive(Default)]
struct Workers {
    roster: WorkerRoster,
    senders: Vec<JoinHandle<AppResult<SenderReport>>>,
    listeners: Vec<JoinHandle<AppResult<ListenerReport>>>,
    echo: Option<EchoResponder>,
    startup_errors: Vec<String>,
}

impl Workers {
    fn senders_finished(&self) -> bool {
        self.senders.iter().all(JoinHandle::is_finished)
    }

    fn listeners_finished(&self) -> bool {
        self.listeners.iter().all(JoinHandle::is_finished)
    }

    /// Returns why the targets can no longer be met, if they cannot.
    ///
    /// A side whose workers have all exited short of its target is stalled once the
    /// other side's counter stops moving between two checks, so in-flight messages
    /// are still drained.
    fn stall_reason(
        &self,
        snapshot: &TrackerSnapshot,
        previous: Option<&TrackerSnapshot>,
    ) -> Option<&'static str> {
        let senders_done = self.senders_finished();
        let listeners_done = self.listeners_finished();
        if senders_done && listeners_done {
            return Some("Every worker has exited before the targets were reached.");
        }
        let previous = previous?;
        if senders_done
            && !snapshot.sent.is_complete()
            && snapshot.received.total == previous.received.total
        {
            return Some("Senders exited before the send target was reached.");
        }
        if listeners_done
            && !snapshot.received.is_complete()
            && snapshot.sent.total == previous.sent.total
        {
            return Some("Listeners exited before the receive target was reached.");
        }
        None
    }
}

/// Runs one load test: listeners, settle pause, senders, then polls the tracker until
/// both targets are met, the workers of one side have exited short of its target, or
/// shutdown fires. The report is written to `sink` exactly once on every path.
///
/// # Errors
///
/// Returns an error only when the report cannot be written. Worker failures are
/// collected in [`RunOutcome::runtime_errors`].
pub async fn run_load(
    config: Arc<RunConfig>,
    channel: Arc<dyn MessageChannel>,
    sink: &dyn ResultSink,
    shutdown_tx: &ShutdownSender,
) -> AppResult<RunOutcome> {
    log_run_plan(&config);
    let context = Arc::new(TrafficContext::new(config, channel));
    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut workers = Workers::default();

    let mut cancelled = false;
    if context.config.has_no_work() {
        info!("No listeners and senders are configured or message count is 0. Please check your config.");
    } else {
        cancelled = start_workers(&context, shutdown_tx, &mut shutdown_rx, &mut workers).await;
    }

    let cancelled = control_loop(&context, &workers, &mut shutdown_rx, cancelled).await;
    finalize(&context, workers, shutdown_tx, sink, cancelled).await
}

/// Returns `true` when shutdown interrupted the start-up sequence.
async fn start_workers(
    context: &Arc<TrafficContext>,
    shutdown_tx: &ShutdownSender,
    shutdown_rx: &mut ShutdownReceiver,
    workers: &mut Workers,
) -> bool {
    let config = &context.config;

    if config.echo {
        match EchoResponder::start(
            Arc::clone(&context.channel),
            &config.send_to,
            &config.listen_to,
            config.delivery,
            shutdown_tx,
        )
        .await
        {
            Ok(echo) => workers.echo = Some(echo),
            Err(err) => {
                error!("Echo responder failed to start: {}", err);
                workers
                    .startup_errors
                    .push(format!("echo responder failed to start: {}", err));
            }
        }
    }

    for index in 0..config.listeners {
        if index > 0 && pause(config.listener_rampup, shutdown_rx).await {
            return true;
        }
        let label = workers.roster.register(WorkerRole::Listener);
        workers.listeners.push(spawn_listener(
            label,
            Arc::clone(context),
            shutdown_tx.subscribe(),
        ));
    }

    if config.listeners > 0
        && config.senders > 0
        && pause(config.listener_settle, shutdown_rx).await
    {
        return true;
    }

    for index in 0..config.senders {
        if index > 0 && pause(config.sender_rampup, shutdown_rx).await {
            return true;
        }
        let label = workers.roster.register(WorkerRole::Sender);
        workers.senders.push(spawn_sender(
            label,
            Arc::clone(context),
            shutdown_tx.subscribe(),
        ));
    }

    info!(
        "Started {} listeners and {} senders",
        workers.listeners.len(),
        workers.senders.len()
    );
    false
}

/// Sleeps for `duration` unless shutdown fires first. Returns `true` on shutdown.
async fn pause(duration: Duration, shutdown_rx: &mut ShutdownReceiver) -> bool {
    if duration.is_zero() {
        return false;
    }
    tokio::select! {
        _ = shutdown_rx.recv() => true,
        () = tokio::time::sleep(duration) => false,
    }
}

/// Returns whether the run was cancelled.
async fn control_loop(
    context: &TrafficContext,
    workers: &Workers,
    shutdown_rx: &mut ShutdownReceiver,
    cancelled: bool,
) -> bool {
    let interval = context.config.progress_interval;
    let mut cancelled = cancelled;
    let mut previous: Option<TrackerSnapshot> = None;
    loop {
        let snapshot = context.tracker.snapshot();
        if snapshot.is_complete() {
            info!("All messages sent and received.");
            return cancelled;
        }
        if cancelled {
            warn!("Run cancelled before the targets were reached.");
            return true;
        }
        log_progress(&context.config, &snapshot);
        if let Some(reason) = workers.stall_reason(&snapshot, previous.as_ref()) {
            warn!("{}", reason);
            return false;
        }
        previous = Some(snapshot);

        if interval.is_zero() {
            tokio::task::yield_now().await;
            cancelled = !matches!(shutdown_rx.try_recv(), Err(TryRecvError::Empty));
        } else {
            cancelled = pause(interval, shutdown_rx).await;
        }
    }
}

async fn finalize(
    context: &TrafficContext,
    workers: Workers,
    shutdown_tx: &ShutdownSender,
    sink: &dyn ResultSink,
    cancelled: bool,
) -> AppResult<RunOutcome> {
    request_shutdown(shutdown_tx);
    let Workers {
        roster,
        senders,
        listeners,
        echo,
        startup_errors,
    } = workers;
    let mut runtime_errors = startup_errors;

    let mut histograms = Vec::with_capacity(senders.len());
    for handle in senders {
        match handle.await {
            Ok(Ok(report)) => histograms.push(report.latency),
            Ok(Err(err)) => runtime_errors.push(format!("sender failed: {}", err)),
            Err(err) => runtime_errors.push(format!("sender task join failed: {}", err)),
        }
    }
    let send_latency = merge_latency(histograms, &mut runtime_errors);

    for handle in listeners {
        match handle.await {
            Ok(Ok(_report)) => {}
            Ok(Err(err)) => runtime_errors.push(format!("listener failed: {}", err)),
            Err(err) => runtime_errors.push(format!("listener task join failed: {}", err)),
        }
    }

    let mut echoed = None;
    if let Some(echo) = echo {
        match echo.join().await {
            Ok(relayed) => echoed = Some(relayed),
            Err(err) => runtime_errors.push(format!("echo responder failed: {}", err)),
        }
    }

    let tracker = context.tracker.snapshot();
    log_progress(&context.config, &tracker);
    if !runtime_errors.is_empty() {
        warn!("{} runtime errors during the run", runtime_errors.len());
    }

    let outcome = RunOutcome {
        roster,
        tracker,
        admission: context.gate.snapshot(),
        send_latency,
        echoed,
        runtime_errors,
        cancelled,
    };
    sink.write_report(&build_report(&outcome)).await?;
    Ok(outcome)
}

fn merge_latency(
    histograms: Vec<LatencyHistogram>,
    runtime_errors: &mut Vec<String>,
) -> LatencyPercentiles {
    let mut histograms = histograms.into_iter();
    let Some(mut merged) = histograms.next() else {
        return LatencyPercentiles::default();
    };
    for histogram in histograms {
        if let Err(err) = merged.merge(&histogram) {
            runtime_errors.push(format!("latency merge failed: {}", err));
        }
    }
    merged.percentiles()
}
