use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::run_load;
use crate::args::LoadArgs;
use crate::config::{apply_config, load_config};
use crate::domain::run::RunConfig;
use crate::error::{AppError, AppResult, ValidationError};
use crate::shutdown::{request_shutdown, shutdown_channel};
use crate::sinks::ReportSink;
use crate::system::logger::init_logging;
use crate::system::shutdown_handlers::setup_signal_shutdown_handler;
use crate::transport::{MessageChannel, open_channel};

/// Parses the command line, merges the config file, and runs one load test to completion.
///
/// # Errors
///
/// Returns an error when arguments or configuration are invalid, the runtime cannot be
/// built, the report cannot be written, or any worker failed during the run.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    init_logging(args.verbose, args.no_color);

    let config = RunConfig::from_args(&args)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(ValidationError::RuntimeBuildFailed { source: err }))?;

    runtime.block_on(run_async(config))
}

fn parse_args() -> AppResult<(LoadArgs, ArgMatches)> {
    let matches = LoadArgs::command().get_matches_from(std::env::args_os());
    let args = LoadArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(config: RunConfig) -> AppResult<()> {
    let config = Arc::new(config);
    let channel = open_channel(&config);
    run_on_channel(config, channel).await
}

/// Runs to completion on `channel` and turns worker failures into the `RuntimeErrors`
/// exit, after the report has been written.
async fn run_on_channel(
    config: Arc<RunConfig>,
    channel: Arc<dyn MessageChannel>,
) -> AppResult<()> {
    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let sink = ReportSink::from_settings(&config.output);
    let outcome = run_load(config, channel, &sink, &shutdown_tx).await;

    request_shutdown(&shutdown_tx);
    if let Err(err) = signal_handle.await {
        tracing::debug!("Signal handler join failed: {}", err);
    }

    let outcome = outcome?;
    if outcome.has_failures() {
        for runtime_error in &outcome.runtime_errors {
            tracing::error!("{}", runtime_error);
        }
        return Err(AppError::validation(ValidationError::RuntimeErrors));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::transport::MemoryBroker;
    use crate::transport::test_support::RefusingChannel;

    fn quiet_config(argv: &[&str]) -> AppResult<Arc<RunConfig>> {
        let args = LoadArgs::try_parse_from(argv)
            .map_err(|err| AppError::validation(format!("Expected parse success: {}", err)))?;
        Ok(Arc::new(RunConfig::from_args(&args)?))
    }

    const FAST_QUIET: [&str; 9] = [
        "mqstress",
        "--messages-per-sender",
        "5",
        "--listener-settle-ms",
        "0",
        "--progress-interval-ms",
        "20",
        "--output-format",
        "quiet",
    ];

    #[tokio::test]
    async fn worker_failure_exits_with_runtime_errors() -> AppResult<()> {
        let config = quiet_config(&FAST_QUIET)?;
        let channel = Arc::new(RefusingChannel::new(config.memory_queue_capacity, "sender-1"));
        match run_on_channel(config, channel).await {
            Err(AppError::Validation(ValidationError::RuntimeErrors)) => Ok(()),
            Err(err) => Err(AppError::validation(format!("Unexpected error: {}", err))),
            Ok(()) => Err(AppError::validation("A failed sender must fail the run")),
        }
    }

    #[tokio::test]
    async fn healthy_run_exits_cleanly() -> AppResult<()> {
        let config = quiet_config(&FAST_QUIET)?;
        let channel = Arc::new(MemoryBroker::new(config.memory_queue_capacity));
        run_on_channel(config, channel).await
    }
}
