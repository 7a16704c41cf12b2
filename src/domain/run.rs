use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::args::{LoadArgs, OutputFormat, TransportKind};
use crate::error::{AppError, AppResult, ValidationError};
use crate::traffic::payload;
use crate::transport::{DeliveryOptions, Destination, DestinationKind, Payload};

/// Body sent when no payload source is configured.
const DEFAULT_PAYLOAD: &str = "mqstress load message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub path: Option<PathBuf>,
    pub format: OutputFormat,
}

impl OutputSettings {
    fn resolve(path: Option<&str>, format: Option<OutputFormat>) -> Self {
        let path = path.map(PathBuf::from);
        let format = format
            .or_else(|| path.as_deref().and_then(format_from_extension))
            .unwrap_or(OutputFormat::Text);
        Self { path, format }
    }
}

fn format_from_extension(path: &Path) -> Option<OutputFormat> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "json" => Some(OutputFormat::Json),
        "csv" => Some(OutputFormat::Csv),
        "txt" | "log" => Some(OutputFormat::Text),
        _ => None,
    }
}

/// Immutable settings for one load run, derived from validated arguments.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub transport: TransportKind,
    pub senders: usize,
    pub listeners: usize,
    pub messages_per_sender: u64,
    pub messages_per_listener: Option<u64>,
    pub send_target: u64,
    pub receive_target: u64,
    pub sender_rampup: Duration,
    pub listener_rampup: Duration,
    pub listener_settle: Duration,
    pub progress_interval: Duration,
    /// `None` leaves the admission gate unbounded.
    pub max_outstanding: Option<u64>,
    pub send_to: String,
    pub listen_to: String,
    pub delivery: DeliveryOptions,
    pub payload: Payload,
    pub echo: bool,
    pub memory_queue_capacity: usize,
    pub output: OutputSettings,
}

impl RunConfig {
    /// Builds the run settings and resolves the payload.
    ///
    /// # Errors
    ///
    /// Returns an error when a destination is malformed, echo would loop onto its own
    /// destination, or the payload file cannot be read.
    pub fn from_args(args: &LoadArgs) -> AppResult<Self> {
        let send_destination = Destination::parse(&args.send_to).map_err(AppError::transport)?;
        let listen_destination =
            Destination::parse(&args.listen_to).map_err(AppError::transport)?;
        if args.echo && send_destination == listen_destination {
            return Err(AppError::validation(
                ValidationError::EchoRequiresDistinctDestinations,
            ));
        }

        let send_target = args.send_target.unwrap_or_else(|| {
            count_as_u64(args.senders).saturating_mul(args.messages_per_sender)
        });
        let receive_target = args.receive_target.unwrap_or_else(|| {
            default_receive_target(
                args.listeners,
                args.messages_per_listener,
                send_target,
                listen_destination.kind(),
            )
        });

        let time_to_live =
            (args.time_to_live_ms > 0).then(|| Duration::from_millis(args.time_to_live_ms));

        Ok(Self {
            transport: args.transport,
            senders: args.senders,
            listeners: args.listeners,
            messages_per_sender: args.messages_per_sender,
            messages_per_listener: args.messages_per_listener,
            send_target,
            receive_target,
            sender_rampup: Duration::from_millis(args.sender_rampup_ms),
            listener_rampup: Duration::from_millis(args.listener_rampup_ms),
            listener_settle: Duration::from_millis(args.listener_settle_ms),
            progress_interval: Duration::from_millis(args.progress_interval_ms),
            max_outstanding: args.max_outstanding,
            send_to: send_destination.to_string(),
            listen_to: listen_destination.to_string(),
            delivery: DeliveryOptions {
                mode: args.delivery_mode,
                priority: args.priority.get(),
                time_to_live,
            },
            payload: resolve_payload(args)?,
            echo: args.echo,
            memory_queue_capacity: args.memory_queue_capacity.get(),
            output: OutputSettings::resolve(args.output.as_deref(), args.output_format),
        })
    }

    /// Both targets are zero, so no worker has anything to do.
    #[must_use]
    pub const fn has_no_work(&self) -> bool {
        self.send_target == 0 && self.receive_target == 0
    }
}

fn count_as_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Queue listeners share the sent messages; topic listeners each see all of them.
fn default_receive_target(
    listeners: usize,
    per_listener: Option<u64>,
    send_target: u64,
    kind: DestinationKind,
) -> u64 {
    if listeners == 0 {
        return 0;
    }
    let listeners = count_as_u64(listeners);
    match (per_listener, kind) {
        (Some(per_listener), _) => listeners.saturating_mul(per_listener),
        (None, DestinationKind::Queue) => send_target,
        (None, DestinationKind::Topic) => listeners.saturating_mul(send_target),
    }
}

fn resolve_payload(args: &LoadArgs) -> AppResult<Payload> {
    if let Some(text) = args.payload.as_deref() {
        return Ok(Arc::from(text.as_bytes()));
    }
    if let Some(path) = args.payload_file.as_deref() {
        return payload::read_payload_file(Path::new(path));
    }
    if let Some(size) = args.payload_size {
        return Ok(payload::random_alphanumeric(size.get()));
    }
    Ok(Arc::from(DEFAULT_PAYLOAD.as_bytes()))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn config_from(argv: &[&str]) -> AppResult<RunConfig> {
        let args = LoadArgs::try_parse_from(argv)
            .map_err(|err| AppError::validation(format!("Expected parse success: {}", err)))?;
        RunConfig::from_args(&args)
    }

    #[test]
    fn targets_default_from_worker_counts() -> AppResult<()> {
        let config = config_from(&["mqstress", "--senders", "3", "--messages-per-sender", "20"])?;
        if config.send_target != 60 || config.receive_target != 60 {
            return Err(AppError::validation("Unexpected queue targets"));
        }
        Ok(())
    }

    #[test]
    fn topic_receive_target_scales_with_listeners() -> AppResult<()> {
        let config = config_from(&[
            "mqstress",
            "--listeners",
            "4",
            "--messages-per-sender",
            "10",
            "--listen-to",
            "topic://fanout",
            "--send-to",
            "topic://fanout",
        ])?;
        if config.receive_target != 40 {
            return Err(AppError::validation("Expected four copies per message"));
        }
        Ok(())
    }

    #[test]
    fn explicit_targets_win() -> AppResult<()> {
        let config = config_from(&[
            "mqstress",
            "--listeners",
            "0",
            "--send-target",
            "0",
            "--receive-target",
            "0",
        ])?;
        if !config.has_no_work() {
            return Err(AppError::validation("Expected zero targets"));
        }
        let per_listener = config_from(&["mqstress", "--listeners", "2", "--messages-per-listener", "7"])?;
        if per_listener.receive_target != 14 {
            return Err(AppError::validation("Unexpected per-listener target"));
        }
        Ok(())
    }

    #[test]
    fn no_listeners_means_nothing_to_receive() -> AppResult<()> {
        let config = config_from(&["mqstress", "--listeners", "0"])?;
        if config.receive_target != 0 || config.send_target != 100 {
            return Err(AppError::validation("Unexpected targets without listeners"));
        }
        Ok(())
    }

    #[test]
    fn echo_requires_distinct_destinations() -> AppResult<()> {
        if config_from(&["mqstress", "--echo"]).is_ok() {
            return Err(AppError::validation("Expected echo loop to be rejected"));
        }
        if config_from(&["mqstress", "--echo", "--send-to", "q", "--listen-to", "queue://q"]).is_ok() {
            return Err(AppError::validation("Bare and queue:// names are the same queue"));
        }
        let config = config_from(&["mqstress", "--echo", "--listen-to", "queue://replies"])?;
        if !config.echo || config.send_to == config.listen_to {
            return Err(AppError::validation("Unexpected echo destinations"));
        }
        Ok(())
    }

    #[test]
    fn output_format_follows_extension() -> AppResult<()> {
        let config = config_from(&["mqstress", "--output", "result.JSON"])?;
        if config.output.format != OutputFormat::Json {
            return Err(AppError::validation("Expected json from extension"));
        }
        let explicit = config_from(&["mqstress", "--output", "result.json", "--output-format", "csv"])?;
        if explicit.output.format != OutputFormat::Csv {
            return Err(AppError::validation("Explicit format should win"));
        }
        let stdout = config_from(&["mqstress"])?;
        if stdout.output.format != OutputFormat::Text || stdout.output.path.is_some() {
            return Err(AppError::validation("Expected text to stdout"));
        }
        Ok(())
    }

    #[test]
    fn delivery_options_and_payload() -> AppResult<()> {
        let config = config_from(&["mqstress", "--time-to-live-ms", "0", "--payload-size", "32"])?;
        if config.delivery.time_to_live.is_some() {
            return Err(AppError::validation("Zero ttl should never expire"));
        }
        if config.payload.len() != 32 {
            return Err(AppError::validation("Unexpected payload size"));
        }
        let ttl = config_from(&["mqstress", "--time-to-live-ms", "250", "--payload", "abc"])?;
        if ttl.delivery.time_to_live != Some(Duration::from_millis(250)) {
            return Err(AppError::validation("Unexpected ttl"));
        }
        if ttl.payload.as_ref() != b"abc" {
            return Err(AppError::validation("Unexpected static payload"));
        }
        Ok(())
    }
}
