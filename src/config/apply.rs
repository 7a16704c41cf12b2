use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{LoadArgs, PositiveUsize, Priority};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments. Options given on the command line win.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict with each other.
pub fn apply_config(
    args: &mut LoadArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    ensure_single_payload_source(config)?;

    if !is_cli(matches, "transport")
        && let Some(transport) = config.transport
    {
        args.transport = transport;
    }
    if !is_cli(matches, "senders")
        && let Some(senders) = config.senders
    {
        args.senders = senders;
    }
    if !is_cli(matches, "listeners")
        && let Some(listeners) = config.listeners
    {
        args.listeners = listeners;
    }
    if !is_cli(matches, "messages_per_sender")
        && let Some(count) = config.messages_per_sender
    {
        args.messages_per_sender = count;
    }
    if !is_cli(matches, "messages_per_listener")
        && let Some(count) = config.messages_per_listener
    {
        args.messages_per_listener = Some(count);
    }
    if !is_cli(matches, "send_target")
        && let Some(target) = config.send_target
    {
        args.send_target = Some(target);
    }
    if !is_cli(matches, "receive_target")
        && let Some(target) = config.receive_target
    {
        args.receive_target = Some(target);
    }

    apply_millis(
        matches,
        "sender_rampup_ms",
        config.sender_rampup.as_ref(),
        &mut args.sender_rampup_ms,
    )?;
    apply_millis(
        matches,
        "listener_rampup_ms",
        config.listener_rampup.as_ref(),
        &mut args.listener_rampup_ms,
    )?;
    apply_millis(
        matches,
        "listener_settle_ms",
        config.listener_settle.as_ref(),
        &mut args.listener_settle_ms,
    )?;
    apply_millis(
        matches,
        "progress_interval_ms",
        config.progress_interval.as_ref(),
        &mut args.progress_interval_ms,
    )?;
    apply_millis(
        matches,
        "time_to_live_ms",
        config.time_to_live.as_ref(),
        &mut args.time_to_live_ms,
    )?;

    if !is_cli(matches, "max_outstanding")
        && let Some(limit) = config.max_outstanding
    {
        args.max_outstanding = Some(limit);
    }
    if !is_cli(matches, "send_to")
        && let Some(destination) = config.send_to.as_deref()
    {
        args.send_to = ensure_destination(destination, "send_to")?;
    }
    if !is_cli(matches, "listen_to")
        && let Some(destination) = config.listen_to.as_deref()
    {
        args.listen_to = ensure_destination(destination, "listen_to")?;
    }
    if !is_cli(matches, "delivery_mode")
        && let Some(mode) = config.delivery_mode
    {
        args.delivery_mode = mode;
    }
    if !is_cli(matches, "priority")
        && let Some(priority) = config.priority
    {
        args.priority = Priority::try_from(priority).map_err(|err| {
            AppError::config(ConfigError::InvalidField {
                field: "priority",
                source: err,
            })
        })?;
    }

    let cli_payload = is_cli(matches, "payload")
        || is_cli(matches, "payload_file")
        || is_cli(matches, "payload_size");
    if !cli_payload {
        if let Some(payload) = config.payload.clone() {
            args.payload = Some(payload);
        }
        if let Some(path) = config.payload_file.clone() {
            args.payload_file = Some(path);
        }
        if let Some(size) = config.payload_size {
            args.payload_size = Some(ensure_positive_usize(size, "payload_size")?);
        }
    }

    if !is_cli(matches, "echo")
        && let Some(echo) = config.echo
    {
        args.echo = echo;
    }
    if !is_cli(matches, "memory_queue_capacity")
        && let Some(capacity) = config.memory_queue_capacity
    {
        args.memory_queue_capacity = ensure_positive_usize(capacity, "memory_queue_capacity")?;
    }
    if !is_cli(matches, "output")
        && let Some(output) = config.output.clone()
    {
        args.output = Some(output);
    }
    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = Some(format);
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn apply_millis(
    matches: &ArgMatches,
    name: &str,
    value: Option<&DurationValue>,
    target: &mut u64,
) -> AppResult<()> {
    if is_cli(matches, name) {
        return Ok(());
    }
    if let Some(value) = value {
        *target = value.to_millis().map_err(AppError::config)?;
    }
    Ok(())
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_destination(value: &str, field: &'static str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::config(ConfigError::InvalidField {
            field,
            source: ValidationError::DestinationEmpty,
        }));
    }
    Ok(trimmed.to_owned())
}

fn ensure_single_payload_source(config: &ConfigFile) -> AppResult<()> {
    if config.payload.is_some() && config.payload_file.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "payload",
            right: "payload_file",
        }));
    }
    if config.payload.is_some() && config.payload_size.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "payload",
            right: "payload_size",
        }));
    }
    if config.payload_file.is_some() && config.payload_size.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "payload_file",
            right: "payload_size",
        }));
    }
    Ok(())
}
