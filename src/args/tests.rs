use clap::Parser;

use super::*;
use crate::error::{AppError, AppResult};

#[test]
fn parse_args_defaults() -> AppResult<()> {
    let args = LoadArgs::try_parse_from(["mqstress"])
        .map_err(|err| AppError::validation(format!("Expected parse success: {}", err)))?;

    if args.transport != TransportKind::Memory {
        return Err(AppError::validation("Expected TransportKind::Memory"));
    }
    if args.senders != 1 || args.listeners != 1 || args.messages_per_sender != 100 {
        return Err(AppError::validation("Unexpected worker defaults"));
    }
    if args.max_outstanding.is_some() {
        return Err(AppError::validation("Expected unbounded max_outstanding"));
    }
    if args.send_to != DEFAULT_DESTINATION || args.listen_to != DEFAULT_DESTINATION {
        return Err(AppError::validation("Unexpected default destinations"));
    }
    if args.priority.get() != 4 {
        return Err(AppError::validation("Unexpected default priority"));
    }
    if args.listener_settle_ms != 2000 || args.progress_interval_ms != 1000 {
        return Err(AppError::validation("Unexpected timing defaults"));
    }
    if args.memory_queue_capacity.get() != 10_000 {
        return Err(AppError::validation("Unexpected memory queue capacity"));
    }
    if args.echo {
        return Err(AppError::validation("Echo should default to off"));
    }
    Ok(())
}

#[test]
fn parse_args_worker_counts_and_targets() -> AppResult<()> {
    let args = LoadArgs::try_parse_from([
        "mqstress",
        "--senders",
        "3",
        "--listeners",
        "2",
        "--messages-per-sender",
        "50",
        "--receive-target",
        "75",
        "--max-outstanding",
        "5",
    ])
    .map_err(|err| AppError::validation(format!("Expected Ok, got Err: {}", err)))?;

    if args.senders != 3 || args.listeners != 2 || args.messages_per_sender != 50 {
        return Err(AppError::validation("Unexpected worker counts"));
    }
    if args.receive_target != Some(75) {
        return Err(AppError::validation("Unexpected receive_target"));
    }
    if args.max_outstanding != Some(5) {
        return Err(AppError::validation("Unexpected max_outstanding"));
    }
    Ok(())
}

#[test]
fn parse_args_delivery_options() -> AppResult<()> {
    let args = LoadArgs::try_parse_from([
        "mqstress",
        "--delivery-mode",
        "NON-PERSISTENT",
        "--priority",
        "9",
        "--time-to-live-ms",
        "1500",
    ])
    .map_err(|err| AppError::validation(format!("Expected Ok, got Err: {}", err)))?;

    if args.delivery_mode != DeliveryMode::NonPersistent {
        return Err(AppError::validation("Expected DeliveryMode::NonPersistent"));
    }
    if args.priority.get() != 9 {
        return Err(AppError::validation("Unexpected priority"));
    }
    if args.time_to_live_ms != 1500 {
        return Err(AppError::validation("Unexpected time_to_live_ms"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_priority_out_of_range() -> AppResult<()> {
    if LoadArgs::try_parse_from(["mqstress", "--priority", "10"]).is_ok() {
        return Err(AppError::validation("Expected priority 10 to be rejected"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_empty_destination() -> AppResult<()> {
    if LoadArgs::try_parse_from(["mqstress", "--send-to", "  "]).is_ok() {
        return Err(AppError::validation("Expected empty destination to be rejected"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_conflicting_payload_sources() -> AppResult<()> {
    if LoadArgs::try_parse_from(["mqstress", "--payload", "hi", "--payload-size", "8"]).is_ok() {
        return Err(AppError::validation("Expected payload conflict"));
    }
    if LoadArgs::try_parse_from(["mqstress", "--payload-file", "a.txt", "--payload-size", "8"])
        .is_ok()
    {
        return Err(AppError::validation("Expected payload conflict"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_payload_size() -> AppResult<()> {
    if LoadArgs::try_parse_from(["mqstress", "--payload-size", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero payload size to be rejected"));
    }
    Ok(())
}

#[test]
fn parse_args_echo_flag_without_value() -> AppResult<()> {
    let args = LoadArgs::try_parse_from(["mqstress", "--echo", "--listen-to", "queue://replies"])
        .map_err(|err| AppError::validation(format!("Expected Ok, got Err: {}", err)))?;
    if !args.echo {
        return Err(AppError::validation("Expected echo enabled"));
    }
    if args.listen_to != "queue://replies" {
        return Err(AppError::validation("Unexpected listen_to"));
    }
    Ok(())
}

#[test]
fn parse_args_output_format() -> AppResult<()> {
    let args = LoadArgs::try_parse_from(["mqstress", "--output-format", "JSON"])
        .map_err(|err| AppError::validation(format!("Expected Ok, got Err: {}", err)))?;
    if args.output_format != Some(OutputFormat::Json) {
        return Err(AppError::validation("Expected OutputFormat::Json"));
    }
    Ok(())
}

#[test]
fn delivery_mode_from_str_accepts_variants() -> AppResult<()> {
    let mode: DeliveryMode = "non_persistent".parse()?;
    if mode != DeliveryMode::NonPersistent {
        return Err(AppError::validation("Expected DeliveryMode::NonPersistent"));
    }
    if "sometimes".parse::<DeliveryMode>().is_ok() {
        return Err(AppError::validation("Expected invalid delivery mode"));
    }
    Ok(())
}

#[test]
fn parse_bool_env_values() -> AppResult<()> {
    if !parsers::parse_bool_env("Yes")? || parsers::parse_bool_env("off")? {
        return Err(AppError::validation("Unexpected boolean parse"));
    }
    if parsers::parse_bool_env("maybe").is_ok() {
        return Err(AppError::validation("Expected invalid boolean"));
    }
    Ok(())
}
