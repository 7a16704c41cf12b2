use clap::Parser;

use super::defaults::{
    DEFAULT_DESTINATION, DEFAULT_LISTENER_SETTLE_MS, DEFAULT_MEMORY_QUEUE_CAPACITY,
    DEFAULT_PROGRESS_INTERVAL_MS,
};
use super::parsers::{parse_bool_env, parse_destination, parse_positive_usize, parse_priority};
use super::types::{DeliveryMode, OutputFormat, PositiveUsize, Priority, TransportKind};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async load tester for message-oriented middleware - bounded in-flight messages, distinct delivery tracking, and throughput windows per sender and listener."
)]
pub struct LoadArgs {
    /// Transport adapter used by every worker
    #[arg(long, default_value = "memory", ignore_case = true, env = "MQSTRESS_TRANSPORT")]
    pub transport: TransportKind,

    /// Number of sender workers
    #[arg(long, short = 's', default_value = "1")]
    pub senders: usize,

    /// Number of listener workers
    #[arg(long, short = 'l', default_value = "1")]
    pub listeners: usize,

    /// Messages each sender produces
    #[arg(long = "messages-per-sender", short = 'm', default_value = "100")]
    pub messages_per_sender: u64,

    /// Messages each listener is expected to receive (defaults to the total send target)
    #[arg(long = "messages-per-listener")]
    pub messages_per_listener: Option<u64>,

    /// Override the total send target (defaults to senders x messages-per-sender)
    #[arg(long = "send-target")]
    pub send_target: Option<u64>,

    /// Override the total receive target
    #[arg(long = "receive-target")]
    pub receive_target: Option<u64>,

    /// Delay between sender spawns in milliseconds (0 disables)
    #[arg(long = "sender-rampup-ms", default_value = "0")]
    pub sender_rampup_ms: u64,

    /// Delay between listener spawns in milliseconds (0 disables)
    #[arg(long = "listener-rampup-ms", default_value = "0")]
    pub listener_rampup_ms: u64,

    /// Pause after the last listener starts, before any sender starts, in milliseconds
    #[arg(long = "listener-settle-ms", default_value = DEFAULT_LISTENER_SETTLE_MS)]
    pub listener_settle_ms: u64,

    /// Interval between progress lines in milliseconds (0 only yields)
    #[arg(long = "progress-interval-ms", default_value = DEFAULT_PROGRESS_INTERVAL_MS)]
    pub progress_interval_ms: u64,

    /// Maximum sent-but-unacknowledged messages across all senders (0 disables sending, unset means unbounded)
    #[arg(long = "max-outstanding")]
    pub max_outstanding: Option<u64>,

    /// Destination senders publish to (queue://name, topic://name, or a bare queue name)
    #[arg(long = "send-to", default_value = DEFAULT_DESTINATION, value_parser = parse_destination)]
    pub send_to: String,

    /// Destination listeners consume from
    #[arg(long = "listen-to", default_value = DEFAULT_DESTINATION, value_parser = parse_destination)]
    pub listen_to: String,

    /// Delivery mode set on every produced message
    #[arg(long = "delivery-mode", default_value = "persistent", ignore_case = true)]
    pub delivery_mode: DeliveryMode,

    /// Message priority (0-9)
    #[arg(long, default_value = "4", value_parser = parse_priority)]
    pub priority: Priority,

    /// Message time-to-live in milliseconds (0 never expires)
    #[arg(long = "time-to-live-ms", default_value = "0")]
    pub time_to_live_ms: u64,

    /// Static text payload
    #[arg(long, conflicts_with_all = ["payload_file", "payload_size"])]
    pub payload: Option<String>,

    /// Payload read from a file
    #[arg(long = "payload-file", conflicts_with = "payload_size")]
    pub payload_file: Option<String>,

    /// Random alphanumeric payload of this many bytes
    #[arg(long = "payload-size", value_parser = parse_positive_usize)]
    pub payload_size: Option<PositiveUsize>,

    /// Run an in-process responder that republishes send-to traffic onto listen-to
    #[arg(
        long,
        env = "MQSTRESS_ECHO",
        default_value = "false",
        value_parser = parse_bool_env,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub echo: bool,

    /// Bounded depth of in-memory queue destinations
    #[arg(long = "memory-queue-capacity", default_value = DEFAULT_MEMORY_QUEUE_CAPACITY, value_parser = parse_positive_usize)]
    pub memory_queue_capacity: PositiveUsize,

    /// Write the result report to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Result report format (text, json, csv, quiet); inferred from the --output extension when omitted
    #[arg(long = "output-format", ignore_case = true)]
    pub output_format: Option<OutputFormat>,

    /// Path to config file (TOML/JSON). Defaults to ./mqstress.toml or ./mqstress.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by MQSTRESS_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
