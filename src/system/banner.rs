use chrono::{Local, SecondsFormat};
use tracing::info;

use crate::domain::run::RunConfig;

/// Logs what the run is about to do, before any worker starts.
pub(crate) fn log_run_plan(config: &RunConfig) {
    info!(
        "mqstress v{} | {} transport | {}",
        env!("CARGO_PKG_VERSION"),
        config.transport.as_str(),
        env!("CARGO_PKG_LICENSE")
    );
    info!(
        "Run started at {}",
        Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
    );

    match config.messages_per_listener {
        Some(per_listener) => info!(
            "Creating {} listeners on [{}], each waiting for {} messages",
            config.listeners, config.listen_to, per_listener
        ),
        None => info!(
            "Creating {} listeners on [{}]",
            config.listeners, config.listen_to
        ),
    }
    info!("Waiting for {} messages in total", config.receive_target);
    info!(
        "Listener ramp up: {} ms, settle: {} ms",
        config.listener_rampup.as_millis(),
        config.listener_settle.as_millis()
    );
    info!(
        "Printing progress every {} ms",
        config.progress_interval.as_millis()
    );

    info!(
        "Creating {} senders on [{}], each sending {} messages",
        config.senders, config.send_to, config.messages_per_sender
    );
    info!("Sending {} messages in total", config.send_target);
    info!("Sender ramp up: {} ms", config.sender_rampup.as_millis());
    match config.max_outstanding {
        Some(0) => info!("Max outstanding is 0: sending is disabled until shutdown"),
        Some(limit) => info!("At most {} unacknowledged messages in flight", limit),
        None => info!("Outstanding messages are not bounded"),
    }
    if config.echo {
        info!(
            "Echo responder relays [{}] to [{}]",
            config.send_to, config.listen_to
        );
    }
}
