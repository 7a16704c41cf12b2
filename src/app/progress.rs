use tracing::info;

use crate::domain::run::RunConfig;
use crate::metrics::TrackerSnapshot;
use crate::sinks::ReportValue;

pub(crate) fn sender_progress(config: &RunConfig, snapshot: &TrackerSnapshot) -> Option<String> {
    if config.send_target == 0 {
        return None;
    }
    let sent = &snapshot.sent;
    Some(format!(
        "[SENDER] {} of {} messages sent so far to [{}] => {} msg/s, {} msg/ms",
        sent.total,
        sent.target,
        config.send_to,
        ReportValue::Decimal(sent.per_sec_x100()),
        ReportValue::Decimal(sent.per_ms_x100())
    ))
}

pub(crate) fn listener_progress(config: &RunConfig, snapshot: &TrackerSnapshot) -> Option<String> {
    if config.receive_target == 0 {
        return None;
    }
    let received = &snapshot.received;
    Some(format!(
        "[LISTENER] received {} of {} expected messages on [{}], {} msg/s, {} msg/ms",
        received.total,
        received.target,
        config.listen_to,
        ReportValue::Decimal(received.per_sec_x100()),
        ReportValue::Decimal(received.per_ms_x100())
    ))
}

pub(crate) fn log_progress(config: &RunConfig, snapshot: &TrackerSnapshot) {
    if let Some(line) = sender_progress(config, snapshot) {
        info!("{}", line);
    }
    if let Some(line) = listener_progress(config, snapshot) {
        info!("{}", line);
    }
}
