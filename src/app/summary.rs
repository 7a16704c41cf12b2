use crate::metrics::SideSnapshot;
use crate::sinks::ResultReport;

use super::roster::WorkerRole;
use super::runner::RunOutcome;

/// Builds the final report: worker counts, totals, distinct ids, then per-role
/// durations and throughput, then gate and latency figures.
#[must_use]
pub fn build_report(outcome: &RunOutcome) -> ResultReport {
    let mut report = ResultReport::new();
    let sent = &outcome.tracker.sent;
    let received = &outcome.tracker.received;

    report.count(
        "listeners_started",
        "listeners started",
        count_u64(outcome.roster.count(WorkerRole::Listener)),
    );
    report.count(
        "senders_started",
        "senders started",
        count_u64(outcome.roster.count(WorkerRole::Sender)),
    );
    report.count(
        "expected_total_message_count",
        "expected total message count",
        received.target,
    );
    report.count(
        "expected_total_send_count",
        "expected total send count",
        sent.target,
    );
    report.count(
        "total_messages_received",
        "total messages received",
        received.total,
    );
    report.count("total_messages_sent", "total messages sent", sent.total);
    report.count(
        "missing_messages",
        "number of missing messages",
        received.missing(),
    );
    report.count(
        "distinct_received_ids",
        "unique message id count of all incoming messages",
        received.distinct,
    );
    report.count(
        "distinct_sent_ids",
        "unique message id count of all sent messages",
        sent.distinct,
    );

    push_role(&mut report, WorkerRole::Sender, sent);
    push_role(&mut report, WorkerRole::Listener, received);

    report.count(
        "peak_outstanding_messages",
        "peak outstanding messages",
        outcome.admission.peak_outstanding,
    );
    report.count(
        "unmatched_acknowledgments",
        "unmatched acknowledgments",
        outcome.admission.unmatched_acks,
    );
    report.count(
        "send_latency_p50_us",
        "send latency p50 (us)",
        outcome.send_latency.p50_us,
    );
    report.count(
        "send_latency_p90_us",
        "send latency p90 (us)",
        outcome.send_latency.p90_us,
    );
    report.count(
        "send_latency_p99_us",
        "send latency p99 (us)",
        outcome.send_latency.p99_us,
    );
    if let Some(echoed) = outcome.echoed {
        report.count("echoed_messages", "echoed messages", echoed);
    }
    report.count(
        "runtime_errors",
        "runtime errors",
        count_u64(outcome.runtime_errors.len()),
    );
    report
}

/// Keys and labels of one role's entries: duration in ns, ms, and sec, then
/// messages per sec and per ms.
type RoleEntries = [(&'static str, &'static str); 5];

const SENDER_ENTRIES: RoleEntries = [
    ("sender_duration_ns", "sender duration nanoseconds"),
    ("sender_duration_ms", "sender duration milliseconds"),
    ("sender_duration_sec", "sender duration sec"),
    ("sender_messages_per_sec", "sender messages / sec"),
    ("sender_messages_per_ms", "sender messages / milli sec"),
];

const LISTENER_ENTRIES: RoleEntries = [
    ("listener_duration_ns", "listener duration nanoseconds"),
    ("listener_duration_ms", "listener duration milliseconds"),
    ("listener_duration_sec", "listener duration sec"),
    ("listener_messages_per_sec", "listener messages / sec"),
    ("listener_messages_per_ms", "listener messages / milli sec"),
];

const fn role_entries(role: WorkerRole) -> &'static RoleEntries {
    match role {
        WorkerRole::Sender => &SENDER_ENTRIES,
        WorkerRole::Listener => &LISTENER_ENTRIES,
    }
}

fn push_role(report: &mut ResultReport, role: WorkerRole, side: &SideSnapshot) {
    let [nanos, millis, secs, per_sec, per_ms] = role_entries(role);
    report.count(nanos.0, nanos.1, side.elapsed_nanos());
    report.count(millis.0, millis.1, side.elapsed_millis());
    report.count(secs.0, secs.1, side.elapsed_secs());
    report.decimal(per_sec.0, per_sec.1, side.per_sec_x100());
    report.decimal(per_ms.0, per_ms.1, side.per_ms_x100());
}

fn count_u64(count: usize) -> u64 {
    u64::try_from(count).map_or(u64::MAX, |value| value)
}
