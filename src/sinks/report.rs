use std::fmt;

use super::format::format_x100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportValue {
    Count(u64),
    /// Fixed-point value with two decimals, stored as value x100.
    Decimal(u64),
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Count(value) => write!(f, "{}", value),
            ReportValue::Decimal(value_x100) => f.write_str(&format_x100(*value_x100)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Machine-readable key used by JSON and CSV output.
    pub key: &'static str,
    /// Human-readable label used by text output.
    pub label: &'static str,
    pub value: ReportValue,
}

/// Ordered key/value metrics of one finished run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultReport {
    entries: Vec<ReportEntry>,
}

impl ResultReport {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, key: &'static str, label: &'static str, value: ReportValue) {
        self.entries.push(ReportEntry { key, label, value });
    }

    pub fn count(&mut self, key: &'static str, label: &'static str, value: u64) {
        self.push(key, label, ReportValue::Count(value));
    }

    pub fn decimal(&mut self, key: &'static str, label: &'static str, value_x100: u64) {
        self.push(key, label, ReportValue::Decimal(value_x100));
    }

    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<ReportValue> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value)
    }
}
