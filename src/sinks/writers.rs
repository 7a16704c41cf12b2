use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::args::OutputFormat;
use crate::domain::run::OutputSettings;
use crate::error::{AppError, AppResult, SinkError};

use super::render::render_report;
use super::report::ResultReport;

/// Destination of the final result report.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Writes one finished report.
    ///
    /// # Errors
    ///
    /// Returns an error when the report cannot be rendered or written.
    async fn write_report(&self, report: &ResultReport) -> AppResult<()>;
}

/// Renders the report in one format to stdout or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSink {
    format: OutputFormat,
    path: Option<PathBuf>,
}

impl ReportSink {
    #[must_use]
    pub const fn new(format: OutputFormat, path: Option<PathBuf>) -> Self {
        Self { format, path }
    }

    #[must_use]
    pub fn from_settings(settings: &OutputSettings) -> Self {
        Self::new(settings.format, settings.path.clone())
    }
}

#[async_trait]
impl ResultSink for ReportSink {
    async fn write_report(&self, report: &ResultReport) -> AppResult<()> {
        if self.format == OutputFormat::Quiet {
            return Ok(());
        }
        let output = render_report(report, self.format)?;
        match self.path.as_ref() {
            Some(path) => tokio::fs::write(path, output).await.map_err(|err| {
                AppError::sink(SinkError::WriteFile {
                    path: path.clone(),
                    source: err,
                })
            }),
            None => {
                let mut stdout = tokio::io::stdout();
                stdout
                    .write_all(output.as_bytes())
                    .await
                    .map_err(|err| AppError::sink(SinkError::WriteStdout { source: err }))?;
                stdout
                    .flush()
                    .await
                    .map_err(|err| AppError::sink(SinkError::WriteStdout { source: err }))
            }
        }
    }
}
