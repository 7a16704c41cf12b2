//! Result report model and the sinks that render it.
mod format;
mod render;
mod report;
mod writers;


pub use render::render_report;
pub use report::{ReportEntry, ReportValue, ResultReport};
pub use writers::{ReportSink, ResultSink};
