use std::str::FromStr;

use serde_json::{Map, Number, Value};

use crate::args::OutputFormat;
use crate::error::{AppError, AppResult, SinkError};

use super::format::{format_x100, write_line};
use super::report::{ReportValue, ResultReport};

/// Renders the report in the requested format. `Quiet` renders nothing.
///
/// # Errors
///
/// Returns an error when the output cannot be formatted or serialized.
pub fn render_report(report: &ResultReport, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => render_json(report),
        OutputFormat::Csv => render_csv(report),
        OutputFormat::Quiet => Ok(String::new()),
    }
}

fn render_text(report: &ResultReport) -> AppResult<String> {
    let width = report
        .entries()
        .iter()
        .map(|entry| entry.label.len())
        .max()
        .unwrap_or(0);
    let mut output = String::new();
    write_line(&mut output, "Results")?;
    for entry in report.entries() {
        write_line(
            &mut output,
            &format!("{:<width$} : {}", entry.label, entry.value, width = width),
        )?;
    }
    Ok(output)
}

fn render_json(report: &ResultReport) -> AppResult<String> {
    let mut object = Map::new();
    for entry in report.entries() {
        let value = match entry.value {
            ReportValue::Count(value) => Value::from(value),
            ReportValue::Decimal(value_x100) => {
                let number = Number::from_str(&format_x100(value_x100))
                    .map_err(|err| AppError::sink(SinkError::SerializeJson { source: err }))?;
                Value::Number(number)
            }
        };
        object.insert(entry.key.to_owned(), value);
    }
    let mut json = serde_json::to_string_pretty(&Value::Object(object))
        .map_err(|err| AppError::sink(SinkError::SerializeJson { source: err }))?;
    json.push('\n');
    Ok(json)
}

fn render_csv(report: &ResultReport) -> AppResult<String> {
    let mut output = String::new();
    write_line(&mut output, "key,value")?;
    for entry in report.entries() {
        write_line(&mut output, &format!("{},{}", entry.key, entry.value))?;
    }
    Ok(output)
}
