use super::types::{PositiveUsize, Priority};
use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(super) fn parse_priority(s: &str) -> AppResult<Priority> {
    s.parse::<Priority>().map_err(AppError::from)
}

pub(super) fn parse_destination(s: &str) -> AppResult<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(ValidationError::DestinationEmpty));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}
