use crate::error::ConfigError;

/// Parses `<number><unit>` into milliseconds. Units are `ms`, `s`, `m`, `h`; a bare number is
/// read as milliseconds. Zero is accepted (disables ramp-ups and pacing).
pub(crate) fn parse_duration_millis(value: &str) -> Result<u64, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ConfigError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ConfigError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let multiplier: u64 = match unit_part.trim() {
        "" | "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        other => {
            return Err(ConfigError::InvalidDurationUnit {
                unit: other.to_owned(),
            });
        }
    };

    number
        .checked_mul(multiplier)
        .ok_or(ConfigError::DurationOverflow)
}
