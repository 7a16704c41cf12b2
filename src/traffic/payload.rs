use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::error::{AppError, AppResult, ValidationError};
use crate::transport::Payload;

/// Random `[A-Za-z0-9]` body of exactly `size` bytes.
#[must_use]
pub fn random_alphanumeric(size: usize) -> Payload {
    let bytes: Vec<u8> = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(size)
        .collect();
    Arc::from(bytes)
}

/// Reads the whole file as the message body.
///
/// # Errors
///
/// Returns an error when the file cannot be read.
pub fn read_payload_file(path: &Path) -> AppResult<Payload> {
    let bytes = std::fs::read(path).map_err(|err| {
        AppError::validation(ValidationError::ReadPayloadFile {
            path: path.display().to_string(),
            source: err,
        })
    })?;
    Ok(Arc::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_payload_has_requested_size() -> Result<(), String> {
        let payload = random_alphanumeric(64);
        if payload.len() != 64 {
            return Err(format!("Unexpected payload size: {}", payload.len()));
        }
        if !payload.iter().all(u8::is_ascii_alphanumeric) {
            return Err("Payload should be alphanumeric".to_owned());
        }
        Ok(())
    }

    #[test]
    fn payload_file_is_read_verbatim() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("body.xml");
        std::fs::write(&path, "<order id=\"7\"/>").map_err(|err| format!("write failed: {}", err))?;

        let payload = read_payload_file(&path).map_err(|err| err.to_string())?;
        if payload.as_ref() != b"<order id=\"7\"/>" {
            return Err("Unexpected payload contents".to_owned());
        }
        if read_payload_file(&dir.path().join("missing.xml")).is_ok() {
            return Err("Expected missing file to fail".to_owned());
        }
        Ok(())
    }
}
