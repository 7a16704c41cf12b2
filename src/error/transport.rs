use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid destination '{destination}': {reason}")]
    InvalidDestination {
        destination: String,
        reason: &'static str,
    },
    #[error("Could not send message to '{destination}': {reason}")]
    Send { destination: String, reason: String },
    #[error("Could not receive message from '{destination}': {reason}")]
    Receive { destination: String, reason: String },
    #[error("Session is closed.")]
    SessionClosed,
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

pub type TransportResult<T> = Result<T, TransportError>;
