use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid delivery mode '{value}'. Use persistent or non-persistent.")]
    InvalidDeliveryMode { value: String },
    #[error("Invalid priority {value}. Priority must be between 0 and 9.")]
    PriorityOutOfRange { value: u8 },
    #[error("Destination name must not be empty.")]
    DestinationEmpty,
    #[error("Failed to read payload file '{path}': {source}")]
    ReadPayloadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("--echo requires different send and listen destinations.")]
    EchoRequiresDistinctDestinations,
    #[error("Runtime errors occurred.")]
    RuntimeErrors,
    #[error("Failed to build runtime: {source}")]
    RuntimeBuildFailed {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to send shutdown")]
    ShutdownSendFailed,
    #[error("Shutdown task join error: {source}")]
    ShutdownJoinFailed {
        #[source]
        source: tokio::task::JoinError,
    },
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
