//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::LoadArgs;
pub use types::{DeliveryMode, OutputFormat, PositiveUsize, Priority, TransportKind};

pub(crate) use defaults::{DEFAULT_CONFIG_FILES, DEFAULT_DESTINATION};
