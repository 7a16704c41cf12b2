//! Core library for the `mqstress` CLI.
//!
//! `mqstress` drives senders and listeners against a message destination,
//! bounds the number of in-flight messages, tracks distinct deliveries, and
//! reports throughput per role. The binary is a thin wrapper around
//! [`entry::run`]; library APIs may evolve as the CLI grows.
pub mod app;
pub mod args;
pub mod config;
pub mod domain;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod shutdown;
pub mod sinks;
pub mod system;
pub mod traffic;
pub mod transport;
