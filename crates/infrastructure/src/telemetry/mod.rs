//! Logging infrastructure
//!
//! Initializes the global `tracing` subscriber: an `EnvFilter` (from
//! `RUST_LOG`, falling back to the configured directives) and a fmt layer
//! emitting either human-readable text or structured JSON.

mod subscriber;

pub use subscriber::{TelemetryError, build_filter, init_telemetry};
