//! Logging initialization
//!
//! Installs a `tracing` subscriber filtered by `RUST_LOG` or, when unset, by
//! the configured filter. Output is human-readable or JSON lines.

mod subscriber;

pub use subscriber::{TelemetryError, init_telemetry};
