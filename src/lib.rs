//! Process-wide structured logging with HTTP round-trip tracing.
//!
//! One JSON record per call, shaped as
//! `{"level", "time", "msg", "caller", <tag>: <value>, ...}`, written to a
//! sink resolved once at startup from two environment variables:
//!
//! - `LOG_LEVEL` — `debug` | `info` | `error` (case-insensitive, trimmed;
//!   anything else means `info`)
//! - `LOG_OUTPUT` — `stdout`, `stderr`, or a file path (blank means
//!   `stdout`)
//!
//! ```no_run
//! use serde_json::json;
//!
//! let log = svclog::global();
//! log.info("order stored", &["id", "shard"], &[json!(42), json!("eu-1")]);
//! ```
//!
//! The logger also satisfies two capability traits for injection into an
//! HTTP transport: [`trace::Printer`] and [`trace::TransportTracer`], the
//! latter consumed by [`clients::elastic::ElasticTransport`].

/// Traced HTTP transports built on the tracing capability.
pub mod clients;
/// Environment-resolved configuration and severity levels.
pub mod config;
/// The crate error model.
pub mod error;
/// The logger itself and the process-wide instance.
pub mod logger;
/// Record assembly: tag pairing and JSON encoding.
pub mod record;
/// Output destinations.
pub mod sink;
/// The printer and HTTP round-trip tracing capabilities.
pub mod trace;

pub use config::{Config, Level};
pub use error::LogError;
pub use logger::{global, init, try_global, Logger};
pub use sink::{BufferHandle, Sink};
pub use trace::{Printer, TransportResponse, TransportTracer};
