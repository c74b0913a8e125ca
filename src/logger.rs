use std::error::Error as StdError;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::config::{Config, Level};
use crate::error::LogError;
use crate::record;
use crate::sink::Sink;

struct Inner {
    config: Config,
    sink: Sink,
    flush_failures: AtomicU64,
}

/// Process-wide structured logger.
///
/// Immutable after construction and cheap to clone; safe to share across
/// arbitrarily many threads. Each call emits one JSON record and, by
/// default, flushes the sink before returning. Write and flush failures are
/// never surfaced to the caller; they only move the
/// [`flush_failures`](Self::flush_failures) counter.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    pub fn new(config: Config, sink: Sink) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                sink,
                flush_failures: AtomicU64::new(0),
            }),
        }
    }

    /// Build from `LOG_LEVEL` / `LOG_OUTPUT`.
    pub fn from_env() -> Result<Self, LogError> {
        let config = Config::from_env();
        let sink = Sink::open(&config.output)?;
        Ok(Self::new(config, sink))
    }

    pub fn level(&self) -> Level {
        self.inner.config.level
    }

    /// Emit one info record with positionally paired tags.
    ///
    /// Tag values pair with `tag_names` up to the shorter list; the excess
    /// of the longer list is dropped.
    #[track_caller]
    pub fn info(&self, msg: &str, tag_names: &[&str], tag_values: &[Value]) {
        self.emit(
            Level::Info,
            msg,
            record::pair_tags(tag_names, tag_values),
            Location::caller(),
        );
    }

    /// Emit one debug record with positionally paired tags.
    #[track_caller]
    pub fn debug(&self, msg: &str, tag_names: &[&str], tag_values: &[Value]) {
        self.emit(
            Level::Debug,
            msg,
            record::pair_tags(tag_names, tag_values),
            Location::caller(),
        );
    }

    /// Emit one error record with positionally paired tags.
    ///
    /// The error's rendering is appended to the value list before pairing,
    /// so it is emitted only when `tag_names` leaves room for it: one name
    /// past the caller's own values, conventionally `"error"`. An empty
    /// name list drops it along with everything else.
    #[track_caller]
    pub fn error(&self, msg: &str, err: &dyn StdError, tag_names: &[&str], tag_values: &[Value]) {
        let mut values = tag_values.to_vec();
        values.push(Value::String(err.to_string()));
        self.emit(
            Level::Error,
            msg,
            record::pair_tags(tag_names, &values),
            Location::caller(),
        );
    }

    /// Pair-based variant of [`info`](Self::info): every supplied pair is
    /// emitted, nothing is truncated.
    #[track_caller]
    pub fn info_with(&self, msg: &str, tags: &[(&str, Value)]) {
        self.emit(Level::Info, msg, owned_tags(tags), Location::caller());
    }

    /// Pair-based variant of [`debug`](Self::debug).
    #[track_caller]
    pub fn debug_with(&self, msg: &str, tags: &[(&str, Value)]) {
        self.emit(Level::Debug, msg, owned_tags(tags), Location::caller());
    }

    /// Pair-based variant of [`error`](Self::error): an `error` tag is
    /// always appended after the supplied pairs.
    #[track_caller]
    pub fn error_with(&self, msg: &str, err: &dyn StdError, tags: &[(&str, Value)]) {
        let mut tags = owned_tags(tags);
        tags.push(("error".to_string(), Value::String(err.to_string())));
        self.emit(Level::Error, msg, tags, Location::caller());
    }

    /// Write/flush failures observed so far. Failures are invisible to
    /// logging callers by contract; this counter is the only signal.
    pub fn flush_failures(&self) -> u64 {
        self.inner.flush_failures.load(Ordering::Relaxed)
    }

    fn emit(&self, level: Level, msg: &str, tags: Vec<(String, Value)>, caller: &Location<'_>) {
        if level < self.inner.config.level {
            return;
        }
        let line = record::encode(level, msg, caller, &tags);
        let flushed = self
            .inner
            .sink
            .write_record(line.as_bytes(), self.inner.config.flush_per_record);
        if flushed.is_err() {
            self.inner.flush_failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

fn owned_tags(tags: &[(&str, Value)]) -> Vec<(String, Value)> {
    tags.iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Install the process-wide logger from the environment.
///
/// Idempotent: the first successful call wins and later calls return the
/// existing instance. Startup should treat `Err` as fatal; there is no
/// degraded mode.
pub fn init() -> Result<&'static Logger, LogError> {
    if let Some(logger) = GLOBAL.get() {
        return Ok(logger);
    }
    let logger = Logger::from_env()?;
    Ok(GLOBAL.get_or_init(|| logger))
}

/// The process-wide logger, initializing from the environment on first use.
///
/// # Panics
///
/// If the logger cannot be constructed (unwritable `LOG_OUTPUT`). A process
/// that cannot open its log output does not start; call [`init`] from your
/// startup path to surface the error as a `Result` instead.
pub fn global() -> &'static Logger {
    if let Some(logger) = GLOBAL.get() {
        return logger;
    }
    match Logger::from_env() {
        Ok(logger) => GLOBAL.get_or_init(|| logger),
        Err(e) => panic!("svclog: failed to initialize global logger: {e}"),
    }
}

/// The process-wide logger, if one has been installed.
pub fn try_global() -> Option<&'static Logger> {
    GLOBAL.get()
}
