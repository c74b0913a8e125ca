pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_OUTPUT: &str = "LOG_OUTPUT";

const DEFAULT_OUTPUT: &str = "stdout";

/// Minimum severity a record needs to be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Error,
}

impl Level {
    /// Parse a level name, case-insensitive and whitespace-trimmed.
    /// Anything unrecognized (including empty) falls back to `Info`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Level::Debug,
            "error" => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Error => "error",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logger configuration, resolved once at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    pub level: Level,
    /// Destination identifier: `stdout`, `stderr`, or a file path.
    pub output: String,
    /// Flush the sink after every record. On by default; turning it off
    /// trades durability of the last records for fewer syscalls.
    pub flush_per_record: bool,
}

impl Config {
    /// Resolve from `LOG_LEVEL` / `LOG_OUTPUT`, with defaults `info` and
    /// `stdout`.
    pub fn from_env() -> Self {
        let level = Level::parse(&std::env::var(ENV_LOG_LEVEL).unwrap_or_default());
        let output = std::env::var(ENV_LOG_OUTPUT).unwrap_or_default();
        let output = output.trim();
        Self {
            level,
            output: if output.is_empty() {
                DEFAULT_OUTPUT.to_string()
            } else {
                output.to_string()
            },
            flush_per_record: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: Level::Info,
            output: DEFAULT_OUTPUT.to_string(),
            flush_per_record: true,
        }
    }
}
