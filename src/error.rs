use thiserror::Error;

/// Crate-wide error model.
///
/// Construction of the logger is the only fallible surface; once a logger
/// exists, logging calls never return errors to the caller.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to open log output '{path}': {source}")]
    OpenSink {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
