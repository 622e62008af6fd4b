//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, granule (including GDAL) and config errors, and provides semantic
//! variants for parameter validation and writer failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Granule error: {0}")]
    Granule(#[from] crate::io::HlsError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }
}
