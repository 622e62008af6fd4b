use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid browse size: {size}. Must be a positive integer or 'original'")]
    InvalidSize { size: String },

    #[error("Browse size must be greater than 0, got: {size}")]
    ZeroSize { size: usize },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Batch finished with {errors} failed granule(s)")]
    BatchFailures { errors: usize },

    #[error(transparent)]
    Library(#[from] hls_vi::Error),
}
