//! Error types for minavi

use thiserror::Error;

/// Result type alias for minavi operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for minavi operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Writer used after finalization, or finalized twice
    #[error("State error: {0}")]
    State(String),
}
