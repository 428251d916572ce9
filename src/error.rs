use std::error::Error;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type DynError = Box<dyn Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, CorrelatorError>;

/// Failures that abort a correlation run.
///
/// Running out of input is not listed here: a short read ends the stream
/// normally and is reported through the run summary instead.
#[derive(Error, Debug)]
pub enum CorrelatorError {
    /// An input or output stream could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    /// The center frequency side file is missing a usable number.
    #[error("failed to read center frequency from {}: {reason}", path.display())]
    CenterFrequency { path: PathBuf, reason: String },

    /// Framing or integration parameters are out of range.
    #[error("invalid correlator configuration: {0}")]
    InvalidConfig(String),

    /// A buffer handed to the spectral transform has the wrong length.
    #[error("buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
