use thiserror::Error;

/// The errors the engine can report to its host.
#[derive(Error, Debug)]
pub enum AudaxError {
    /// The document could not be read as XML at all.
    #[error("Failed to parse GPX document: {0}")]
    Parse(String),

    /// Fewer than two usable track points remained after filtering.
    #[error("Insufficient track data: found {found} valid track point(s), at least 2 are required")]
    InsufficientData { found: usize },

    /// A distance, interval or similar argument was negative or not finite.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The export could not be written.
    #[error("Failed to write schedule: {0}")]
    Io(#[from] std::io::Error),

    /// A clock time could not be rendered.
    #[error("Failed to format time: {0}")]
    Format(#[from] time::error::Format),
}

pub type Result<T> = std::result::Result<T, AudaxError>;

/// Returns `value` if it is a finite, non-negative number, otherwise an
/// `InvalidInput` error naming `what`.
pub(crate) fn require_distance(what: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AudaxError::InvalidInput(format!(
            "{what} must be a finite, non-negative number of km, got {value}"
        )))
    }
}
