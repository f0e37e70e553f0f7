use std::collections::TryReserveError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// The network has no topology (never resized, or deleted).
    #[error("network has no topology; call resize first")]
    EmptyNetwork,
    #[error("buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Checks that a caller-supplied buffer has the length its declared shape implies.
#[inline]
pub(crate) fn check_len(name: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::InvalidShape(format!(
            "{name} len {actual} does not match expected len {expected}"
        )));
    }
    Ok(())
}

/// Like [`check_len`] for a `rows×cols` buffer. A product that overflows `usize`
/// is reported as a shape error rather than wrapping.
#[inline]
pub(crate) fn check_shape(name: &str, actual: usize, rows: usize, cols: usize) -> Result<()> {
    let expected = rows.checked_mul(cols).ok_or_else(|| {
        Error::InvalidShape(format!("{name} shape {rows}x{cols} overflows usize"))
    })?;
    check_len(name, actual, expected)
}
