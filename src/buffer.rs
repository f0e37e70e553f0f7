//! Fallible buffer allocation.
//!
//! Every parameter, activation and delta buffer in the crate is created here so
//! that an allocation failure surfaces as [`Error::Allocation`](crate::Error)
//! instead of aborting the process.

use crate::Result;

/// Allocate a zero-filled buffer of exactly `len` scalars.
pub(crate) fn zeroed(len: usize) -> Result<Vec<f32>> {
    let mut buf = Vec::new();
    if let Err(err) = buf.try_reserve_exact(len) {
        tracing::warn!(len, "failed to allocate f32 buffer");
        return Err(err.into());
    }
    buf.resize(len, 0.0);
    Ok(buf)
}
