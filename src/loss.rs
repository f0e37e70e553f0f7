//! Loss functions.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::Result;
use crate::error::check_len;

/// Mean squared error (MSE) loss.
///
/// Returns `sum((output - target)^2) / n`, or `0` for empty inputs.
///
/// With the `parallel` feature the sum is a rayon reduction (private partial sums
/// merged), so the result may differ from the sequential one in the last bits.
pub fn mse(output: &[f32], target: &[f32]) -> Result<f32> {
    check_len("target", target.len(), output.len())?;

    if output.is_empty() {
        return Ok(0.0);
    }

    #[cfg(feature = "parallel")]
    let sum_sq: f32 = output
        .par_iter()
        .zip(target.par_iter())
        .map(|(&o, &t)| {
            let diff = o - t;
            diff * diff
        })
        .sum();

    #[cfg(not(feature = "parallel"))]
    let sum_sq = output.iter().zip(target).fold(0.0_f32, |acc, (&o, &t)| {
        let diff = o - t;
        diff.mul_add(diff, acc)
    });

    Ok(sum_sq / output.len() as f32)
}
