//! Softmax and its Jacobian-vector product.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::Result;
use crate::error::check_len;

/// Numerically stable softmax: `output[i] = exp(input[i] - max) / sum_j exp(input[j] - max)`.
///
/// `output` is overwritten. An empty input is a no-op.
pub fn softmax(input: &[f32], output: &mut [f32]) -> Result<()> {
    check_len("output", output.len(), input.len())?;
    if input.is_empty() {
        return Ok(());
    }

    #[cfg(feature = "parallel")]
    {
        let max = input
            .par_iter()
            .copied()
            .reduce(|| f32::NEG_INFINITY, f32::max);
        output
            .par_iter_mut()
            .zip(input.par_iter())
            .for_each(|(o, &x)| *o = (x - max).exp());
        let sum: f32 = output.par_iter().sum();
        let inv_sum = 1.0 / sum;
        output.par_iter_mut().for_each(|o| *o *= inv_sum);
    }

    #[cfg(not(feature = "parallel"))]
    {
        let max = input.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0_f32;
        for (o, &x) in output.iter_mut().zip(input) {
            *o = (x - max).exp();
            sum += *o;
        }
        let inv_sum = 1.0 / sum;
        for o in output.iter_mut() {
            *o *= inv_sum;
        }
    }

    Ok(())
}

/// Backward pass of [`softmax`].
///
/// Given the softmax output `s` and upstream gradient `dy`, writes
/// `dx[i] = s[i] * (dy[i] - sum_j dy[j] * s[j])`, which is
/// `s[i] * sum_j dy[j] * (delta_ij - s[j])` with the Kronecker term pulled out.
pub fn softmax_backward(softmax_out: &[f32], d_y: &[f32], d_x: &mut [f32]) -> Result<()> {
    let n = softmax_out.len();
    check_len("d_y", d_y.len(), n)?;
    check_len("d_x", d_x.len(), n)?;

    let dot = softmax_out
        .iter()
        .zip(d_y)
        .fold(0.0_f32, |acc, (&s, &g)| s.mul_add(g, acc));

    for ((dx, &s), &g) in d_x.iter_mut().zip(softmax_out).zip(d_y) {
        *dx = s * (g - dot);
    }
    Ok(())
}
