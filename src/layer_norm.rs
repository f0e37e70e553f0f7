//! Layer normalization over the rows of an `m×n` row-major matrix.
//!
//! Each row is standardized with its own mean and biased (population) variance,
//! then rescaled per feature: `y = gamma * (x - mean) / sqrt(var + eps) + beta`.

use crate::Result;
use crate::error::{check_len, check_shape};

#[derive(Debug, Clone, Copy)]
struct RowStats {
    mean: f32,
    /// `var + eps`
    var_eps: f32,
    inv_std: f32,
}

#[inline]
fn row_stats(row: &[f32], eps: f32) -> RowStats {
    let inv_n = 1.0 / row.len() as f32;
    let mean = row.iter().sum::<f32>() * inv_n;
    let var = row
        .iter()
        .fold(0.0_f32, |acc, &x| (x - mean).mul_add(x - mean, acc))
        * inv_n;
    let var_eps = var + eps;
    RowStats {
        mean,
        var_eps,
        inv_std: 1.0 / var_eps.sqrt(),
    }
}

/// Forward layer normalization.
///
/// Shapes: `input`/`output` are `m×n`, `gamma`/`beta` are `n`. `output` is overwritten.
pub fn layer_norm(
    input: &[f32],
    gamma: &[f32],
    beta: &[f32],
    output: &mut [f32],
    m: usize,
    n: usize,
    eps: f32,
) -> Result<()> {
    check_shape("input", input.len(), m, n)?;
    check_shape("output", output.len(), m, n)?;
    check_len("gamma", gamma.len(), n)?;
    check_len("beta", beta.len(), n)?;
    if n == 0 {
        return Ok(());
    }

    for (x_row, y_row) in input.chunks(n).zip(output.chunks_mut(n)) {
        let stats = row_stats(x_row, eps);
        for j in 0..n {
            let x_hat = (x_row[j] - stats.mean) * stats.inv_std;
            y_row[j] = gamma[j].mul_add(x_hat, beta[j]);
        }
    }
    Ok(())
}

/// Gradients of [`layer_norm`] given the upstream gradient `d_y`.
///
/// Per row, with `g = gamma * dy` and `sigma = sqrt(var + eps)`:
///
/// `dx = (g - sum(g) / n - (x - mean) * sum(g * (x - mean)) / (n * (var + eps))) / sigma`
///
/// `d_gamma[j] = sum over rows of dy * x_hat` and `d_beta[j] = sum over rows of dy`.
/// `d_x`, `d_gamma` and `d_beta` are all overwritten. The normalized input is
/// recomputed from `x`, so the forward output is not needed.
#[allow(clippy::too_many_arguments)]
pub fn layer_norm_backward(
    x: &[f32],
    gamma: &[f32],
    d_y: &[f32],
    d_x: &mut [f32],
    d_gamma: &mut [f32],
    d_beta: &mut [f32],
    m: usize,
    n: usize,
    eps: f32,
) -> Result<()> {
    check_shape("x", x.len(), m, n)?;
    check_shape("d_y", d_y.len(), m, n)?;
    check_shape("d_x", d_x.len(), m, n)?;
    check_len("gamma", gamma.len(), n)?;
    check_len("d_gamma", d_gamma.len(), n)?;
    check_len("d_beta", d_beta.len(), n)?;

    d_gamma.fill(0.0);
    d_beta.fill(0.0);
    if n == 0 {
        return Ok(());
    }

    let inv_n = 1.0 / n as f32;
    for ((x_row, dy_row), dx_row) in x.chunks(n).zip(d_y.chunks(n)).zip(d_x.chunks_mut(n)) {
        let stats = row_stats(x_row, eps);

        let mut sum_g = 0.0_f32;
        let mut sum_g_xmu = 0.0_f32;
        for j in 0..n {
            let x_mu = x_row[j] - stats.mean;
            let g = gamma[j] * dy_row[j];
            sum_g += g;
            sum_g_xmu = g.mul_add(x_mu, sum_g_xmu);

            d_gamma[j] = dy_row[j].mul_add(x_mu * stats.inv_std, d_gamma[j]);
            d_beta[j] += dy_row[j];
        }

        let mean_g = sum_g * inv_n;
        let var_term = sum_g_xmu * inv_n / stats.var_eps;
        for j in 0..n {
            let x_mu = x_row[j] - stats.mean;
            let g = gamma[j] * dy_row[j];
            dx_row[j] = (g - mean_g - x_mu * var_term) * stats.inv_std;
        }
    }
    Ok(())
}
