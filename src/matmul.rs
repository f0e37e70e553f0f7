//! Matrix product, its gradient, and transpose over flat row-major buffers.
//!
//! All three public kernels funnel through one strided GEMM so that transposed
//! operands never need to be materialized:
//! - default: a simple, safe triple-loop implementation
//! - `parallel`: the same loop, split across output rows with rayon
//! - `matrixmultiply`: a faster backend for the product itself

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::Result;
use crate::error::check_shape;

/// `C[m×n] = A[m×k] · B[k×n]`, all row-major.
///
/// `c` is overwritten.
pub fn matmul(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize) -> Result<()> {
    check_shape("a", a.len(), m, k)?;
    check_shape("b", b.len(), k, n)?;
    check_shape("c", c.len(), m, n)?;

    gemm_f32(m, n, k, a, k, 1, b, n, 1, c);
    Ok(())
}

/// Gradients of `C = A · B` given the upstream gradient `dC`.
///
/// Writes `dA = dC · Bᵗ` (`m×k`) and `dB = Aᵗ · dC` (`k×n`); both are overwritten.
#[allow(clippy::too_many_arguments)]
pub fn matmul_backward(
    a: &[f32],
    b: &[f32],
    d_c: &[f32],
    d_a: &mut [f32],
    d_b: &mut [f32],
    m: usize,
    k: usize,
    n: usize,
) -> Result<()> {
    check_shape("a", a.len(), m, k)?;
    check_shape("b", b.len(), k, n)?;
    check_shape("d_c", d_c.len(), m, n)?;
    check_shape("d_a", d_a.len(), m, k)?;
    check_shape("d_b", d_b.len(), k, n)?;

    // dA[i, p] = sum_j dC[i, j] * B[p, j]; B read column-wise as Bᵗ.
    gemm_f32(m, k, n, d_c, n, 1, b, 1, n, d_a);
    // dB[p, j] = sum_i A[i, p] * dC[i, j]; A read column-wise as Aᵗ.
    gemm_f32(k, n, m, a, 1, k, d_c, n, 1, d_b);
    Ok(())
}

/// `output[c×r] = input[r×c]ᵗ`.
pub fn transpose(input: &[f32], output: &mut [f32], rows: usize, cols: usize) -> Result<()> {
    check_shape("input", input.len(), rows, cols)?;
    check_shape("output", output.len(), rows, cols)?;
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    #[cfg(feature = "parallel")]
    output
        .par_chunks_mut(rows)
        .enumerate()
        .for_each(|(j, out_row)| {
            for (i, v) in out_row.iter_mut().enumerate() {
                *v = input[i * cols + j];
            }
        });

    #[cfg(not(feature = "parallel"))]
    for (j, out_row) in output.chunks_mut(rows).enumerate() {
        for (i, v) in out_row.iter_mut().enumerate() {
            *v = input[i * cols + j];
        }
    }

    Ok(())
}

/// `c[m×n] = op(a)[m×k] · op(b)[k×n]` where `op` is expressed through strides.
///
/// `c` is dense row-major and overwritten. Bounds are validated by callers.
#[allow(clippy::too_many_arguments)]
#[inline]
fn gemm_f32(
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    rsa: usize,
    csa: usize,
    b: &[f32],
    rsb: usize,
    csb: usize,
    c: &mut [f32],
) {
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        c.fill(0.0);
        return;
    }

    #[cfg(feature = "matrixmultiply")]
    // matrixmultiply supports arbitrary strides; `c` is dense row-major.
    unsafe {
        matrixmultiply::sgemm(
            m,
            k,
            n,
            1.0,
            a.as_ptr(),
            rsa as isize,
            csa as isize,
            b.as_ptr(),
            rsb as isize,
            csb as isize,
            0.0,
            c.as_mut_ptr(),
            n as isize,
            1,
        );
    }

    #[cfg(all(not(feature = "matrixmultiply"), feature = "parallel"))]
    c.par_chunks_mut(n)
        .enumerate()
        .for_each(|(i, row)| gemm_row(i, k, a, rsa, csa, b, rsb, csb, row));

    #[cfg(all(not(feature = "matrixmultiply"), not(feature = "parallel")))]
    for (i, row) in c.chunks_mut(n).enumerate() {
        gemm_row(i, k, a, rsa, csa, b, rsb, csb, row);
    }
}

#[cfg(not(feature = "matrixmultiply"))]
#[allow(clippy::too_many_arguments)]
#[inline]
fn gemm_row(
    i: usize,
    k: usize,
    a: &[f32],
    rsa: usize,
    csa: usize,
    b: &[f32],
    rsb: usize,
    csb: usize,
    row: &mut [f32],
) {
    let a0 = i * rsa;
    for (j, out) in row.iter_mut().enumerate() {
        let b0 = j * csb;
        let mut acc = 0.0_f32;
        for p in 0..k {
            acc = a[a0 + p * csa].mul_add(b[p * rsb + b0], acc);
        }
        *out = acc;
    }
}
