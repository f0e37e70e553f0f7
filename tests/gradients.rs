//! Finite-difference checks for every hand-derived kernel gradient.
//!
//! Each check reduces the forward output to a scalar `L = sum(dy * y)` for a random
//! upstream `dy`, so the analytic backward pass (fed `dy`) must equal `dL/dinput`.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rust_feedforward::layer_norm::{layer_norm, layer_norm_backward};
use rust_feedforward::matmul::{matmul, matmul_backward};
use rust_feedforward::softmax::{softmax, softmax_backward};

const STEP: f32 = 5e-3;

fn random_vec<R: Rng>(rng: &mut R, len: usize) -> Vec<f32> {
    let dist = Uniform::new(-1.0_f32, 1.0_f32);
    (0..len).map(|_| dist.sample(rng)).collect()
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| x as f64 * y as f64).sum()
}

fn assert_close(analytic: f32, numeric: f32, what: &str) {
    let diff = (analytic - numeric).abs();
    let scale = analytic.abs().max(numeric.abs()).max(1.0);
    assert!(
        diff <= 2e-3 || diff / scale <= 1e-2,
        "{what}: analytic={analytic} numeric={numeric} diff={diff}"
    );
}

/// Central difference of `f` with respect to every element of `x`.
fn numeric_grad(x: &[f32], mut f: impl FnMut(&[f32]) -> f64) -> Vec<f32> {
    let mut shifted = x.to_vec();
    (0..x.len())
        .map(|i| {
            let orig = shifted[i];
            shifted[i] = orig + STEP;
            let plus = f(&shifted);
            shifted[i] = orig - STEP;
            let minus = f(&shifted);
            shifted[i] = orig;
            ((plus - minus) / (2.0 * STEP as f64)) as f32
        })
        .collect()
}

#[test]
fn matmul_backward_matches_finite_differences() {
    let mut rng = StdRng::seed_from_u64(11);
    for &(m, k, n) in &[(1, 3, 2), (2, 3, 4), (3, 1, 3), (4, 5, 2)] {
        let a = random_vec(&mut rng, m * k);
        let b = random_vec(&mut rng, k * n);
        let d_c = random_vec(&mut rng, m * n);

        let mut d_a = vec![0.0_f32; m * k];
        let mut d_b = vec![0.0_f32; k * n];
        matmul_backward(&a, &b, &d_c, &mut d_a, &mut d_b, m, k, n).unwrap();

        let mut c = vec![0.0_f32; m * n];
        let num_a = numeric_grad(&a, |a| {
            matmul(a, &b, &mut c, m, k, n).unwrap();
            dot(&c, &d_c)
        });
        let num_b = numeric_grad(&b, |b| {
            matmul(&a, b, &mut c, m, k, n).unwrap();
            dot(&c, &d_c)
        });

        for (i, (&an, &nu)) in d_a.iter().zip(&num_a).enumerate() {
            assert_close(an, nu, &format!("dA[{i}] for ({m},{k},{n})"));
        }
        for (i, (&an, &nu)) in d_b.iter().zip(&num_b).enumerate() {
            assert_close(an, nu, &format!("dB[{i}] for ({m},{k},{n})"));
        }
    }
}

#[test]
fn softmax_backward_matches_finite_differences() {
    let mut rng = StdRng::seed_from_u64(12);
    for &n in &[1, 2, 5, 8] {
        let x = random_vec(&mut rng, n);
        let d_y = random_vec(&mut rng, n);

        let mut s = vec![0.0_f32; n];
        softmax(&x, &mut s).unwrap();
        let mut d_x = vec![0.0_f32; n];
        softmax_backward(&s, &d_y, &mut d_x).unwrap();

        let mut y = vec![0.0_f32; n];
        let numeric = numeric_grad(&x, |x| {
            softmax(x, &mut y).unwrap();
            dot(&y, &d_y)
        });

        for (i, (&an, &nu)) in d_x.iter().zip(&numeric).enumerate() {
            assert_close(an, nu, &format!("dx[{i}] for n={n}"));
        }
    }
}

#[test]
fn layer_norm_backward_matches_finite_differences() {
    let mut rng = StdRng::seed_from_u64(13);
    let eps = 1e-5_f32;
    for &(m, n) in &[(1, 4), (2, 3), (3, 6)] {
        let x: Vec<f32> = random_vec(&mut rng, m * n).iter().map(|v| 2.0 * v).collect();
        let gamma: Vec<f32> = random_vec(&mut rng, n).iter().map(|g| 1.0 + 0.5 * g).collect();
        let beta = random_vec(&mut rng, n);
        let d_y = random_vec(&mut rng, m * n);

        let mut d_x = vec![0.0_f32; m * n];
        let mut d_gamma = vec![0.0_f32; n];
        let mut d_beta = vec![0.0_f32; n];
        layer_norm_backward(
            &x,
            &gamma,
            &d_y,
            &mut d_x,
            &mut d_gamma,
            &mut d_beta,
            m,
            n,
            eps,
        )
        .unwrap();

        let mut y = vec![0.0_f32; m * n];
        let num_x = numeric_grad(&x, |x| {
            layer_norm(x, &gamma, &beta, &mut y, m, n, eps).unwrap();
            dot(&y, &d_y)
        });
        let num_gamma = numeric_grad(&gamma, |g| {
            layer_norm(&x, g, &beta, &mut y, m, n, eps).unwrap();
            dot(&y, &d_y)
        });
        let num_beta = numeric_grad(&beta, |b| {
            layer_norm(&x, &gamma, b, &mut y, m, n, eps).unwrap();
            dot(&y, &d_y)
        });

        for (i, (&an, &nu)) in d_x.iter().zip(&num_x).enumerate() {
            assert_close(an, nu, &format!("dx[{i}] for ({m},{n})"));
        }
        for (j, (&an, &nu)) in d_gamma.iter().zip(&num_gamma).enumerate() {
            assert_close(an, nu, &format!("dgamma[{j}] for ({m},{n})"));
        }
        for (j, (&an, &nu)) in d_beta.iter().zip(&num_beta).enumerate() {
            assert_close(an, nu, &format!("dbeta[{j}] for ({m},{n})"));
        }
    }
}
