//! Activation functions and their derivatives.
//!
//! A dense layer computes a pre-activation value `z = x W + b` and then applies an
//! activation function element-wise: `y = activation(z)`.
//!
//! Derivative conventions differ per activation and are part of the contract:
//!
//! - [`sigmoid_derivative`] takes the *post-activation* output `y = sigmoid(z)`.
//!   The network caches post-sigmoid activations, so backprop never needs `z`.
//! - [`relu_derivative`] and [`tanh_derivative`] take the *pre-activation* input `z`
//!   and recompute what they need from it.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Logistic sigmoid, `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Sigmoid derivative expressed in terms of the activated value `y`: `y * (1 - y)`.
#[inline]
pub fn sigmoid_derivative(y: f32) -> f32 {
    y * (1.0 - y)
}

#[inline]
pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// `1` for `x > 0`, else `0` (the subgradient at zero is taken as `0`).
#[inline]
pub fn relu_derivative(x: f32) -> f32 {
    if x > 0.0 { 1.0 } else { 0.0 }
}

#[inline]
pub fn tanh(x: f32) -> f32 {
    x.tanh()
}

/// `1 - tanh(x)^2`, recomputed from the raw input `x`.
#[inline]
pub fn tanh_derivative(x: f32) -> f32 {
    let t = x.tanh();
    1.0 - t * t
}

/// Apply [`sigmoid`] to every element of `values` in place.
pub fn sigmoid_in_place(values: &mut [f32]) {
    #[cfg(feature = "parallel")]
    values.par_iter_mut().for_each(|v| *v = sigmoid(*v));

    #[cfg(not(feature = "parallel"))]
    for v in values.iter_mut() {
        *v = sigmoid(*v);
    }
}
