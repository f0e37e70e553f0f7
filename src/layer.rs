use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::activation::{sigmoid_derivative, sigmoid_in_place};
use crate::{Error, Result, buffer, matmul};

/// Bias value every layer starts from after [`Layer::xavier`].
pub const INIT_BIAS: f32 = 0.01;

/// A dense sigmoid layer.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    in_dim: usize,
    out_dim: usize,
    /// Row-major matrix with shape (in_dim, out_dim).
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    /// Allocate a zero-filled layer.
    ///
    /// A weight matrix whose element count overflows `usize` is rejected as
    /// [`Error::InvalidConfig`].
    pub fn new(in_dim: usize, out_dim: usize) -> Result<Self> {
        let len = in_dim.checked_mul(out_dim).ok_or_else(|| {
            Error::InvalidConfig(format!("layer {in_dim}x{out_dim} has too many weights"))
        })?;
        let weights = buffer::zeroed(len)?;
        let biases = buffer::zeroed(out_dim)?;
        Ok(Self {
            in_dim,
            out_dim,
            weights,
            biases,
        })
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    #[inline]
    pub fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    /// Xavier-scaled uniform weights and a constant [`INIT_BIAS`].
    ///
    /// Each weight is drawn from `U(-1, 1)` and multiplied by
    /// `sqrt(2 / (in_dim + out_dim))`.
    pub fn xavier<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let scale = (2.0 / (self.in_dim + self.out_dim) as f32).sqrt();
        tracing::trace!(
            in_dim = self.in_dim,
            out_dim = self.out_dim,
            scale,
            "xavier init"
        );

        let dist = Uniform::new_inclusive(-1.0_f32, 1.0_f32);
        for w in &mut self.weights {
            *w = dist.sample(rng) * scale;
        }
        self.biases.fill(INIT_BIAS);
    }

    /// Forward pass for a single sample: `outputs = sigmoid(inputs · W + b)`.
    ///
    /// Shape contract:
    /// - `inputs.len() == self.in_dim`
    /// - `outputs.len() == self.out_dim`
    pub fn forward(&self, inputs: &[f32], outputs: &mut [f32]) -> Result<()> {
        matmul::matmul(inputs, &self.weights, outputs, 1, self.in_dim, self.out_dim)?;
        for (o, &b) in outputs.iter_mut().zip(&self.biases) {
            *o += b;
        }
        sigmoid_in_place(outputs);
        Ok(())
    }

    /// Propagates this layer's delta to the layer feeding it.
    ///
    /// Writes `d_inputs[j] = (sum_k W[j, k] * delta[k]) * sigmoid'(inputs[j])`, where
    /// `inputs` are the (post-sigmoid) activations that fed this layer.
    ///
    /// Shape contract:
    /// - `delta.len() == self.out_dim`
    /// - `inputs.len() == d_inputs.len() == self.in_dim`
    pub fn backpropagate(&self, delta: &[f32], inputs: &[f32], d_inputs: &mut [f32]) {
        debug_assert_eq!(delta.len(), self.out_dim);
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(d_inputs.len(), self.in_dim);

        for (j, d) in d_inputs.iter_mut().enumerate() {
            let row = &self.weights[j * self.out_dim..(j + 1) * self.out_dim];
            let sum = row
                .iter()
                .zip(delta)
                .fold(0.0_f32, |acc, (&w, &dk)| w.mul_add(dk, acc));
            *d = sum * sigmoid_derivative(inputs[j]);
        }
    }

    /// Gradient-descent update from one sample:
    /// `W[i, j] -= lr * inputs[i] * delta[j]` and `b[j] -= lr * delta[j]`.
    pub fn descend(&mut self, inputs: &[f32], delta: &[f32], lr: f32) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(delta.len(), self.out_dim);

        for (i, &x) in inputs.iter().enumerate() {
            let row = &mut self.weights[i * self.out_dim..(i + 1) * self.out_dim];
            let step = lr * x;
            for (w, &d) in row.iter_mut().zip(delta) {
                *w = (-step).mul_add(d, *w);
            }
        }
        for (b, &d) in self.biases.iter_mut().zip(delta) {
            *b = (-lr).mul_add(d, *b);
        }
    }
}
