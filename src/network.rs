use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::sigmoid_derivative;
use crate::error::check_len;
use crate::{Error, Layer, Result, Topology, buffer, loss};

/// A fully-connected sigmoid network with a runtime-configurable number of
/// hidden layers.
///
/// Lifecycle: [`Network::new`] (empty) → [`Network::resize`] → [`Network::random`]
/// → any number of [`Network::forward`] / [`Network::backward`] calls →
/// [`Network::delete`] (or drop).
///
/// Every layer (hidden and output) applies `sigmoid(x · W + b)`.
#[derive(Debug, Clone, Default)]
pub struct Network {
    topology: Option<Topology>,
    /// Copy of the most recent input.
    input: Vec<f32>,
    hidden: Vec<Layer>,
    output_layer: Layer,
    /// Output of the most recent forward or backward pass.
    output: Vec<f32>,
}

impl Network {
    /// An empty network with no buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Redefine the topology and (re)allocate every buffer for it.
    ///
    /// Previously trained values are not preserved: all parameters are zero after a
    /// successful resize and must be initialized with [`Network::random`].
    ///
    /// An invalid topology is rejected before anything is touched. An allocation
    /// failure leaves the network empty.
    pub fn resize(
        &mut self,
        input_size: usize,
        hidden_sizes: &[usize],
        output_size: usize,
    ) -> Result<()> {
        let topology = Topology::new(input_size, hidden_sizes, output_size)?;
        self.delete();

        let input = buffer::zeroed(topology.input_size())?;

        let mut hidden = Vec::new();
        hidden.try_reserve_exact(topology.hidden_sizes().len())?;
        for idx in 0..topology.hidden_sizes().len() {
            let (fan_in, fan_out) = topology.hidden_dims(idx);
            hidden.push(Layer::new(fan_in, fan_out)?);
        }

        let (fan_in, fan_out) = topology.output_dims();
        let output_layer = Layer::new(fan_in, fan_out)?;
        let output = buffer::zeroed(topology.output_size())?;

        tracing::debug!(
            input_size,
            ?hidden_sizes,
            output_size,
            parameters = topology.num_parameters(),
            "network resized"
        );

        *self = Self {
            topology: Some(topology),
            input,
            hidden,
            output_layer,
            output,
        };
        Ok(())
    }

    /// Release every owned buffer and return to the empty state.
    ///
    /// Calling this on an already-empty network is a no-op.
    pub fn delete(&mut self) {
        *self = Self::default();
    }

    /// Xavier-initialize every layer from `rng`.
    ///
    /// Weights are `U(-1, 1) * sqrt(2 / (fan_in + fan_out))`, biases are
    /// [`INIT_BIAS`](crate::layer::INIT_BIAS).
    ///
    /// Returns [`Error::EmptyNetwork`] if the network has not been resized.
    pub fn random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        for layer in &mut self.hidden {
            layer.xavier(rng);
        }
        self.output_layer.xavier(rng);
        Ok(())
    }

    /// [`Network::random`] with a deterministic seed.
    pub fn random_with_seed(&mut self, seed: u64) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.random(&mut rng)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.topology.is_none()
    }

    #[inline]
    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    /// `0` when the network is empty.
    #[inline]
    pub fn input_size(&self) -> usize {
        self.input.len()
    }

    #[inline]
    pub fn hidden_sizes(&self) -> &[usize] {
        match &self.topology {
            Some(topology) => topology.hidden_sizes(),
            None => &[],
        }
    }

    /// `0` when the network is empty.
    #[inline]
    pub fn output_size(&self) -> usize {
        self.output.len()
    }

    #[inline]
    pub fn num_parameters(&self) -> usize {
        self.topology.as_ref().map_or(0, Topology::num_parameters)
    }

    #[inline]
    pub fn hidden_layers(&self) -> &[Layer] {
        &self.hidden
    }

    #[inline]
    pub fn hidden_layers_mut(&mut self) -> &mut [Layer] {
        &mut self.hidden
    }

    #[inline]
    pub fn output_layer(&self) -> &Layer {
        &self.output_layer
    }

    #[inline]
    pub fn output_layer_mut(&mut self) -> &mut Layer {
        &mut self.output_layer
    }

    /// Output cached by the most recent forward or backward pass.
    #[inline]
    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// Forward pass for a single sample.
    ///
    /// Hidden activations live only for the duration of the call; the final output is
    /// cached in the network and returned. Parameters are not touched.
    pub fn forward(&mut self, input: &[f32]) -> Result<&[f32]> {
        self.check_input(input)?;
        self.input.copy_from_slice(input);

        let mut current: Vec<f32> = Vec::new();
        for (idx, layer) in self.hidden.iter().enumerate() {
            let mut next = buffer::zeroed(layer.out_dim())?;
            let prev: &[f32] = if idx == 0 { &self.input } else { &current };
            layer.forward(prev, &mut next)?;
            current = next;
        }

        let last: &[f32] = if self.hidden.is_empty() {
            &self.input
        } else {
            &current
        };
        self.output_layer.forward(last, &mut self.output)?;
        Ok(&self.output)
    }

    /// Shape-checked inference that copies the output into `out`.
    pub fn predict_into(&mut self, input: &[f32], out: &mut [f32]) -> Result<()> {
        check_len("out", out.len(), self.output_size())?;
        let y = self.forward(input)?;
        out.copy_from_slice(y);
        Ok(())
    }

    /// One gradient-descent training step on a single `(input, target)` pair.
    ///
    /// Runs its own forward pass (independent of any earlier [`Network::forward`]),
    /// then updates the output layer followed by each hidden layer in reverse order:
    ///
    /// - output delta: `(y - t) * y * (1 - y)`
    /// - hidden delta `i`: `(W_next · delta_next) * a_i * (1 - a_i)`, read from the
    ///   next layer's weights *after* that layer has already been updated
    /// - update: `W -= lr * prev_activation ⊗ delta`, `b -= lr * delta`
    ///
    /// Returns the MSE of the prediction made before the update.
    ///
    /// If a transient buffer cannot be allocated part-way through, the updates
    /// already applied in this call are kept and the error is returned.
    pub fn backward(&mut self, input: &[f32], target: &[f32], learning_rate: f32) -> Result<f32> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and > 0, got {learning_rate}"
            )));
        }
        self.check_input(input)?;
        check_len("target", target.len(), self.output_size())?;
        self.input.copy_from_slice(input);

        let activations = self.forward_retained()?;
        let mse = loss::mse(&self.output, target)?;
        tracing::trace!(mse, "backward pass");

        let mut delta = buffer::zeroed(self.output.len())?;
        for ((d, &y), &t) in delta.iter_mut().zip(&self.output).zip(target) {
            *d = (y - t) * sigmoid_derivative(y);
        }

        let last = activations
            .last()
            .map_or(self.input.as_slice(), Vec::as_slice);
        self.output_layer.descend(last, &delta, learning_rate);

        for idx in (0..self.hidden.len()).rev() {
            let mut layer_delta = buffer::zeroed(self.hidden[idx].out_dim())?;
            let next = if idx + 1 == self.hidden.len() {
                &self.output_layer
            } else {
                &self.hidden[idx + 1]
            };
            next.backpropagate(&delta, &activations[idx], &mut layer_delta);

            let prev: &[f32] = if idx == 0 {
                &self.input
            } else {
                &activations[idx - 1]
            };
            self.hidden[idx].descend(prev, &layer_delta, learning_rate);
            delta = layer_delta;
        }

        Ok(mse)
    }

    /// Forward pass from `self.input` that keeps every hidden activation.
    fn forward_retained(&mut self) -> Result<Vec<Vec<f32>>> {
        let mut activations: Vec<Vec<f32>> = Vec::new();
        activations.try_reserve_exact(self.hidden.len())?;

        for (idx, layer) in self.hidden.iter().enumerate() {
            let mut act = buffer::zeroed(layer.out_dim())?;
            let prev: &[f32] = if idx == 0 {
                &self.input
            } else {
                &activations[idx - 1]
            };
            layer.forward(prev, &mut act)?;
            activations.push(act);
        }

        let last = activations
            .last()
            .map_or(self.input.as_slice(), Vec::as_slice);
        self.output_layer.forward(last, &mut self.output)?;
        Ok(activations)
    }

    fn check_input(&self, input: &[f32]) -> Result<()> {
        let Some(topology) = &self.topology else {
            return Err(Error::EmptyNetwork);
        };
        check_len("input", input.len(), topology.input_size())
    }
}
