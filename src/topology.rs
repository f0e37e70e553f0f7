//! Network topology.
//!
//! A `Topology` names the width of every level of the network: the input
//! features, zero or more hidden layers, and the output layer. It is validated once
//! and then drives every buffer size in [`Network::resize`](crate::Network::resize).

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    input_size: usize,
    hidden_sizes: Vec<usize>,
    output_size: usize,
}

impl Topology {
    /// Validate and build a topology.
    ///
    /// An empty `hidden_sizes` wires the inputs directly to the output layer.
    pub fn new(input_size: usize, hidden_sizes: &[usize], output_size: usize) -> Result<Self> {
        if input_size == 0 {
            return Err(Error::InvalidConfig("input_size must be > 0".to_owned()));
        }
        if output_size == 0 {
            return Err(Error::InvalidConfig("output_size must be > 0".to_owned()));
        }
        if let Some(idx) = hidden_sizes.iter().position(|&w| w == 0) {
            return Err(Error::InvalidConfig(format!(
                "hidden layer {idx} width must be > 0"
            )));
        }

        Ok(Self {
            input_size,
            hidden_sizes: hidden_sizes.to_vec(),
            output_size,
        })
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    pub fn hidden_sizes(&self) -> &[usize] {
        &self.hidden_sizes
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// `(fan_in, fan_out)` of hidden layer `idx`.
    #[inline]
    pub fn hidden_dims(&self, idx: usize) -> (usize, usize) {
        let fan_in = if idx == 0 {
            self.input_size
        } else {
            self.hidden_sizes[idx - 1]
        };
        (fan_in, self.hidden_sizes[idx])
    }

    /// `(fan_in, fan_out)` of the output layer.
    ///
    /// The fan-in is the last hidden width, or `input_size` with no hidden layers.
    #[inline]
    pub fn output_dims(&self) -> (usize, usize) {
        let fan_in = self
            .hidden_sizes
            .last()
            .copied()
            .unwrap_or(self.input_size);
        (fan_in, self.output_size)
    }

    /// Total number of trainable scalars (weights and biases).
    pub fn num_parameters(&self) -> usize {
        let hidden: usize = (0..self.hidden_sizes.len())
            .map(|i| {
                let (fan_in, fan_out) = self.hidden_dims(i);
                fan_in * fan_out + fan_out
            })
            .sum();
        let (fan_in, fan_out) = self.output_dims();
        hidden + fan_in * fan_out + fan_out
    }
}
