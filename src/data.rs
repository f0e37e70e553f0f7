//! In-memory training examples for [`Network::fit`](crate::Network::fit).

use crate::error::check_len;
use crate::{Error, Result};

/// Input/target pairs of fixed widths, kept in two flat row-major buffers so that
/// each example is handed to the network as a pair of slices.
#[derive(Debug, Clone)]
pub struct Dataset {
    input_size: usize,
    output_size: usize,
    inputs: Vec<f32>,
    targets: Vec<f32>,
}

impl Dataset {
    /// An empty dataset for a network mapping `input_size` features to
    /// `output_size` targets.
    pub fn new(input_size: usize, output_size: usize) -> Result<Self> {
        if input_size == 0 || output_size == 0 {
            return Err(Error::InvalidData(format!(
                "example widths must be > 0, got {input_size} -> {output_size}"
            )));
        }
        Ok(Self {
            input_size,
            output_size,
            inputs: Vec::new(),
            targets: Vec::new(),
        })
    }

    /// Collect per-example rows. The widths are taken from the first pair and every
    /// other pair must match them.
    pub fn from_rows(inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidData(format!(
                "{} inputs but {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        let (Some(first_x), Some(first_y)) = (inputs.first(), targets.first()) else {
            return Err(Error::InvalidData("no examples".to_owned()));
        };

        let mut data = Self::new(first_x.len(), first_y.len())?;
        for (x, y) in inputs.iter().zip(targets) {
            data.push(x, y)?;
        }
        Ok(data)
    }

    /// Append one example. On error nothing is appended.
    pub fn push(&mut self, input: &[f32], target: &[f32]) -> Result<()> {
        check_len("input", input.len(), self.input_size)?;
        check_len("target", target.len(), self.output_size)?;
        self.inputs.try_reserve(input.len())?;
        self.targets.try_reserve(target.len())?;
        self.inputs.extend_from_slice(input);
        self.targets.extend_from_slice(target);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len() / self.input_size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// `(input, target)` pairs in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&[f32], &[f32])> {
        self.inputs
            .chunks_exact(self.input_size)
            .zip(self.targets.chunks_exact(self.output_size))
    }
}
