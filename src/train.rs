use crate::{Dataset, Error, Network, Result, loss};

#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    pub epochs: usize,
    pub lr: f32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 1_000,
            lr: 0.5,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(Error::InvalidConfig("lr must be finite and > 0".to_owned()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FitReport {
    /// Mean per-example MSE of the last epoch.
    pub final_loss: f32,
    /// Mean per-example MSE of every epoch, in order.
    pub losses: Vec<f32>,
}

impl Network {
    /// Train on every example of `train`, one [`Network::backward`] step per example,
    /// for `cfg.epochs` passes in dataset order.
    ///
    /// Epoch losses are the mean of the pre-update MSE reported by each step.
    pub fn fit(&mut self, train: &Dataset, cfg: FitConfig) -> Result<FitReport> {
        cfg.validate()?;
        self.check_dataset(train)?;

        let mut losses = Vec::with_capacity(cfg.epochs);
        for epoch in 0..cfg.epochs {
            let mut epoch_loss = 0.0_f32;
            for (x, y) in train.iter() {
                epoch_loss += self.backward(x, y, cfg.lr)?;
            }
            let mean = epoch_loss / train.len() as f32;
            tracing::debug!(epoch = epoch + 1, loss = mean, "epoch finished");
            losses.push(mean);
        }

        Ok(FitReport {
            final_loss: losses.last().copied().unwrap_or(0.0),
            losses,
        })
    }

    /// Evaluate mean MSE over a dataset.
    pub fn evaluate_mse(&mut self, data: &Dataset) -> Result<f32> {
        self.check_dataset(data)?;

        let mut total = 0.0_f32;
        for (x, target) in data.iter() {
            let y = self.forward(x)?;
            total += loss::mse(y, target)?;
        }
        Ok(total / data.len() as f32)
    }

    fn check_dataset(&self, data: &Dataset) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        if data.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if (data.input_size(), data.output_size()) != (self.input_size(), self.output_size()) {
            return Err(Error::InvalidData(format!(
                "dataset maps {} -> {} features but the network maps {} -> {}",
                data.input_size(),
                data.output_size(),
                self.input_size(),
                self.output_size()
            )));
        }
        Ok(())
    }
}
