//! Dense numeric kernels and a sigmoid feedforward network.
//!
//! `rust-feedforward` is a from-scratch implementation of a fully-connected
//! multilayer perceptron trained by backpropagation, built on a small library of
//! stateless kernels over flat row-major `f32` buffers.
//!
//! # Kernels
//!
//! - [`matmul`](matmul::matmul), [`matmul_backward`](matmul::matmul_backward),
//!   [`transpose`](matmul::transpose)
//! - [`activation`]: sigmoid / ReLU / tanh and their derivatives
//! - [`loss::mse`]
//! - [`softmax::softmax`], [`softmax::softmax_backward`]
//! - [`layer_norm::layer_norm`], [`layer_norm::layer_norm_backward`]
//!
//! Kernels never allocate. Every buffer length is checked against the declared
//! dimensions and a mismatch is reported as [`Error::InvalidShape`].
//!
//! # Network
//!
//! [`Network`] owns the topology and parameters. It is created empty, sized with
//! [`Network::resize`], initialized with [`Network::random`], and then driven one
//! example at a time through [`Network::forward`] and [`Network::backward`].
//! `backward` runs its own forward pass and applies the gradient-descent update in
//! place.
//!
//! A single `Network` is not synchronized; concurrent calls on one instance must be
//! serialized by the caller. Separate instances share nothing.
//!
//! # Features
//!
//! - `parallel`: rayon data-parallel `matmul`, `transpose`, `mse`, `softmax` and
//!   element-wise sigmoid. Reductions use rayon's own `sum`/`reduce`.
//! - `matrixmultiply`: GEMM backend for the matrix product kernels.
//!
//! # Quick start
//!
//! ```rust
//! use rust_feedforward::Network;
//!
//! # fn main() -> rust_feedforward::Result<()> {
//! let mut net = Network::new();
//! net.resize(2, &[4], 1)?;
//! net.random_with_seed(0)?;
//!
//! let xs = [[0.0_f32, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
//! let ys = [[0.0_f32], [1.0], [1.0], [0.0]];
//! for _ in 0..100 {
//!     for (x, y) in xs.iter().zip(&ys) {
//!         net.backward(x, y, 0.5)?;
//!     }
//! }
//!
//! let y = net.forward(&[1.0, 0.0])?;
//! assert!(y[0] > 0.0 && y[0] < 1.0);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub(crate) mod buffer;
pub mod data;
pub mod error;
pub mod layer;
pub mod layer_norm;
pub mod loss;
pub mod matmul;
pub mod network;
pub mod softmax;
pub mod topology;
pub mod train;

pub use data::Dataset;
pub use error::{Error, Result};
pub use layer::Layer;
pub use network::Network;
pub use topology::Topology;
pub use train::{FitConfig, FitReport};
