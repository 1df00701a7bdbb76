//! Closed-form ordinary least squares regression with inference-graph export.
//!
//! Fit a [`LinearRegressionModel`] from the normal equation, predict with the
//! affine transform `x · Wᵀ + b`, and describe the fitted model as a portable
//! [`InferenceGraph`].

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod dataset;
pub mod error;
pub mod export;
pub mod linalg;
pub mod linear_model;
pub mod metrics;
pub mod preprocessing;

pub use dataset::{Dataset, SyntheticConfig};
pub use error::{RegressionError, Result};
pub use export::{ExportConfig, InferenceGraph};
pub use linear_model::LinearRegressionModel;
pub use preprocessing::StandardScaler;

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;
