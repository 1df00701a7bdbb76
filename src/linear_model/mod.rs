//! Linear models for regression.
//!
//! `LinearRegressionModel` computes its parameters directly from the normal
//! equation instead of iterating, and keeps them in the affine layout used by
//! the exported inference graph.
//!
//! # Examples
//!
//! ```rust
//! use ols_analytic::LinearRegressionModel;
//! use ndarray::array;
//!
//! let x = array![[1.0], [2.0], [3.0], [4.0]];
//! let y = array![[3.0], [5.0], [7.0], [9.0]];
//!
//! let mut model = LinearRegressionModel::new(1, 1);
//! model.fit(&x, &y).unwrap();
//! let predictions = model.predict(&array![[5.0]]).unwrap();
//! assert!((predictions[(0, 0)] - 11.0).abs() < 1e-9);
//! ```

mod linear_regression;

pub use linear_regression::LinearRegressionModel;
