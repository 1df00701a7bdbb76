use crate::error::{RegressionError, Result};
use crate::{Matrix, Vector, linalg};
use ndarray::s;

/// Multi-output linear regression fitted with the closed-form OLS solution.
///
/// Parameters follow the affine layout `output = input · Wᵀ + b`, with the
/// weight matrix `W` of shape `(out_features, in_features)` and the bias `b`
/// of length `out_features`. Both start at zero, so an unfitted model
/// predicts zeros.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearRegressionModel {
    weight: Matrix,
    bias: Vector,
    fitted: bool,
}

impl LinearRegressionModel {
    pub fn new(in_features: usize, out_features: usize) -> Self {
        if in_features == 0 {
            panic!("in_features must be > 0, got {}", in_features);
        }
        if out_features == 0 {
            panic!("out_features must be > 0, got {}", out_features);
        }

        Self {
            weight: Matrix::zeros((out_features, in_features)),
            bias: Vector::zeros(out_features),
            fitted: false,
        }
    }

    /// Builds a model from existing parameters, e.g. ones read back from an
    /// exported graph.
    pub fn from_parameters(weight: Matrix, bias: Vector) -> Result<Self> {
        if weight.nrows() != bias.len() {
            return Err(RegressionError::mismatch(
                "bias length vs weight rows",
                weight.nrows(),
                bias.len(),
            ));
        }
        if weight.is_empty() {
            return Err(RegressionError::InvalidParameter(
                "weight matrix must have at least one row and one column".to_string(),
            ));
        }
        if weight.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err(RegressionError::InvalidParameter(
                "parameters must be finite".to_string(),
            ));
        }

        Ok(Self {
            weight,
            bias,
            fitted: true,
        })
    }

    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }

    pub fn weight(&self) -> &Matrix {
        &self.weight
    }

    pub fn bias(&self) -> &Vector {
        &self.bias
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fits the model by solving the normal equation `(X'ᵀX') β = X'ᵀY`,
    /// where `X'` is `x` with a leading column of ones.
    ///
    /// On error the current parameters are left untouched.
    pub fn fit(&mut self, x: &Matrix, y: &Matrix) -> Result<()> {
        self.check_features(x, "fit: feature columns")?;
        if y.ncols() != self.out_features() {
            return Err(RegressionError::mismatch(
                "fit: target columns",
                self.out_features(),
                y.ncols(),
            ));
        }
        if x.nrows() != y.nrows() {
            return Err(RegressionError::mismatch("fit: sample rows", x.nrows(), y.nrows()));
        }
        if x.nrows() == 0 {
            return Err(RegressionError::mismatch("fit: sample rows", 1, 0));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(RegressionError::InvalidParameter(
                "fit: inputs contain NaN or infinite values".to_string(),
            ));
        }

        let (weight, bias) = self.analytical_solution(x, y)?;

        self.weight = weight;
        self.bias = bias;
        self.fitted = true;
        Ok(())
    }

    /// Applies `x · Wᵀ + b` to every row of `x`.
    pub fn predict(&self, x: &Matrix) -> Result<Matrix> {
        self.check_features(x, "predict: feature columns")?;

        let predictions = x.dot(&self.weight.t()) + &self.bias;
        Ok(predictions)
    }

    /// R² of the predictions for `x` against `y`, averaged over outputs.
    pub fn score(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        let y_pred = self.predict(x)?;
        crate::metrics::r2_score(y, &y_pred)
    }

    fn check_features(&self, x: &Matrix, context: &'static str) -> Result<()> {
        if x.ncols() != self.in_features() {
            return Err(RegressionError::mismatch(context, self.in_features(), x.ncols()));
        }
        Ok(())
    }

    fn analytical_solution(&self, x: &Matrix, y: &Matrix) -> Result<(Matrix, Vector)> {
        let (n_samples, n_features) = x.dim();

        let mut x_aug = Matrix::ones((n_samples, n_features + 1));
        x_aug.slice_mut(s![.., 1..]).assign(x);

        let xt = x_aug.t();
        let xtx = xt.dot(&x_aug);
        let xty = xt.dot(y);

        log::debug!(
            "fitting OLS: {} samples, {} features, {} outputs",
            n_samples,
            n_features,
            y.ncols()
        );

        let beta = linalg::solve(&xtx, &xty)?;

        let bias = beta.row(0).to_owned();
        let weight = beta.slice(s![1.., ..]).t().to_owned();

        Ok((weight, bias))
    }
}
