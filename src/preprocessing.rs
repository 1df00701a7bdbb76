use crate::error::{RegressionError, Result};
use crate::{Matrix, Vector};
use ndarray::Axis;

/// Standardizes each column to zero mean and unit variance.
///
/// Columns with zero variance are only centered.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    mean: Option<Vector>,
    scale: Option<Vector>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mean(&self) -> Option<&Vector> {
        self.mean.as_ref()
    }

    pub fn scale(&self) -> Option<&Vector> {
        self.scale.as_ref()
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<()> {
        let mean = data.mean_axis(Axis(0)).ok_or_else(|| {
            RegressionError::InvalidParameter("cannot fit scaler on empty data".to_string())
        })?;
        let scale = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 1e-12 { s } else { 1.0 });

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        let (mean, scale) = self.parameters(data)?;

        let mut result = data.clone();
        for mut row in result.axis_iter_mut(Axis(0)) {
            row -= mean;
            row /= scale;
        }
        Ok(result)
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<Matrix> {
        self.fit(data)?;
        self.transform(data)
    }

    pub fn inverse_transform(&self, data: &Matrix) -> Result<Matrix> {
        let (mean, scale) = self.parameters(data)?;

        let mut result = data.clone();
        for mut row in result.axis_iter_mut(Axis(0)) {
            row *= scale;
            row += mean;
        }
        Ok(result)
    }

    fn parameters(&self, data: &Matrix) -> Result<(&Vector, &Vector)> {
        let (Some(mean), Some(scale)) = (self.mean.as_ref(), self.scale.as_ref()) else {
            return Err(RegressionError::NotFitted("StandardScaler"));
        };
        if data.ncols() != mean.len() {
            return Err(RegressionError::mismatch("scaler columns", mean.len(), data.ncols()));
        }
        Ok((mean, scale))
    }
}
