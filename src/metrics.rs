use crate::Matrix;
use crate::error::{RegressionError, Result};
use ndarray::Axis;

fn check_shapes(y_true: &Matrix, y_pred: &Matrix) -> Result<()> {
    if y_true.nrows() != y_pred.nrows() {
        return Err(RegressionError::mismatch("metric rows", y_true.nrows(), y_pred.nrows()));
    }
    if y_true.ncols() != y_pred.ncols() {
        return Err(RegressionError::mismatch("metric columns", y_true.ncols(), y_pred.ncols()));
    }
    if y_true.is_empty() {
        return Err(RegressionError::InvalidParameter(
            "metrics need at least one value".to_string(),
        ));
    }
    Ok(())
}

pub fn mean_squared_error(y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
    check_shapes(y_true, y_pred)?;

    let diff = y_true - y_pred;
    Ok(diff.mapv(|x| x * x).sum() / diff.len() as f64)
}

pub fn root_mean_squared_error(y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
    mean_squared_error(y_true, y_pred).map(f64::sqrt)
}

pub fn mean_absolute_error(y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
    check_shapes(y_true, y_pred)?;

    let diff = y_true - y_pred;
    Ok(diff.mapv(f64::abs).sum() / diff.len() as f64)
}

/// Coefficient of determination, computed per output column and averaged.
pub fn r2_score(y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
    check_shapes(y_true, y_pred)?;

    let mut total = 0.0;
    for (col_true, col_pred) in y_true.axis_iter(Axis(1)).zip(y_pred.axis_iter(Axis(1))) {
        let y_mean = col_true.sum() / col_true.len() as f64;
        let ss_res = (&col_true - &col_pred).mapv(|x| x * x).sum();
        let ss_tot = col_true.mapv(|x| (x - y_mean) * (x - y_mean)).sum();

        total += if ss_tot == 0.0 {
            // Constant target: only a perfect prediction explains it.
            if ss_res == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - ss_res / ss_tot
        };
    }

    Ok(total / y_true.ncols() as f64)
}
