//! Dense linear-system solver used by the closed-form estimators.

use crate::Matrix;
use crate::error::{RegressionError, Result};

/// Pivots smaller than this, after the system has been equilibrated to unit
/// row and column magnitude, are treated as zero.
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Pivots below this equilibrated size still solve but are reported as
/// poorly conditioned.
const ILL_CONDITIONED_WARNING: f64 = 1e-7;

/// Solves `A X = B` for `X` with Gaussian elimination and partial pivoting.
///
/// `a` must be square (p × p) and `b` must have p rows; every column of `b`
/// is an independent right-hand side and is solved in the same sweep.
///
/// Columns and then rows of `a` are scaled to a largest magnitude of one
/// before elimination, so the singularity test does not depend on the units
/// of individual unknowns or equations.
pub fn solve(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(RegressionError::mismatch("solve: square system matrix", n, a.ncols()));
    }
    if b.nrows() != n {
        return Err(RegressionError::mismatch("solve: right-hand side rows", n, b.nrows()));
    }
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return Err(RegressionError::InvalidParameter(
            "linear system contains NaN or infinite values".to_string(),
        ));
    }

    let r = b.ncols();
    if n == 0 {
        return Ok(Matrix::zeros((0, r)));
    }

    let mut col_scale = vec![0.0; n];
    for j in 0..n {
        let max = a.column(j).iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if max == 0.0 {
            return Err(RegressionError::SingularMatrix { column: j });
        }
        col_scale[j] = 1.0 / max;
    }

    let mut row_scale = vec![0.0; n];
    for i in 0..n {
        let max = (0..n).fold(0.0_f64, |acc, j| acc.max((a[(i, j)] * col_scale[j]).abs()));
        if max == 0.0 {
            return Err(RegressionError::SingularMatrix { column: i });
        }
        row_scale[i] = 1.0 / max;
    }

    let mut aug = Matrix::zeros((n, n + r));
    for i in 0..n {
        for j in 0..n {
            aug[(i, j)] = a[(i, j)] * col_scale[j] * row_scale[i];
        }
        for j in 0..r {
            aug[(i, n + j)] = b[(i, j)] * row_scale[i];
        }
    }

    let width = n + r;
    for i in 0..n {
        let mut max_row = i;
        for k in (i + 1)..n {
            if aug[(k, i)].abs() > aug[(max_row, i)].abs() {
                max_row = k;
            }
        }

        let pivot = aug[(max_row, i)].abs();
        if !(pivot >= SINGULAR_TOLERANCE) {
            return Err(RegressionError::SingularMatrix { column: i });
        }
        if pivot < ILL_CONDITIONED_WARNING {
            log::warn!("poorly conditioned system: pivot {:e} in column {}", pivot, i);
        }

        if max_row != i {
            for j in 0..width {
                aug.swap((i, j), (max_row, j));
            }
        }

        for k in (i + 1)..n {
            let factor = aug[(k, i)] / aug[(i, i)];
            if factor == 0.0 {
                continue;
            }
            for j in i..width {
                aug[(k, j)] -= factor * aug[(i, j)];
            }
        }
    }

    let mut x = Matrix::zeros((n, r));
    for c in 0..r {
        for i in (0..n).rev() {
            let mut acc = aug[(i, n + c)];
            for j in (i + 1)..n {
                acc -= aug[(i, j)] * x[(j, c)];
            }
            x[(i, c)] = acc / aug[(i, i)];
        }
    }
    for (i, mut row) in x.rows_mut().into_iter().enumerate() {
        row *= col_scale[i];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(RegressionError::SingularMatrix { column: n - 1 });
    }

    log::debug!("solved {}x{} system with {} right-hand side(s)", n, n, r);
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_solve_single_rhs() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![[3.0], [5.0]];

        let x = solve(&a, &b).unwrap();
        assert_abs_diff_eq!(x, array![[0.8], [1.4]], epsilon = 1e-12);
    }

    #[test]
    fn test_solve_multiple_rhs() {
        let a = array![[4.0, -2.0, 1.0], [-2.0, 4.0, -2.0], [1.0, -2.0, 4.0]];
        let expected = array![[1.0, -1.0], [2.0, 0.5], [3.0, 2.0]];
        let b = a.dot(&expected);

        let x = solve(&a, &b).unwrap();
        assert_abs_diff_eq!(x, expected, epsilon = 1e-10);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![[2.0], [3.0]];

        let x = solve(&a, &b).unwrap();
        assert_abs_diff_eq!(x, array![[3.0], [2.0]], epsilon = 1e-12);
    }

    #[test]
    fn test_solve_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![[1.0], [2.0]];

        match solve(&a, &b) {
            Err(RegressionError::SingularMatrix { column }) => assert_eq!(column, 1),
            other => panic!("expected singular matrix error, got {:?}", other),
        }
    }

    #[test]
    fn test_solve_zero_matrix() {
        let a = Matrix::zeros((3, 3));
        let b = Matrix::ones((3, 1));

        assert!(matches!(
            solve(&a, &b),
            Err(RegressionError::SingularMatrix { column: 0 })
        ));
    }

    #[test]
    fn test_solve_mixed_scales() {
        let a = array![[1e6, 2.0], [3.0, 4e-6]];
        let expected = array![[1e-3], [5e5]];
        let b = a.dot(&expected);

        let x = solve(&a, &b).unwrap();
        assert_abs_diff_eq!(x[(0, 0)], 1e-3, epsilon = 1e-12);
        assert_abs_diff_eq!(x[(1, 0)], 5e5, epsilon = 1e-4);
    }

    #[test]
    fn test_solve_poorly_conditioned() {
        let a = array![[1.0, 1.0], [1.0, 1.0 + 1e-8]];
        let b = a.dot(&array![[1.0], [1.0]]);

        let x = solve(&a, &b).unwrap();
        assert_abs_diff_eq!(x, array![[1.0], [1.0]], epsilon = 1e-6);
    }

    #[test]
    fn test_solve_rejects_nan() {
        let a = array![[1.0, f64::NAN], [0.0, 1.0]];
        let b = array![[1.0], [1.0]];
        assert!(matches!(solve(&a, &b), Err(RegressionError::InvalidParameter(_))));

        let b = array![[f64::INFINITY], [1.0]];
        assert!(matches!(
            solve(&Matrix::eye(2), &b),
            Err(RegressionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_solve_empty_system() {
        let x = solve(&Matrix::zeros((0, 0)), &Matrix::zeros((0, 2))).unwrap();
        assert_eq!(x.dim(), (0, 2));
    }

    #[test]
    fn test_solve_shape_errors() {
        let a = Matrix::zeros((2, 3));
        let b = Matrix::zeros((2, 1));
        assert!(matches!(
            solve(&a, &b),
            Err(RegressionError::DimensionMismatch { .. })
        ));

        let a = Matrix::eye(2);
        let b = Matrix::zeros((3, 1));
        assert!(matches!(
            solve(&a, &b),
            Err(RegressionError::DimensionMismatch { .. })
        ));
    }
}
