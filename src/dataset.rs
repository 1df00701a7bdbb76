use crate::error::{RegressionError, Result};
use crate::{Matrix, Vector};
use ndarray::s;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::{Normal, Uniform};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Paired feature and target matrices with one row per sample.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Matrix,
    pub targets: Matrix,
}

impl Dataset {
    pub fn new(features: Matrix, targets: Matrix) -> Result<Self> {
        if features.nrows() != targets.nrows() {
            return Err(RegressionError::mismatch(
                "dataset: target rows",
                features.nrows(),
                targets.nrows(),
            ));
        }

        Ok(Self { features, targets })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_targets(&self) -> usize {
        self.targets.ncols()
    }

    /// Splits off the last `test_size` fraction of rows as the test set.
    ///
    /// Rows are not shuffled; shuffle when generating data if needed.
    pub fn train_test_split(&self, test_size: f64) -> Result<(Self, Self)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(RegressionError::InvalidParameter(format!(
                "test_size must be between 0 and 1, got {}",
                test_size
            )));
        }

        let n_samples = self.n_samples();
        let n_test = (n_samples as f64 * test_size).round() as usize;
        let n_train = n_samples.saturating_sub(n_test);
        if n_test == 0 || n_train == 0 {
            return Err(RegressionError::InvalidParameter(format!(
                "test_size {} leaves an empty split for {} samples",
                test_size, n_samples
            )));
        }

        let train = Dataset::new(
            self.features.slice(s![..n_train, ..]).to_owned(),
            self.targets.slice(s![..n_train, ..]).to_owned(),
        )?;
        let test = Dataset::new(
            self.features.slice(s![n_train.., ..]).to_owned(),
            self.targets.slice(s![n_train.., ..]).to_owned(),
        )?;

        Ok((train, test))
    }
}

/// Recipe for a reproducible synthetic regression dataset.
///
/// Features are drawn uniformly from `feature_range`, targets follow
/// `X · Wᵀ + b` plus optional Gaussian noise. The seed is part of the
/// config, so equal configs always produce equal datasets.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    weight: Matrix,
    bias: Vector,
    n_samples: usize,
    feature_range: (f64, f64),
    noise_std: f64,
    seed: u64,
}

impl SyntheticConfig {
    pub const DEFAULT_SEED: u64 = 42;

    pub fn new(weight: Matrix, bias: Vector) -> Self {
        Self {
            weight,
            bias,
            n_samples: 100,
            feature_range: (0.0, 10.0),
            noise_std: 0.0,
            seed: Self::DEFAULT_SEED,
        }
    }

    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    pub fn feature_range(mut self, low: f64, high: f64) -> Self {
        self.feature_range = (low, high);
        self
    }

    pub fn noise_std(mut self, noise_std: f64) -> Self {
        self.noise_std = noise_std;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn generate(&self) -> Result<Dataset> {
        self.validate()?;

        let (low, high) = self.feature_range;
        let n_features = self.weight.ncols();
        let n_targets = self.weight.nrows();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let features = Matrix::random_using(
            (self.n_samples, n_features),
            Uniform::new(low, high),
            &mut rng,
        );
        let mut targets = features.dot(&self.weight.t()) + &self.bias;

        if self.noise_std > 0.0 {
            let normal = Normal::new(0.0, self.noise_std)
                .map_err(|e| RegressionError::InvalidParameter(e.to_string()))?;
            targets += &Matrix::random_using((self.n_samples, n_targets), normal, &mut rng);
        }

        log::debug!(
            "generated {} synthetic samples ({} features, {} targets, seed {})",
            self.n_samples,
            n_features,
            n_targets,
            self.seed
        );
        Dataset::new(features, targets)
    }

    fn validate(&self) -> Result<()> {
        if self.weight.nrows() != self.bias.len() {
            return Err(RegressionError::mismatch(
                "synthetic: bias length vs weight rows",
                self.weight.nrows(),
                self.bias.len(),
            ));
        }
        if self.weight.is_empty() {
            return Err(RegressionError::InvalidParameter(
                "synthetic weight must have at least one row and one column".to_string(),
            ));
        }
        if self.n_samples == 0 {
            return Err(RegressionError::InvalidParameter(
                "n_samples must be > 0".to_string(),
            ));
        }
        let (low, high) = self.feature_range;
        if !(low < high && (high - low).is_finite()) {
            return Err(RegressionError::InvalidParameter(format!(
                "feature_range must be finite with low < high, got ({}, {})",
                low, high
            )));
        }
        if !(self.noise_std >= 0.0 && self.noise_std.is_finite()) {
            return Err(RegressionError::InvalidParameter(format!(
                "noise_std must be non-negative, got {}",
                self.noise_std
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_dataset_creation() {
        let features = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let targets = array![[1.0], [2.0], [3.0]];

        let dataset = Dataset::new(features, targets).unwrap();
        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.n_features(), 2);
        assert_eq!(dataset.n_targets(), 1);
    }

    #[test]
    fn test_dataset_row_mismatch() {
        let result = Dataset::new(Matrix::zeros((3, 2)), Matrix::zeros((2, 1)));
        assert!(matches!(result, Err(RegressionError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_train_test_split() {
        let features = Matrix::from_shape_fn((100, 5), |(i, j)| (i * 5 + j) as f64);
        let targets = Matrix::from_shape_fn((100, 1), |(i, _)| i as f64);
        let dataset = Dataset::new(features, targets).unwrap();

        let (train, test) = dataset.train_test_split(0.2).unwrap();
        assert_eq!(train.n_samples(), 80);
        assert_eq!(test.n_samples(), 20);
        assert_eq!(train.targets[(79, 0)], 79.0);
        assert_eq!(test.targets[(0, 0)], 80.0);
    }

    #[test]
    fn test_train_test_split_invalid() {
        let dataset = Dataset::new(Matrix::zeros((3, 1)), Matrix::zeros((3, 1))).unwrap();
        assert!(dataset.train_test_split(0.0).is_err());
        assert!(dataset.train_test_split(1.0).is_err());
        assert!(dataset.train_test_split(0.1).is_err());
    }

    #[test]
    fn test_synthetic_is_reproducible() {
        let config = SyntheticConfig::new(array![[2.0, -1.0]], array![0.5])
            .n_samples(20)
            .noise_std(0.1)
            .seed(7);

        let first = config.generate().unwrap();
        let second = config.generate().unwrap();
        assert_eq!(first.features, second.features);
        assert_eq!(first.targets, second.targets);

        let other = config.clone().seed(8).generate().unwrap();
        assert_ne!(first.features, other.features);
    }

    #[test]
    fn test_synthetic_noiseless_targets() {
        let weight = array![[3.0], [-2.0]];
        let bias = array![1.0, 4.0];
        let dataset = SyntheticConfig::new(weight.clone(), bias.clone())
            .n_samples(10)
            .feature_range(-1.0, 1.0)
            .generate()
            .unwrap();

        assert_eq!(dataset.n_samples(), 10);
        assert_eq!(dataset.n_targets(), 2);
        assert!(dataset.features.iter().all(|&v| (-1.0..1.0).contains(&v)));

        let expected = dataset.features.dot(&weight.t()) + &bias;
        assert_eq!(dataset.targets, expected);
    }

    #[test]
    fn test_synthetic_invalid_config() {
        let config = SyntheticConfig::new(array![[1.0]], array![0.0]);
        assert!(config.clone().n_samples(0).generate().is_err());
        assert!(config.clone().feature_range(1.0, 1.0).generate().is_err());
        assert!(config.clone().noise_std(-1.0).generate().is_err());
        assert!(config.clone().feature_range(-f64::MAX, f64::MAX).generate().is_err());
        assert!(config.clone().feature_range(0.0, f64::INFINITY).generate().is_err());
        assert!(SyntheticConfig::new(array![[1.0]], array![0.0, 1.0]).generate().is_err());
    }
}
