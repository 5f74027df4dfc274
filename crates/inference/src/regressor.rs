use crate::error::{InferenceError, Result};
use ndarray::{s, Array1, Array2};

/// Linear least squares over the coefficients and intercept together.
///
/// The fit is solved in its dual form, so it works for corpora narrower
/// than the vocabulary. Linearly independent rows get the minimum-norm
/// exact solution, which reproduces every training target. Dependent rows
/// (duplicated phrases, more rows than terms) fall back to an L2 penalty
/// of `alpha`.
#[derive(Debug, Clone)]
pub struct RidgeRegressor {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl RidgeRegressor {
    pub fn fit(features: &Array2<f64>, targets: &[f64], alpha: f64) -> Result<Self> {
        let n_samples = features.nrows();
        if n_samples == 0 || n_samples != targets.len() {
            return Err(InferenceError::training(format!(
                "regressor needs one target per row ({n_samples} rows, {} targets)",
                targets.len()
            )));
        }

        let n_features = features.ncols();
        let y = Array1::from(targets.to_vec());

        // trailing constant column carries the intercept
        let mut augmented = Array2::<f64>::ones((n_samples, n_features + 1));
        augmented.slice_mut(s![.., ..n_features]).assign(features);

        let kernel: Array2<f64> = augmented.dot(&augmented.t());
        let dual = match solve(kernel.clone(), y.clone()) {
            Ok(dual) => dual,
            Err(_) => {
                log::debug!(
                    "Training rows are linearly dependent; fitting with ridge_alpha {alpha}"
                );
                let mut penalized = kernel;
                for i in 0..n_samples {
                    penalized[[i, i]] += alpha;
                }
                solve(penalized, y)?
            }
        };

        let solution: Array1<f64> = augmented.t().dot(&dual);
        Ok(Self {
            coefficients: solution.slice(s![..n_features]).to_owned(),
            intercept: solution[n_features],
        })
    }

    #[must_use]
    pub fn predict(&self, features: &Array1<f64>) -> f64 {
        features.dot(&self.coefficients) + self.intercept
    }
}

/// Gaussian elimination with partial pivoting.
///
/// Pivots below a tolerance relative to the largest entry count as zero.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    let scale = a.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    let tolerance = 1e-10 * scale;
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        let magnitude = a[[pivot, col]].abs();
        if !magnitude.is_finite() || magnitude < tolerance {
            return Err(InferenceError::training(
                "singular system; increase ridge_alpha",
            ));
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn reproduces_independent_rows_exactly() {
        let features = array![[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]];
        let targets = [3.0, 1.0, 2.0];
        let model = RidgeRegressor::fit(&features, &targets, 0.01).unwrap();
        for (row, target) in features.rows().into_iter().zip(targets) {
            assert!((model.predict(&row.to_owned()) - target).abs() < 1e-9);
        }
        // the all-zero row pins the intercept
        assert!((model.predict(&array![0.0, 0.0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn wide_systems_interpolate() {
        // more features than samples, duplicated columns
        let features = array![[1.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let model = RidgeRegressor::fit(&features, &[2.0, 1.0], 0.01).unwrap();
        let prediction = model.predict(&array![1.0, 1.0, 0.0]);
        assert!((prediction - 2.0).abs() < 1e-9, "prediction {prediction}");
    }

    #[test]
    fn recovers_a_linear_relationship() {
        // more rows than columns, so the penalised path fits it
        let features = array![[0.0], [1.0], [2.0], [3.0]];
        let targets = [1.0, 3.0, 5.0, 7.0];
        let model = RidgeRegressor::fit(&features, &targets, 1e-6).unwrap();
        assert!((model.predict(&array![4.0]) - 9.0).abs() < 1e-3);
    }

    #[test]
    fn duplicated_rows_average_their_targets() {
        let features = array![[1.0], [1.0], [0.0]];
        let model = RidgeRegressor::fit(&features, &[1.0, 3.0, 0.0], 0.01).unwrap();
        let prediction = model.predict(&array![1.0]);
        assert!((prediction - 2.0).abs() < 0.05, "prediction {prediction}");
    }

    #[test]
    fn singular_system_without_penalty_fails() {
        let features = array![[1.0], [1.0]];
        assert!(RidgeRegressor::fit(&features, &[1.0, 2.0], 0.0).is_err());
    }

    #[test]
    fn mismatched_targets_fail() {
        let features = array![[1.0], [2.0]];
        assert!(RidgeRegressor::fit(&features, &[1.0], 0.1).is_err());
    }
}
