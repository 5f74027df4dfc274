use crate::error::{InferenceError, Result};
use crate::types::ShapeKind;
use ndarray::{Array1, Array2, Axis};

/// Multinomial logistic regression over the shape kinds seen in training.
#[derive(Debug, Clone)]
pub struct ShapeClassifier {
    classes: Vec<ShapeKind>,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl ShapeClassifier {
    /// Fit with full-batch gradient descent on the cross-entropy loss.
    ///
    /// Classes are ordered by [`ShapeKind::ALL`], so ties in the posterior
    /// resolve to the earlier kind.
    pub fn fit(
        features: &Array2<f64>,
        labels: &[ShapeKind],
        epochs: usize,
        learning_rate: f64,
        l2: f64,
    ) -> Result<Self> {
        let n_samples = features.nrows();
        if n_samples == 0 || n_samples != labels.len() {
            return Err(InferenceError::training(format!(
                "classifier needs one label per row ({n_samples} rows, {} labels)",
                labels.len()
            )));
        }

        let classes: Vec<ShapeKind> = ShapeKind::ALL
            .into_iter()
            .filter(|kind| labels.contains(kind))
            .collect();
        let n_features = features.ncols();
        let n_classes = classes.len();

        let mut targets = Array2::<f64>::zeros((n_samples, n_classes));
        for (row, label) in labels.iter().enumerate() {
            let col = classes
                .iter()
                .position(|kind| kind == label)
                .ok_or_else(|| InferenceError::training("label missing from class list"))?;
            targets[[row, col]] = 1.0;
        }

        let mut weights = Array2::<f64>::zeros((n_features, n_classes));
        let mut bias = Array1::<f64>::zeros(n_classes);
        let scale = 1.0 / n_samples as f64;

        for _ in 0..epochs {
            let mut logits = features.dot(&weights);
            logits += &bias;
            let probs = softmax_rows(logits);
            let error = probs - &targets;

            let grad_w = features.t().dot(&error) * scale + &weights * l2;
            let grad_b = error.sum_axis(Axis(0)) * scale;

            weights.scaled_add(-learning_rate, &grad_w);
            bias.scaled_add(-learning_rate, &grad_b);
        }

        if weights.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err(InferenceError::training(
                "classifier diverged; lower the learning rate",
            ));
        }

        Ok(Self {
            classes,
            weights,
            bias,
        })
    }

    /// Posterior for every class seen in training.
    #[must_use]
    pub fn predict_proba(&self, features: &Array1<f64>) -> Vec<(ShapeKind, f64)> {
        let logits = features.dot(&self.weights) + &self.bias;
        let probs = softmax(&logits);
        self.classes.iter().copied().zip(probs).collect()
    }

    /// Most probable class and its posterior.
    #[must_use]
    pub fn predict(&self, features: &Array1<f64>) -> (ShapeKind, f64) {
        self.predict_proba(features)
            .into_iter()
            .fold(None, |best: Option<(ShapeKind, f64)>, candidate| match best {
                Some(current) if current.1 >= candidate.1 => Some(current),
                _ => Some(candidate),
            })
            .unwrap_or((ShapeKind::ALL[0], 0.0))
    }

    #[must_use]
    pub fn classes(&self) -> &[ShapeKind] {
        &self.classes
    }
}

fn softmax(logits: &Array1<f64>) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|v| (v - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|v| v / total).collect()
}

fn softmax_rows(mut logits: Array2<f64>) -> Array2<f64> {
    for mut row in logits.rows_mut() {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|v| (v - max).exp());
        let total = row.sum();
        row /= total;
    }
    logits
}
