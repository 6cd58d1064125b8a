//! Multinomial logistic regression trained by batch gradient descent.

use ndarray::{Array1, Array2, Axis};

/// Softmax classifier over dense feature vectors.
///
/// Weights are `n_classes x n_features`; training is full-batch gradient
/// descent on the cross-entropy loss with early stopping once the weight
/// delta falls under the tolerance.
#[derive(Debug, Clone)]
pub struct SoftmaxClassifier {
    weights: Option<Array2<f64>>,
    biases: Option<Array1<f64>>,
    n_classes: usize,
    learning_rate: f64,
    max_iter: usize,
    tolerance: f64,
}

impl SoftmaxClassifier {
    pub fn new(n_classes: usize) -> Self {
        Self {
            weights: None,
            biases: None,
            n_classes,
            learning_rate: 0.5,
            max_iter: 1000,
            tolerance: 1e-6,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }

    fn softmax(logits: &Array1<f64>) -> Array1<f64> {
        let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp = logits.mapv(|z| (z - max).exp());
        let sum = exp.sum();
        exp / sum
    }

    /// Fit on a document-term matrix and class indexes (`0..n_classes`).
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize]) {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        let mut weights = Array2::<f64>::zeros((self.n_classes, n_features));
        let mut biases = Array1::<f64>::zeros(self.n_classes);

        let mut y_onehot = Array2::<f64>::zeros((n_samples, self.n_classes));
        for (row, &class) in y.iter().enumerate() {
            if class < self.n_classes {
                y_onehot[[row, class]] = 1.0;
            }
        }

        for _ in 0..self.max_iter {
            // Forward pass: probabilities per sample
            let mut proba = Array2::<f64>::zeros((n_samples, self.n_classes));
            for (row, sample) in x.rows().into_iter().enumerate() {
                let logits = weights.dot(&sample.to_owned()) + &biases;
                proba.row_mut(row).assign(&Self::softmax(&logits));
            }

            // Gradient step
            let errors = &proba - &y_onehot;
            let grad_w = errors.t().dot(x) / n_samples as f64;
            let grad_b = errors.sum_axis(Axis(0)) / n_samples as f64;

            let step = &grad_w * self.learning_rate;
            weights = &weights - &step;
            biases = &biases - &(&grad_b * self.learning_rate);

            let delta: f64 = step.iter().map(|g| g.abs()).sum();
            if delta < self.tolerance {
                break;
            }
        }

        self.weights = Some(weights);
        self.biases = Some(biases);
    }

    /// Class probabilities for each row of `x`. Panics if not fitted;
    /// callers go through [`crate::classify::ClusterModel`], which fits first.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Array2<f64> {
        let weights = self.weights.as_ref().expect("classifier is fitted");
        let biases = self.biases.as_ref().expect("classifier is fitted");

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (row, sample) in x.rows().into_iter().enumerate() {
            let logits = weights.dot(&sample.to_owned()) + biases;
            proba.row_mut(row).assign(&Self::softmax(&logits));
        }
        proba
    }

    /// Most probable class index per row.
    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        self.predict_proba(x)
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(idx, _)| idx)
                    .unwrap_or(0)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let proba = SoftmaxClassifier::softmax(&Array1::from_vec(vec![1.0, 2.0, 3.0]));
        assert!((proba.sum() - 1.0).abs() < 1e-9);
        assert!(proba[2] > proba[1] && proba[1] > proba[0]);
    }

    #[test]
    fn test_fit_separable_three_classes() {
        // Three well-separated clusters on orthogonal axes
        let x = Array2::from_shape_vec(
            (6, 3),
            vec![
                1.0, 0.0, 0.0, //
                0.9, 0.1, 0.0, //
                0.0, 1.0, 0.0, //
                0.1, 0.9, 0.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.1, 0.9,
            ],
        )
        .unwrap();
        let y = vec![0, 0, 1, 1, 2, 2];

        let mut model = SoftmaxClassifier::new(3);
        model.fit(&x, &y);

        assert!(model.is_fitted());
        assert_eq!(model.predict(&x), y);
    }

    #[test]
    fn test_predict_unseen_sample() {
        let x = Array2::from_shape_vec((4, 2), vec![1.0, 0.0, 0.8, 0.2, 0.0, 1.0, 0.2, 0.8])
            .unwrap();
        let y = vec![0, 0, 1, 1];

        let mut model = SoftmaxClassifier::new(2);
        model.fit(&x, &y);

        let unseen = Array2::from_shape_vec((1, 2), vec![0.9, 0.1]).unwrap();
        assert_eq!(model.predict(&unseen), vec![0]);
    }
}
