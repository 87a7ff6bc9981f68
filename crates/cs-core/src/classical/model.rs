//! Multinomial logistic regression over sparse TF-IDF features

use super::vectorizer::SparseVector;
use crate::error::{Result, SentimentError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Optimizer settings for [`LinearModel::fit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    /// Inverse L2 regularization strength
    pub c: f64,
    /// Full-batch gradient descent iterations
    pub max_iter: usize,
    pub learning_rate: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            c: 2.0,
            max_iter: 200,
            learning_rate: 1.0,
        }
    }
}

impl FitParams {
    /// Reject settings gradient descent cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(SentimentError::Training(format!(
                "regularization C must be finite and positive, got {}",
                self.c
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(SentimentError::Training(format!(
                "learning rate must be finite and positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_iter == 0 {
            return Err(SentimentError::Training(
                "max_iter must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trained linear classifier: one weight row and intercept per class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Class labels in sorted order; row `i` of `coefficients` scores `classes[i]`
    classes: Vec<String>,
    /// Shape `(n_classes, n_features)`
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
    n_features: usize,
}

impl LinearModel {
    /// Fit with softmax cross-entropy and an L2 penalty of `1 / (C * n)` per sample
    pub fn fit(
        x: &[SparseVector],
        y: &[String],
        n_features: usize,
        params: FitParams,
    ) -> Result<Self> {
        if x.len() != y.len() {
            return Err(SentimentError::DimensionMismatch {
                expected: x.len(),
                got: y.len(),
            });
        }
        if x.is_empty() {
            return Err(SentimentError::Training(
                "cannot fit model without samples".to_string(),
            ));
        }
        if let Some(j) = x.iter().flatten().map(|&(j, _)| j).find(|&j| j >= n_features) {
            return Err(SentimentError::DimensionMismatch {
                expected: n_features,
                got: j + 1,
            });
        }
        params.validate()?;

        let mut classes: Vec<String> = y.to_vec();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(SentimentError::Training(format!(
                "need at least 2 classes, got {:?}",
                classes
            )));
        }

        let targets: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or(0))
            .collect();

        let n_classes = classes.len();
        let n = x.len() as f64;
        let alpha = 1.0 / (params.c * n);
        let lr = params.learning_rate;

        let mut model = Self {
            classes,
            coefficients: Array2::zeros((n_classes, n_features)),
            intercepts: Array1::zeros(n_classes),
            n_features,
        };

        let mut grad_w = Array2::<f64>::zeros((n_classes, n_features));
        let mut grad_b = Array1::<f64>::zeros(n_classes);

        for iter in 0..params.max_iter {
            grad_w.fill(0.0);
            grad_b.fill(0.0);
            let mut loss = 0.0;

            for (sample, &target) in x.iter().zip(&targets) {
                let mut err = softmax(&model.raw_scores(sample));
                loss -= err[target].max(1e-15).ln();
                err[target] -= 1.0;
                for &(j, v) in sample {
                    grad_w.column_mut(j).scaled_add(v, &err);
                }
                grad_b += &err;
            }

            model
                .coefficients
                .zip_mut_with(&grad_w, |w, g| *w -= lr * (g / n + alpha * *w));
            model.intercepts.scaled_add(-lr / n, &grad_b);

            if iter % 50 == 0 {
                tracing::debug!("iteration {}: mean log loss {:.6}", iter, loss / n);
            }
        }

        let finite = model.coefficients.iter().all(|w| w.is_finite())
            && model.intercepts.iter().all(|b| b.is_finite());
        if !finite {
            return Err(SentimentError::Training(format!(
                "gradient descent diverged (learning rate {}); weights are not finite",
                lr
            )));
        }

        Ok(model)
    }

    fn raw_scores(&self, x: &SparseVector) -> Array1<f64> {
        let mut scores = self.intercepts.clone();
        for &(j, v) in x {
            scores.scaled_add(v, &self.coefficients.column(j));
        }
        scores
    }

    /// Per-class scores `w_c · x + b_c`
    pub fn decision_function(&self, x: &SparseVector) -> Result<Array1<f64>> {
        if let Some(&(j, _)) = x.iter().find(|(j, _)| *j >= self.n_features) {
            return Err(SentimentError::DimensionMismatch {
                expected: self.n_features,
                got: j + 1,
            });
        }
        Ok(self.raw_scores(x))
    }

    /// Highest-scoring class; ties go to the earlier class
    pub fn predict(&self, x: &SparseVector) -> Result<&str> {
        let scores = self.decision_function(x)?;
        let mut best = 0;
        for (i, s) in scores.iter().enumerate().skip(1) {
            if *s > scores[best] {
                best = i;
            }
        }
        Ok(&self.classes[best])
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

fn softmax(z: &Array1<f64>) -> Array1<f64> {
    let max = z.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    let exp = z.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}
