//! Validation metrics for the statistical classifier

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Precision, recall and F1 for one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true instances of this label
    pub support: usize,
}

/// Averaged precision, recall and F1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Accuracy plus per-class metrics over a validation set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub per_class: Vec<ClassMetrics>,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ClassificationReport {
    /// Compare expected labels with predictions. Labels are the sorted union of both.
    pub fn from_predictions<S: AsRef<str>, T: AsRef<str>>(y_true: &[S], y_pred: &[T]) -> Self {
        let total = y_true.len().min(y_pred.len());
        let pairs: Vec<(&str, &str)> = y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| (t.as_ref(), p.as_ref()))
            .collect();

        let labels: BTreeSet<&str> = pairs.iter().flat_map(|(t, p)| [*t, *p]).collect();

        let per_class: Vec<ClassMetrics> = labels
            .iter()
            .map(|&label| {
                let tp = pairs.iter().filter(|(t, p)| *t == label && *p == label).count();
                let predicted = pairs.iter().filter(|(_, p)| *p == label).count();
                let support = pairs.iter().filter(|(t, _)| *t == label).count();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let correct = pairs.iter().filter(|(t, p)| t == p).count();
        let n_labels = per_class.len().max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: per_class.iter().map(|m| m.precision).sum::<f64>() / n_labels,
            recall: per_class.iter().map(|m| m.recall).sum::<f64>() / n_labels,
            f1: per_class.iter().map(|m| m.f1).sum::<f64>() / n_labels,
        };
        let weight = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                per_class
                    .iter()
                    .map(|m| f(m) * m.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        let weighted_avg = AverageMetrics {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1: weight(|m| m.f1),
        };

        Self {
            accuracy: ratio(correct, total),
            per_class,
            macro_avg,
            weighted_avg,
            total,
        }
    }

    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.per_class.iter().find(|m| m.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .iter()
            .map(|m| m.label.len())
            .chain([12])
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            width = width
        )?;
        writeln!(f)?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label,
                m.precision,
                m.recall,
                m.f1,
                m.support,
                width = width
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total,
            width = width
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name,
                avg.precision,
                avg.recall,
                avg.f1,
                self.total,
                width = width
            )?;
        }
        Ok(())
    }
}
