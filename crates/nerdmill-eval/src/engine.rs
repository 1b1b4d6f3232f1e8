//! Per-document scoring.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One observed candidate: canonical label plus the raw text it was found as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservedLabel {
    pub canonical: String,
    pub raw: String,
}

impl ObservedLabel {
    pub fn new(canonical: &str, raw: &str) -> Self {
        Self {
            canonical: canonical.trim().to_lowercase(),
            raw: raw.trim().to_lowercase(),
        }
    }

    fn matches(&self, gold: &HashSet<String>) -> bool {
        gold.contains(&self.canonical) || gold.contains(&self.raw)
    }
}

/// Raw counts for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetrics {
    pub observed_count: usize,
    pub expected_count: usize,
    pub true_positive: usize,
    pub false_positive: usize,
}

impl DocumentMetrics {
    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.observed_count)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.expected_count)
    }

    pub fn f1(&self) -> f64 {
        f1(self.precision(), self.recall())
    }
}

/// Count true/false positives by set membership.
///
/// A candidate is a hit when either of its label forms is in the gold set.
/// There is no one-to-one matching, so several candidates may hit the same
/// gold label.
pub fn score_document(observed: &HashSet<ObservedLabel>, gold: &HashSet<String>) -> DocumentMetrics {
    let true_positive = observed.iter().filter(|o| o.matches(gold)).count();
    DocumentMetrics {
        observed_count: observed.len(),
        expected_count: gold.len(),
        true_positive,
        false_positive: observed.len() - true_positive,
    }
}

/// `num / den`, 0 when `den` is 0.
pub(crate) fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Harmonic mean of precision and recall, 0 if either is 0.
pub fn f1(precision: f64, recall: f64) -> f64 {
    if precision <= 0.0 || recall <= 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}
