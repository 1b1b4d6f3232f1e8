//! Corpus-wide macro and micro averages.

use serde::{Deserialize, Serialize};

use nerdmill_common::{NerdError, Result};

use crate::engine::{f1, ratio, DocumentMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorpusMetrics {
    pub documents: usize,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    pub micro_precision: f64,
    pub micro_recall: f64,
    pub micro_f1: f64,
    pub true_positive: usize,
    pub observed: usize,
    pub expected: usize,
}

/// Score a corpus.
///
/// Macro averages each document's precision and recall equally; micro pools
/// the counts so larger documents weigh more.
pub fn score(per_document: &[DocumentMetrics]) -> Result<CorpusMetrics> {
    if per_document.is_empty() {
        return Err(NerdError::InvalidInput(
            "cannot score an empty corpus".to_string(),
        ));
    }

    let n = per_document.len() as f64;
    let macro_precision = per_document.iter().map(DocumentMetrics::precision).sum::<f64>() / n;
    let macro_recall = per_document.iter().map(DocumentMetrics::recall).sum::<f64>() / n;

    let true_positive: usize = per_document.iter().map(|m| m.true_positive).sum();
    let observed: usize = per_document.iter().map(|m| m.observed_count).sum();
    let expected: usize = per_document.iter().map(|m| m.expected_count).sum();
    let micro_precision = ratio(true_positive, observed);
    let micro_recall = ratio(true_positive, expected);

    Ok(CorpusMetrics {
        documents: per_document.len(),
        macro_precision,
        macro_recall,
        macro_f1: f1(macro_precision, macro_recall),
        micro_precision,
        micro_recall,
        micro_f1: f1(micro_precision, micro_recall),
        true_positive,
        observed,
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tp: usize, obs: usize, exp: usize) -> DocumentMetrics {
        DocumentMetrics {
            observed_count: obs,
            expected_count: exp,
            true_positive: tp,
            false_positive: obs - tp,
        }
    }

    #[test]
    fn test_two_document_corpus() {
        let c = score(&[doc(1, 2, 2), doc(3, 3, 4)]).unwrap();
        assert!((c.micro_precision - 0.8).abs() < 1e-9);
        assert!((c.macro_precision - 0.75).abs() < 1e-9);
        // recall: micro 4/6, macro mean(0.5, 0.75)
        assert!((c.micro_recall - 4.0 / 6.0).abs() < 1e-9);
        assert!((c.macro_recall - 0.625).abs() < 1e-9);
        let expected_macro_f1 = 2.0 * 0.75 * 0.625 / (0.75 + 0.625);
        assert!((c.macro_f1 - expected_macro_f1).abs() < 1e-9);
        assert_eq!(c.documents, 2);
    }

    #[test]
    fn test_micro_precision_is_pooled_ratio() {
        let docs = [doc(0, 5, 1), doc(2, 2, 9), doc(7, 10, 7), doc(0, 0, 3)];
        let c = score(&docs).unwrap();
        assert_eq!(c.true_positive, 9);
        assert_eq!(c.observed, 17);
        assert!((c.micro_precision - 9.0 / 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_corpus_is_invalid_input() {
        assert!(matches!(score(&[]), Err(NerdError::InvalidInput(_))));
    }

    #[test]
    fn test_all_zero_corpus() {
        let c = score(&[doc(0, 0, 0)]).unwrap();
        assert_eq!(c.micro_f1, 0.0);
        assert_eq!(c.macro_f1, 0.0);
    }
}
