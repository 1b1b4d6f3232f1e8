//! Evaluation run over an output directory and its report.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument};

use nerdmill_common::Result;

use crate::corpus::{score, CorpusMetrics};
use crate::engine::{score_document, DocumentMetrics};
use crate::gold::parse_gold;
use crate::observed::parse_observed;

const MATCHING_NOTE: &str = "Note: true positives are counted by label set membership without \
one-to-one matching; duplicate or overlapping labels can inflate recall.";

#[derive(Debug, Clone, Serialize)]
pub struct DocumentScore {
    pub document_id: String,
    pub metrics: DocumentMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub category: String,
    pub documents: Vec<DocumentScore>,
    pub corpus: CorpusMetrics,
}

impl EvaluationReport {
    /// Build a report from already computed per-document metrics.
    pub fn from_scores(category: &str, documents: Vec<DocumentScore>) -> Result<Self> {
        let metrics: Vec<DocumentMetrics> = documents.iter().map(|d| d.metrics).collect();
        let corpus = score(&metrics)?;
        Ok(Self { category: category.to_string(), documents, corpus })
    }

    /// Generate a human-readable report.
    pub fn render(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("\n=== Evaluation ({}) ===\n\n", self.category));
        for doc in &self.documents {
            let m = &doc.metrics;
            report.push_str(&format!(
                "{}\tobserved={} expected={} tp={} fp={}\tP={:.4} R={:.4} F1={:.4}\n",
                doc.document_id,
                m.observed_count,
                m.expected_count,
                m.true_positive,
                m.false_positive,
                m.precision(),
                m.recall(),
                m.f1()
            ));
        }
        let c = &self.corpus;
        report.push('\n');
        report.push_str(&format!("Documents: {}\n", c.documents));
        report.push_str(&format!(
            "Macro: P={:.4} R={:.4} F1={:.4}\n",
            c.macro_precision, c.macro_recall, c.macro_f1
        ));
        report.push_str(&format!(
            "Micro: P={:.4} R={:.4} F1={:.4} (tp={}, observed={}, expected={})\n",
            c.micro_precision, c.micro_recall, c.micro_f1, c.true_positive, c.observed, c.expected
        ));
        report.push('\n');
        report.push_str(MATCHING_NOTE);
        report.push('\n');
        report
    }
}

/// Score every gold document against `<output_dir>/<stem>.csv`.
///
/// A missing gold file or entity file aborts the run.
#[instrument(skip_all, fields(gold = %gold_path.display(), category = %category))]
pub fn evaluate(gold_path: &Path, output_dir: &Path, category: &str) -> Result<EvaluationReport> {
    let gold = parse_gold(&std::fs::read_to_string(gold_path)?)?;
    info!(documents = gold.len(), "Gold file loaded");

    let mut documents = Vec::with_capacity(gold.len());
    for record in &gold {
        let stem = Path::new(&record.document_id)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| record.document_id.clone());
        let csv_path = output_dir.join(format!("{stem}.csv"));

        let text = std::fs::read_to_string(&csv_path).map_err(|e| {
            std::io::Error::new(e.kind(), format!("{}: {e}", csv_path.display()))
        })?;
        let observed = parse_observed(&record.document_id, &text, category)?;
        let metrics = score_document(&observed.candidates, &record.labels);

        debug!(
            document = %record.document_id,
            tp = metrics.true_positive,
            observed = metrics.observed_count,
            expected = metrics.expected_count,
            "Document scored"
        );

        documents.push(DocumentScore { document_id: record.document_id.clone(), metrics });
    }

    let report = EvaluationReport::from_scores(category, documents)?;
    info!(
        micro_f1 = report.corpus.micro_f1,
        macro_f1 = report.corpus.macro_f1,
        "Evaluation complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> EvaluationReport {
        let doc = |id: &str, observed, expected, tp| DocumentScore {
            document_id: id.to_string(),
            metrics: DocumentMetrics {
                observed_count: observed,
                expected_count: expected,
                true_positive: tp,
                false_positive: observed - tp,
            },
        };
        EvaluationReport::from_scores("species", vec![doc("a.pdf", 2, 2, 1), doc("b.pdf", 3, 4, 3)]).unwrap()
    }

    #[test]
    fn test_render_lists_documents_and_averages() {
        let text = report().render();
        assert!(text.contains("=== Evaluation (species) ==="));
        assert!(text.contains("a.pdf\tobserved=2 expected=2 tp=1 fp=1\tP=0.5000 R=0.5000 F1=0.5000"));
        assert!(text.contains("Documents: 2"));
        assert!(text.contains("Micro: P=0.8000 R=0.6667"));
        assert!(text.contains("set membership"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["category"], "species");
        assert_eq!(json["documents"][1]["document_id"], "b.pdf");
        assert_eq!(json["documents"][1]["metrics"]["true_positive"], 3);
        assert_eq!(json["corpus"]["documents"], 2);
    }

    #[test]
    fn test_empty_report_is_rejected() {
        assert!(EvaluationReport::from_scores("species", Vec::new()).is_err());
    }
}
