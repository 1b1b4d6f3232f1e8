//! nerdmill-eval: Scores produced entity annotations against hand-labeled gold data.
//!
//! Per-document precision/recall/F1 by label set membership, then macro and
//! micro averages over the corpus.

pub mod engine;
pub mod corpus;
pub mod gold;
pub mod observed;
pub mod report;

pub use engine::{score_document, DocumentMetrics, ObservedLabel};
pub use corpus::{score, CorpusMetrics};
pub use gold::{parse_gold, GoldRecord};
pub use observed::{parse_observed, ObservedRecord};
pub use report::{evaluate, DocumentScore, EvaluationReport};
