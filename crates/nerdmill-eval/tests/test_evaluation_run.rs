//! Evaluation over an output directory written the way the annotate run writes it.

use std::fs;

use nerdmill_common::NerdError;
use nerdmill_eval::evaluate;

const HEADER: &str = "id\tconfidence\trank\ttaxon_name\tsurface_forms\tmentions\n";

#[test]
fn test_evaluate_two_documents() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path();

    fs::write(
        out.join("paper-01.csv"),
        format!(
            "# generated\n{HEADER}\
Q146\t0.9\tspecies\tFelis catus\tcat\t2\n\
Q144\t0.8\tspecies\tCanis familiaris\tdog\t1\n"
        ),
    )
    .unwrap();
    fs::write(
        out.join("paper-02.csv"),
        format!(
            "{HEADER}\
Q83310\t0.9\tspecies\tMus musculus\tmouse\t4\n\
Q184224\t0.6\tspecies\tRattus norvegicus\trat\t1\n\
Q15978631\t0.5\tspecies\tHomo sapiens\thuman\t2\n"
        ),
    )
    .unwrap();

    let gold = out.join("gold.tsv");
    fs::write(
        &gold,
        "paper-01.pdf\n\tcat\n\tpanthera leo\n\
paper-02.pdf\n\tmus musculus\n\trattus norvegicus\n\thomo sapiens\n\tdanio rerio\n",
    )
    .unwrap();

    let report = evaluate(&gold, out, "species").unwrap();
    assert_eq!(report.documents.len(), 2);

    let first = &report.documents[0].metrics;
    assert_eq!((first.true_positive, first.observed_count, first.expected_count), (1, 2, 2));
    let second = &report.documents[1].metrics;
    assert_eq!((second.true_positive, second.observed_count, second.expected_count), (3, 3, 4));

    assert!((report.corpus.micro_precision - 0.8).abs() < 1e-9);
    assert!((report.corpus.macro_precision - 0.75).abs() < 1e-9);

    let text = report.render();
    assert!(text.contains("paper-02.pdf"));
    assert!(text.contains("Micro: P=0.8000"));
    assert!(text.contains("set membership"));
}

#[test]
fn test_missing_entity_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let gold = dir.path().join("gold.tsv");
    fs::write(&gold, "absent.pdf\n\tcat\n").unwrap();

    let err = evaluate(&gold, dir.path(), "species").unwrap_err();
    assert!(matches!(err, NerdError::Io(_)));
}

#[test]
fn test_missing_gold_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = evaluate(&dir.path().join("nope.tsv"), dir.path(), "species").unwrap_err();
    assert!(matches!(err, NerdError::Io(_)));
}

#[test]
fn test_empty_gold_file_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let gold = dir.path().join("gold.tsv");
    fs::write(&gold, "").unwrap();
    let err = evaluate(&gold, dir.path(), "species").unwrap_err();
    assert!(matches!(err, NerdError::InvalidInput(_)));
}
