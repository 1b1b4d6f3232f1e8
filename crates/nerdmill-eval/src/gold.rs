//! Gold annotation file parsing.
//!
//! Tab-separated; a non-empty first column opens a document block, the second
//! column of each row holds one expected label:
//!
//! ```text
//! paper-01.pdf
//! 	Felis catus
//! 	Canis lupus
//! paper-02.pdf	Mus musculus
//! ```

use std::collections::HashSet;

use serde::Serialize;

use nerdmill_common::{NerdError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoldRecord {
    pub document_id: String,
    /// Lowercased expected labels.
    pub labels: HashSet<String>,
}

pub fn parse_gold(text: &str) -> Result<Vec<GoldRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut records: Vec<GoldRecord> = Vec::new();

    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let document_id = row.get(0).map(str::trim).unwrap_or("");
        let label = row.get(1).map(str::trim).unwrap_or("");

        if !document_id.is_empty() {
            records.push(GoldRecord {
                document_id: document_id.to_string(),
                labels: HashSet::new(),
            });
        }

        if label.is_empty() {
            continue;
        }

        match records.last_mut() {
            Some(current) => {
                current.labels.insert(label.to_lowercase());
            }
            None => {
                return Err(NerdError::InvalidInput(format!(
                    "gold label '{label}' on row {} precedes any document id",
                    line + 1
                )));
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_split_on_first_column() {
        let text = "doc1.pdf\n\tFelis catus\n\tCanis Lupus\ndoc2.pdf\tMus musculus\n\tmus musculus\ndoc3.pdf\n";
        let gold = parse_gold(text).unwrap();
        assert_eq!(gold.len(), 3);
        assert_eq!(gold[0].document_id, "doc1.pdf");
        assert!(gold[0].labels.contains("felis catus"));
        assert!(gold[0].labels.contains("canis lupus"));
        assert_eq!(gold[1].labels.len(), 1);
        assert!(gold[2].labels.is_empty());
    }

    #[test]
    fn test_label_before_document_is_invalid() {
        let err = parse_gold("\tFelis catus\ndoc1\n").unwrap_err();
        assert!(matches!(err, NerdError::InvalidInput(_)));
    }

    #[test]
    fn test_blank_labels_and_extra_columns() {
        let gold = parse_gold("doc1\n\t\n\tHomo sapiens\tQ15978631\n").unwrap();
        assert_eq!(gold[0].labels.len(), 1);
        assert!(gold[0].labels.contains("homo sapiens"));
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_gold("").unwrap().is_empty());
    }
}
