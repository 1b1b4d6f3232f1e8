//! Reads the tab-separated entity files written by the annotate run.

use std::collections::HashSet;

use serde::Serialize;

use nerdmill_common::columns;
use nerdmill_common::{NerdError, Result};

use crate::engine::ObservedLabel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedRecord {
    pub document_id: String,
    pub candidates: HashSet<ObservedLabel>,
}

/// Parse one entity file, keeping rows whose rank equals `category`.
pub fn parse_observed(document_id: &str, text: &str, category: &str) -> Result<ObservedRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    if column(columns::ID).is_none() {
        return Err(NerdError::InvalidInput(format!(
            "entity file for {document_id} has no '{}' column",
            columns::ID
        )));
    }
    let rank_col = column(columns::RANK);
    let taxon_col = column(columns::TAXON_NAME);
    let term_col = column(columns::PREFERRED_TERM);
    let forms_col = column(columns::SURFACE_FORMS);

    let mut candidates = HashSet::new();

    // Without a rank column no row can carry the category.
    let Some(rank_col) = rank_col else {
        return Ok(ObservedRecord { document_id: document_id.to_string(), candidates });
    };

    for row in reader.records() {
        let row = row?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let in_category = cell(Some(rank_col))
            .map(|rank| rank.eq_ignore_ascii_case(category))
            .unwrap_or(false);
        if !in_category {
            continue;
        }

        let raw = cell(forms_col).and_then(|forms| {
            forms
                .split(columns::SURFACE_FORM_SEPARATOR)
                .map(str::trim)
                .find(|f| !f.is_empty())
        });
        let canonical = cell(taxon_col).or(cell(term_col)).or(raw);

        if let Some(canonical) = canonical {
            candidates.insert(ObservedLabel::new(canonical, raw.unwrap_or(canonical)));
        }
    }

    Ok(ObservedRecord { document_id: document_id.to_string(), candidates })
}
