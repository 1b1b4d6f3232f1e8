//! Annotation profiles: which entities are requested from the service and which
//! statement properties are lifted onto the aggregated entity.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use nerdmill_common::{NerdError, Result};

/// Wikidata property "taxon rank".
pub const PROP_TAXON_RANK: &str = "P105";
/// Wikidata property "taxon name".
pub const PROP_TAXON_NAME: &str = "P225";

/// Named filter configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Generic,
    Species,
}

/// Field of `AggregatedEntity` a statement property feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    Rank,
    TaxonName,
}

/// Mapping from one statement property to one entity field.
#[derive(Debug, Clone, Copy)]
pub struct PropertyField {
    pub property_id: &'static str,
    pub target: TargetField,
    /// Qualifier removed from the value label before storage.
    pub strip: Option<&'static str>,
}

const SPECIES_FIELDS: &[PropertyField] = &[
    PropertyField {
        property_id: PROP_TAXON_RANK,
        target: TargetField::Rank,
        strip: Some(" (taxonomic rank)"),
    },
    PropertyField {
        property_id: PROP_TAXON_NAME,
        target: TargetField::TaxonName,
        strip: None,
    },
];

impl Profile {
    /// Resolve an optional CLI profile name; `None` is the generic profile.
    pub fn from_name(name: Option<&str>) -> Result<Self> {
        match name {
            None => Ok(Profile::Generic),
            Some(n) => n.parse(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Profile::Generic => "generic",
            Profile::Species => "species",
        }
    }

    pub fn property_fields(&self) -> &'static [PropertyField] {
        match self {
            Profile::Generic => &[],
            Profile::Species => SPECIES_FIELDS,
        }
    }

    /// Query sent with every document for this profile.
    pub fn query(&self) -> QueryConfig {
        let mut query = QueryConfig::default();
        if *self == Profile::Species {
            query.filter = Some(QueryFilter::property(PROP_TAXON_NAME));
        }
        query
    }
}

impl FromStr for Profile {
    type Err = NerdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "generic" => Ok(Profile::Generic),
            "species" => Ok(Profile::Species),
            other => Err(NerdError::InvalidInput(format!("unknown profile: {other}"))),
        }
    }
}

// ── Service query ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    pub language: QueryLanguage,
    #[serde(rename = "onlyNER")]
    pub only_ner: bool,
    pub result_languages: Vec<String>,
    pub nbest: bool,
    pub customisation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<QueryFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_selector_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<bool>,
    /// Inline text for documents that are not uploaded as files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            language: QueryLanguage { lang: "en".to_string() },
            only_ner: false,
            result_languages: vec!["de".to_string(), "fr".to_string()],
            nbest: false,
            customisation: "generic".to_string(),
            filter: None,
            min_selector_score: None,
            full: None,
            text: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryLanguage {
    pub lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryFilter {
    pub property: PropertyRef,
}

impl QueryFilter {
    pub fn property(id: &str) -> Self {
        Self { property: PropertyRef { id: id.to_string() } }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRef {
    pub id: String,
}
