//! Wire model of the disambiguation service response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use nerdmill_common::{NerdError, Result};

/// Top-level body returned by the disambiguation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationResponse {
    pub entities: Vec<RawAnnotation>,
    /// Server-side processing time in milliseconds.
    #[serde(default)]
    pub runtime: Option<f64>,
}

impl AnnotationResponse {
    /// Parse a response body. Empty bodies and non-JSON payloads are
    /// reported as `MalformedResponse` so the batch driver can retry.
    pub fn parse(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Err(NerdError::MalformedResponse("empty body".to_string()));
        }
        serde_json::from_str(body).map_err(|e| NerdError::MalformedResponse(e.to_string()))
    }
}

/// One detected mention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAnnotation {
    #[serde(rename = "wikidataId", default)]
    pub entity_id: Option<String>,
    #[serde(rename = "nerd_score", default, deserialize_with = "lenient_score")]
    pub confidence: f64,
    #[serde(rename = "rawName", default)]
    pub surface_form: String,
    #[serde(rename = "preferredTerm", default)]
    pub preferred_term: Option<String>,
    #[serde(rename = "statements", default)]
    pub attributes: Vec<Attribute>,
    #[serde(rename = "taxonRank", default)]
    pub taxon_rank: Option<String>,
    #[serde(rename = "taxonName", default)]
    pub taxon_name: Option<String>,
}

impl RawAnnotation {
    /// Knowledge-base id, if present and non-blank.
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// A (property, value, label) statement attached to a mention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "propertyId")]
    pub property_id: String,
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "valueLabel", default)]
    pub value_label: Option<String>,
}

impl Attribute {
    pub fn new(property_id: &str, value: &str, value_label: Option<&str>) -> Self {
        Self {
            property_id: property_id.to_string(),
            value: Value::String(value.to_string()),
            value_label: value_label.map(String::from),
        }
    }

    /// Human-readable value: the label when the service supplied one, else the raw value.
    pub fn display_value(&self) -> Option<String> {
        if let Some(label) = self.value_label.as_deref().filter(|l| !l.is_empty()) {
            return Some(label.to_string());
        }
        match &self.value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Scores arrive as numbers or numeric strings; anything else, including
/// `NaN` and infinities, counts as 0.
fn lenient_score<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score.filter(|v| v.is_finite()).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_body() {
        let body = r#"{
            "runtime": 412,
            "entities": [
                {"rawName": "Felis catus", "wikidataId": "Q146", "nerd_score": 0.83,
                 "preferredTerm": "cat",
                 "statements": [{"propertyId": "P225", "value": "Felis catus"}]},
                {"rawName": "the", "nerd_score": "0.1"}
            ]
        }"#;
        let resp = AnnotationResponse::parse(body).unwrap();
        assert_eq!(resp.entities.len(), 2);
        assert_eq!(resp.runtime, Some(412.0));
        assert_eq!(resp.entities[0].entity_id(), Some("Q146"));
        assert_eq!(resp.entities[0].attributes[0].display_value().as_deref(), Some("Felis catus"));
        assert!(resp.entities[1].entity_id().is_none());
        assert!((resp.entities[1].confidence - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_score_coercion() {
        let a: RawAnnotation = serde_json::from_str(r#"{"wikidataId":"Q1","nerd_score":" 0.75 "}"#).unwrap();
        assert!((a.confidence - 0.75).abs() < 1e-9);

        let b: RawAnnotation = serde_json::from_str(r#"{"wikidataId":"Q1","nerd_score":"n/a"}"#).unwrap();
        assert_eq!(b.confidence, 0.0);

        let c: RawAnnotation = serde_json::from_str(r#"{"wikidataId":"Q1"}"#).unwrap();
        assert_eq!(c.confidence, 0.0);
    }

    #[test]
    fn test_non_finite_scores_coerced_to_zero() {
        for score in [r#""NaN""#, r#""nan""#, r#""inf""#, r#""-infinity""#, r#"" 1e400 ""#] {
            let body = format!(r#"{{"wikidataId":"Q1","nerd_score":{score}}}"#);
            let a: RawAnnotation = serde_json::from_str(&body).unwrap();
            assert_eq!(a.confidence, 0.0, "score {score}");
        }
    }

    #[test]
    fn test_blank_entity_id_is_absent() {
        let a = RawAnnotation { entity_id: Some("  ".to_string()), ..Default::default() };
        assert!(a.entity_id().is_none());
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(AnnotationResponse::parse(""), Err(NerdError::MalformedResponse(_))));
        assert!(matches!(AnnotationResponse::parse("<html>"), Err(NerdError::MalformedResponse(_))));
        assert!(matches!(AnnotationResponse::parse("{}"), Err(NerdError::MalformedResponse(_))));
    }

    #[test]
    fn test_attribute_value_label_preferred() {
        let attr = Attribute::new("P105", "Q7432", Some("species (taxonomic rank)"));
        assert_eq!(attr.display_value().as_deref(), Some("species (taxonomic rank)"));
        let bare = Attribute::new("P105", "Q7432", None);
        assert_eq!(bare.display_value().as_deref(), Some("Q7432"));
    }
}
