//! Entity aggregation for one document.
//!
//! Folds the raw mention stream returned by the disambiguation service into:
//! - one entry per knowledge-base id (mention counts, distinct surface forms)
//! - the best confidence seen for that id
//! - profile fields lifted from statements (taxon rank, taxon name)
//!
//! The accumulation map lives for a single call; nothing is shared between documents.

use ahash::AHashMap;
use serde::Serialize;
use tracing::debug;

use crate::annotation::RawAnnotation;
use crate::profile::{Profile, TargetField};

/// One distinct entity within a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedEntity {
    pub entity_id: String,
    pub confidence: f64,
    /// Distinct surface forms in first-seen order.
    pub surface_forms: Vec<String>,
    pub mention_count: usize,
    pub preferred_term: Option<String>,
    pub rank: Option<String>,
    pub taxon_name: Option<String>,
}

impl AggregatedEntity {
    /// Best display label: taxon name, then preferred term, then first surface form.
    pub fn label(&self) -> &str {
        self.taxon_name
            .as_deref()
            .or(self.preferred_term.as_deref())
            .or(self.surface_forms.first().map(String::as_str))
            .unwrap_or(&self.entity_id)
    }
}

/// Entities of one document, best confidence first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntityDistribution {
    entities: Vec<AggregatedEntity>,
}

impl EntityDistribution {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregatedEntity> {
        self.entities.iter()
    }

    pub fn as_slice(&self) -> &[AggregatedEntity] {
        &self.entities
    }

    pub fn get(&self, entity_id: &str) -> Option<&AggregatedEntity> {
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }
}

impl<'a> IntoIterator for &'a EntityDistribution {
    type Item = &'a AggregatedEntity;
    type IntoIter = std::slice::Iter<'a, AggregatedEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

/// Profile-bound aggregator, reusable across documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityAggregator {
    profile: Profile,
}

impl EntityAggregator {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn aggregate(&self, raw: &[RawAnnotation]) -> EntityDistribution {
        aggregate(raw, self.profile)
    }
}

#[derive(Debug, Default)]
struct ProfileFields {
    rank: Option<String>,
    taxon_name: Option<String>,
    /// Set when the value came from the mention itself rather than a statement.
    explicit_rank: bool,
    explicit_taxon_name: bool,
}

/// Fill a still-missing field, or replace a statement-derived one with an
/// explicit value.
fn merge_field(slot: &mut Option<String>, slot_explicit: &mut bool, value: Option<String>, explicit: bool) {
    let Some(value) = value else {
        return;
    };
    if slot.is_none() || (explicit && !*slot_explicit) {
        *slot = Some(value);
        *slot_explicit = explicit;
    }
}

/// Build the entity distribution for one document.
pub fn aggregate(raw: &[RawAnnotation], profile: Profile) -> EntityDistribution {
    // Arena of entities plus id -> slot index, preserving first-appearance order.
    let mut entities: Vec<AggregatedEntity> = Vec::new();
    // Per slot: (rank explicit, taxon name explicit).
    let mut explicit: Vec<(bool, bool)> = Vec::new();
    let mut index: AHashMap<&str, usize> = AHashMap::new();
    let mut skipped = 0usize;

    for item in raw {
        let Some(entity_id) = item.entity_id() else {
            skipped += 1;
            continue;
        };

        let fields = extract_fields(item, profile);

        match index.get(entity_id).copied() {
            None => {
                index.insert(entity_id, entities.len());
                explicit.push((fields.explicit_rank, fields.explicit_taxon_name));
                let mut surface_forms = Vec::new();
                if !item.surface_form.is_empty() {
                    surface_forms.push(item.surface_form.clone());
                }
                entities.push(AggregatedEntity {
                    entity_id: entity_id.to_string(),
                    confidence: item.confidence,
                    surface_forms,
                    mention_count: 1,
                    preferred_term: non_empty(item.preferred_term.as_deref()),
                    rank: fields.rank,
                    taxon_name: fields.taxon_name,
                });
            }
            Some(slot) => {
                let existing = &mut entities[slot];
                existing.mention_count += 1;
                // f64::max ignores a NaN operand.
                existing.confidence = existing.confidence.max(item.confidence);
                if !item.surface_form.is_empty()
                    && !existing.surface_forms.iter().any(|s| s == &item.surface_form)
                {
                    existing.surface_forms.push(item.surface_form.clone());
                }
                if existing.preferred_term.is_none() {
                    existing.preferred_term = non_empty(item.preferred_term.as_deref());
                }
                let (rank_explicit, name_explicit) = &mut explicit[slot];
                merge_field(&mut existing.rank, rank_explicit, fields.rank, fields.explicit_rank);
                merge_field(
                    &mut existing.taxon_name,
                    name_explicit,
                    fields.taxon_name,
                    fields.explicit_taxon_name,
                );
            }
        }
    }

    // Vec::sort_by is stable: equal confidences keep first-appearance order.
    entities.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    debug!(
        mentions = raw.len(),
        skipped,
        entities = entities.len(),
        profile = profile.name(),
        "Entity distribution built"
    );

    EntityDistribution { entities }
}

fn extract_fields(item: &RawAnnotation, profile: Profile) -> ProfileFields {
    let mut fields = ProfileFields::default();

    for attr in &item.attributes {
        let Some(mapping) = profile
            .property_fields()
            .iter()
            .find(|f| f.property_id == attr.property_id)
        else {
            continue;
        };
        let Some(mut value) = attr.display_value() else {
            continue;
        };
        if let Some(qualifier) = mapping.strip {
            value = value.replace(qualifier, "");
        }
        let slot = match mapping.target {
            TargetField::Rank => &mut fields.rank,
            TargetField::TaxonName => &mut fields.taxon_name,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    // Values attached directly to the mention win over statement-derived ones.
    if profile == Profile::Species {
        if let Some(rank) = non_empty(item.taxon_rank.as_deref()) {
            fields.rank = Some(rank);
            fields.explicit_rank = true;
        }
        if let Some(name) = non_empty(item.taxon_name.as_deref()) {
            fields.taxon_name = Some(name);
            fields.explicit_taxon_name = true;
        }
    }

    fields
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}
