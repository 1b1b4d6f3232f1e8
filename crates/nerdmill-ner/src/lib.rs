//! Raw (N)ERD annotations and their consolidation into per-document entity distributions.
//!
//! The disambiguation service returns one record per detected mention. This crate
//! models those records, the per-profile query sent to the service, and the
//! aggregation that folds mentions into one ranked entry per knowledge-base id.

pub mod annotation;
pub mod profile;
pub mod aggregator;

pub use annotation::{AnnotationResponse, Attribute, RawAnnotation};
pub use profile::{Profile, QueryConfig};
pub use aggregator::{aggregate, AggregatedEntity, EntityAggregator, EntityDistribution};
