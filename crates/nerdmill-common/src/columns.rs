//! Header names of the tab-separated entity file, shared by the renderer and the evaluator.

pub const ID: &str = "id";
pub const CONFIDENCE: &str = "confidence";
pub const RANK: &str = "rank";
pub const TAXON_NAME: &str = "taxon_name";
pub const PREFERRED_TERM: &str = "preferred_term";
pub const SURFACE_FORMS: &str = "surface_forms";
pub const MENTIONS: &str = "mentions";

/// Separator between surface forms inside one cell.
pub const SURFACE_FORM_SEPARATOR: &str = ", ";
