//! nerdmill-ingestion: Document batch pipeline.
//! Covers the annotate run:
//! - Document discovery in an input directory
//! - (N)ERD disambiguation service client (multipart upload)
//! - Entity distribution rendering (TEI standoff, tab-separated)
//! - Sequential batch driver with bounded retry on malformed responses

pub mod documents;
pub mod nerd_client;
pub mod render;
pub mod pipeline;

pub use documents::{discover, DocumentKind, DocumentRef};
pub use nerd_client::{Annotator, NerdClient};
pub use render::{OutputFormat, Renderer};
pub use pipeline::{BatchDriver, BatchOptions, BatchResult, DocumentReport, DocumentState, DriverState};
