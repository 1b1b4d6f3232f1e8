//! Sequential batch pipeline.
//!
//! Orchestrates the annotate run for a list of documents, one at a time:
//!   1. Send the document to the disambiguation service
//!   2. Parse the response (same-document retry on a malformed body)
//!   3. Persist the raw response as `<stem>.json`
//!   4. Aggregate mentions into the entity distribution
//!   5. Render `<stem>.tei` and `<stem>.csv`
//!
//! Per-document failures are logged and contained; the batch always moves on.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use nerdmill_common::NerdError;
use nerdmill_ner::{AnnotationResponse, EntityAggregator, QueryConfig};

use crate::documents::DocumentRef;
use crate::nerd_client::Annotator;
use crate::render::{OutputFormat, Renderer};

// ── States ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentState {
    Pending,
    Requesting,
    ParseRetry,
    Rendering,
    Done,
    SkippedOnError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriverState {
    Idle,
    Processing,
    Finished,
}

// ── Options ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub out_dir: PathBuf,
    /// Same-document retries after a malformed response; `None` never gives up.
    pub parse_retry_limit: Option<u32>,
}

impl BatchOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into(), parse_retry_limit: Some(3) }
    }
}

// ── Result summary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub state: DocumentState,
    /// Service calls made for this document.
    pub attempts: u32,
    pub entities: usize,
    pub outputs: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl DocumentReport {
    fn new(document: &DocumentRef) -> Self {
        Self {
            document: document.file_name(),
            state: DocumentState::Pending,
            attempts: 0,
            entities: 0,
            outputs: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn skip(mut self, error: NerdError) -> Self {
        self.state = DocumentState::SkippedOnError;
        self.errors.push(error.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub run_id: Uuid,
    pub profile: String,
    pub documents_total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub documents: Vec<DocumentReport>,
    pub duration_ms: u64,
}

impl BatchResult {
    /// All error messages of the run, prefixed with their document.
    pub fn errors(&self) -> Vec<String> {
        self.documents
            .iter()
            .flat_map(|d| d.errors.iter().map(move |e| format!("{}: {e}", d.document)))
            .collect()
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

pub struct BatchDriver {
    annotator: Arc<dyn Annotator>,
    aggregator: EntityAggregator,
    renderer: Renderer,
    options: BatchOptions,
    state: DriverState,
}

impl BatchDriver {
    pub fn new(
        annotator: Arc<dyn Annotator>,
        aggregator: EntityAggregator,
        renderer: Renderer,
        options: BatchOptions,
    ) -> Self {
        if options.parse_retry_limit.is_none() {
            warn!("Malformed responses are retried without limit; a persistently bad document will stall the batch");
        }
        Self { annotator, aggregator, renderer, options, state: DriverState::Idle }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Process `documents` strictly in order, one fully before the next.
    #[instrument(skip_all, fields(documents = documents.len(), profile = self.aggregator.profile().name()))]
    pub async fn run(&mut self, documents: &[DocumentRef]) -> BatchResult {
        let run_id = Uuid::new_v4();
        let t0 = Instant::now();
        self.state = DriverState::Processing;
        info!(run_id = %run_id, out_dir = %self.options.out_dir.display(), "Starting batch");

        if let Err(e) = tokio::fs::create_dir_all(&self.options.out_dir).await {
            warn!(error = %e, "Could not create output directory");
        }

        let query = self.aggregator.profile().query();
        let mut reports = Vec::with_capacity(documents.len());

        for (i, document) in documents.iter().enumerate() {
            info!(n = i + 1, total = documents.len(), document = %document.file_name(), "Processing document");
            reports.push(self.process(document, &query).await);
        }

        let processed = reports.iter().filter(|r| r.state == DocumentState::Done).count();
        let result = BatchResult {
            run_id,
            profile: self.aggregator.profile().name().to_string(),
            documents_total: documents.len(),
            processed,
            skipped: reports.len() - processed,
            documents: reports,
            duration_ms: t0.elapsed().as_millis() as u64,
        };
        self.state = DriverState::Finished;

        info!(
            run_id = %run_id,
            processed = result.processed,
            skipped = result.skipped,
            duration_ms = result.duration_ms,
            "Batch complete"
        );
        result
    }

    async fn process(&self, document: &DocumentRef, query: &QueryConfig) -> DocumentReport {
        let mut report = DocumentReport::new(document);
        report.state = DocumentState::Requesting;

        let (body, response) = loop {
            report.attempts += 1;

            let body = match self.annotator.annotate(document, query).await {
                Ok(body) => body,
                Err(e) => {
                    if e.is_service_error() {
                        warn!(document = %report.document, error = %e, "Annotation request failed, skipping");
                    } else {
                        warn!(document = %report.document, error = %e, "Could not read document, skipping");
                    }
                    return report.skip(e);
                }
            };

            match AnnotationResponse::parse(&body) {
                Ok(response) => break (body, response),
                Err(e) => {
                    let retries = report.attempts - 1;
                    if self.options.parse_retry_limit.is_some_and(|limit| retries >= limit) {
                        warn!(document = %report.document, attempts = report.attempts, "Giving up on malformed responses");
                        return report.skip(e);
                    }
                    report.state = DocumentState::ParseRetry;
                    warn!(document = %report.document, attempt = report.attempts, error = %e, "Malformed response, retrying");
                }
            }
        };

        report.state = DocumentState::Rendering;

        let json_path = self.output_path(document, "json");
        self.write_output(&json_path, &body, &mut report).await;

        let distribution = self.aggregator.aggregate(&response.entities);
        report.entities = distribution.len();
        debug!(document = %report.document, mentions = response.entities.len(), entities = distribution.len(), "Aggregated");

        for format in OutputFormat::ALL {
            let path = self.output_path(document, format.extension());
            match self.renderer.render(format, &distribution) {
                Ok(text) => self.write_output(&path, &text, &mut report).await,
                Err(e) => {
                    warn!(document = %report.document, format = format.extension(), error = %e, "Render failed");
                    report.errors.push(e.to_string());
                }
            }
        }

        report.state = DocumentState::Done;
        report
    }

    fn output_path(&self, document: &DocumentRef, extension: &str) -> PathBuf {
        self.options.out_dir.join(format!("{}.{extension}", document.stem))
    }

    async fn write_output(&self, path: &Path, contents: &str, report: &mut DocumentReport) {
        match tokio::fs::write(path, contents).await {
            Ok(()) => {
                info!(file = %path.display(), "Output written");
                report.outputs.push(path.to_path_buf());
            }
            Err(e) => {
                let msg = format!("write {} failed: {e}", path.display());
                warn!("{}", &msg);
                report.errors.push(msg);
            }
        }
    }
}
