//! (N)ERD disambiguation service client.
//!
//! Endpoint: http://localhost:8090/service/disambiguate (multipart: `query` + optional `file`)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, instrument};

use nerdmill_common::config::ServiceConfig;
use nerdmill_common::{NerdError, Result};
use nerdmill_ner::QueryConfig;

use crate::documents::{DocumentKind, DocumentRef};

/// Source of raw annotation bodies for a document.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Returns the response body on a success status. Transport failures and
    /// non-success statuses are errors.
    async fn annotate(&self, document: &DocumentRef, query: &QueryConfig) -> Result<String>;
}

pub struct NerdClient {
    url: String,
    client: Client,
}

impl NerdClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nerdmill/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { url: url.to_string(), client })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn build_form(&self, document: &DocumentRef, query: &QueryConfig) -> Result<Form> {
        match document.kind {
            DocumentKind::Pdf => {
                let bytes = tokio::fs::read(&document.path).await?;
                let part = Part::bytes(bytes)
                    .file_name(document.file_name())
                    .mime_str("application/pdf")?;
                Ok(Form::new()
                    .text("query", serde_json::to_string(query)?)
                    .part("file", part))
            }
            DocumentKind::Text => {
                let text = tokio::fs::read_to_string(&document.path).await?;
                let query = query_with_text(query, text);
                Ok(Form::new().text("query", serde_json::to_string(&query)?))
            }
        }
    }
}

/// Copy of `query` carrying the document text inline.
pub fn query_with_text(query: &QueryConfig, text: String) -> QueryConfig {
    QueryConfig { text: Some(text), ..query.clone() }
}

#[async_trait]
impl Annotator for NerdClient {
    #[instrument(skip(self, query), fields(document = %document.file_name()))]
    async fn annotate(&self, document: &DocumentRef, query: &QueryConfig) -> Result<String> {
        let form = self.build_form(document, query).await?;

        let resp = self.client.post(&self.url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Annotation service responded");

        if !status.is_success() {
            return Err(NerdError::Status { status: status.as_u16(), body });
        }
        Ok(body)
    }
}
