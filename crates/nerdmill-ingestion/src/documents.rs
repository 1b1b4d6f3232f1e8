//! Input document discovery.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use nerdmill_common::{NerdError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentKind {
    /// Uploaded to the service as a file.
    Pdf,
    /// Sent inline as query text.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRef {
    pub path: PathBuf,
    /// File name without extension; names every output file of the document.
    pub stem: String,
    pub kind: DocumentKind,
}

impl DocumentRef {
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        let kind = match extension_of(path).as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            _ => DocumentKind::Text,
        };
        Some(Self { path: path.to_path_buf(), stem, kind })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.stem.clone())
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// List documents in `dir` whose extension is in `extensions`, sorted by file name.
pub fn discover(dir: &Path, extensions: &[String]) -> Result<Vec<DocumentRef>> {
    if !dir.is_dir() {
        return Err(NerdError::InvalidInput(format!(
            "input path is not a directory: {}",
            dir.display()
        )));
    }

    let wanted: Vec<String> = extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = extension_of(&path) else {
            continue;
        };
        if !wanted.iter().any(|w| *w == ext) {
            debug!(file = %path.display(), "Skipping file with unhandled extension");
            continue;
        }
        if let Some(doc) = DocumentRef::from_path(&path) {
            documents.push(doc);
        }
    }

    documents.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec!["pdf".to_string(), ".TXT".to_string()]
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.txt", "C.PDF", "notes.md", "raw.json"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let docs = discover(dir.path(), &exts()).unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.file_name()).collect();
        assert_eq!(names, vec!["C.PDF", "a.txt", "b.pdf"]);
        assert_eq!(docs[0].kind, DocumentKind::Pdf);
        assert_eq!(docs[1].kind, DocumentKind::Text);
        assert_eq!(docs[2].stem, "b");
    }

    #[test]
    fn test_discover_rejects_file_input() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(discover(&file, &exts()), Err(NerdError::InvalidInput(_))));
    }
}
