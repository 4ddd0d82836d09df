//! Source document loading and chunking.

mod splitter;

pub use splitter::{SplitterConfig, TextSplitter};

use crate::error::{GenSearchError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Extracted text of a source document.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Path the text was loaded from.
    pub source: String,
    pub content: String,
}

/// A span of document text, identified by its position in the split sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub source: String,
    pub content: String,
    pub chunk_index: usize,
}

/// Load a document from disk.
///
/// PDFs go through `pdf-extract`; `.txt`, `.md` and `.markdown` are read as UTF-8.
pub async fn load_document(path: &Path) -> Result<SourceDocument> {
    if !path.exists() {
        return Err(GenSearchError::Document(format!(
            "Source document not found: {}",
            path.display()
        )));
    }

    let source = path.display().to_string();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let content = match ext.as_str() {
        "pdf" => {
            let path_buf = path.to_path_buf();
            tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text(&path_buf)
                    .map_err(|e| GenSearchError::Document(format!("PDF extraction failed: {}", e)))
            })
            .await
            .map_err(|e| GenSearchError::Document(format!("PDF extraction task failed: {}", e)))??
        }
        "txt" | "md" | "markdown" => tokio::fs::read_to_string(path).await?,
        other => {
            return Err(GenSearchError::Document(format!(
                "Unsupported document type '{}': {}",
                other, source
            )))
        }
    };

    debug!("Extracted {} characters", content.chars().count());
    info!("Loaded document {}", source);

    Ok(SourceDocument { source, content })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("roll.txt");
        std::fs::write(&file, "Ward 1\nJane Doe, 42").unwrap();

        let doc = load_document(&file).await.unwrap();
        assert_eq!(doc.content, "Ward 1\nJane Doe, 42");
        assert_eq!(doc.source, file.display().to_string());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_document(Path::new("/nonexistent/138.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("roll.docx");
        std::fs::write(&file, "x").unwrap();

        assert!(matches!(
            load_document(&file).await,
            Err(GenSearchError::Document(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.pdf");
        std::fs::write(&file, "not a pdf").unwrap();

        assert!(matches!(
            load_document(&file).await,
            Err(GenSearchError::Document(_))
        ));
    }
}
