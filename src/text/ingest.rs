//! Startup document ingestion
//!
//! A missing or unreadable document never aborts ingestion; it is logged,
//! recorded in the [`IngestReport`], and the remaining documents are loaded.

use crate::error::{RagError, Result};
use crate::text::document::SourceDocument;
use crate::text::pdf::{DocumentLoader, PdfLoader, TextLoader};
use crate::utils::{DocumentFormat, human_size};
use std::path::{Path, PathBuf};

/// A document that could not be ingested
#[derive(Debug)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub error: RagError,
}

/// Outcome of ingesting the configured document list
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Successfully loaded documents, in configuration order
    pub documents: Vec<SourceDocument>,
    /// Documents that were missing or failed to load
    pub skipped: Vec<SkippedDocument>,
}

impl IngestReport {
    /// Pages with any text across all loaded documents
    pub fn page_count(&self) -> usize {
        self.documents.iter().map(|doc| doc.non_blank_pages()).sum()
    }

    /// True when nothing usable was loaded
    pub fn is_empty(&self) -> bool {
        self.page_count() == 0
    }
}

/// Loads documents by extension
pub struct Ingestor {
    pdf: Box<dyn DocumentLoader>,
    text: Box<dyn DocumentLoader>,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor {
    pub fn new() -> Self {
        Self::with_loaders(Box::new(PdfLoader), Box::new(TextLoader))
    }

    /// Use custom loaders for PDF and plain-text files
    pub fn with_loaders(pdf: Box<dyn DocumentLoader>, text: Box<dyn DocumentLoader>) -> Self {
        Self { pdf, text }
    }

    fn loader_for(&self, path: &Path) -> Option<&dyn DocumentLoader> {
        match DocumentFormat::detect(path)? {
            DocumentFormat::Pdf => Some(self.pdf.as_ref()),
            DocumentFormat::PlainText => Some(self.text.as_ref()),
        }
    }

    /// Load a single document
    pub fn load_document(&self, path: &Path) -> Result<SourceDocument> {
        if !path.exists() {
            return Err(RagError::DocumentNotFound(path.to_path_buf()));
        }

        let loader = self.loader_for(path).ok_or_else(|| {
            RagError::TextProcessing(format!("Unsupported document format: {}", path.display()))
        })?;

        log::debug!("Loading {} with the {} loader", path.display(), loader.name());
        let pages = loader.load(path)?;
        Ok(SourceDocument::from_pages(path.to_string_lossy(), pages))
    }

    /// Load every configured document, skipping the ones that fail
    pub fn ingest(&self, paths: &[PathBuf]) -> IngestReport {
        let mut report = IngestReport::default();

        log::info!("📄 Loading {} source documents...", paths.len());

        for path in paths {
            match self.load_document(path) {
                Ok(document) => {
                    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                    log::info!(
                        "   ✅ {} loaded ({} pages, {} with text, {})",
                        path.display(),
                        document.pages.len(),
                        document.non_blank_pages(),
                        human_size(size)
                    );
                    report.documents.push(document);
                }
                Err(error @ RagError::DocumentNotFound(_)) => {
                    log::warn!("   ⚠️ {} (skipped)", error);
                    report.skipped.push(SkippedDocument {
                        path: path.clone(),
                        error,
                    });
                }
                Err(error) => {
                    log::error!("   ❌ Failed to load {}: {}", path.display(), error);
                    report.skipped.push(SkippedDocument {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        if report.is_empty() {
            log::error!("❌ No document text was loaded; retrieval will be unavailable");
        } else {
            log::info!(
                "Loaded {} documents ({} pages), skipped {}",
                report.documents.len(),
                report.page_count(),
                report.skipped.len()
            );
        }

        report
    }
}
