//! Page-wise document loaders
//!
//! PDFs are extracted one page at a time so chunks can carry their page
//! index. Plain text and markdown files are treated as a single page unless
//! they contain form feeds.

use crate::error::{RagError, Result};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Loads a file into raw page texts
pub trait DocumentLoader: Send + Sync {
    /// Extract the text of every page, in order
    fn load(&self, path: &Path) -> Result<Vec<String>>;

    /// Loader name for logging
    fn name(&self) -> &str;
}

/// PDF loader backed by `pdf-extract`
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed inputs instead of returning an error
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_by_pages(path)
        }))
        .map_err(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "extractor panicked".to_string());
            RagError::Pdf(format!("{}: {}", path.display(), reason))
        })?;

        extracted.map_err(|e| RagError::Pdf(format!("{}: {}", path.display(), e)))
    }

    fn name(&self) -> &str {
        "pdf"
    }
}

/// Plain text / markdown loader; form feeds separate pages
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|e| {
            RagError::TextProcessing(format!("{} is not valid UTF-8: {}", path.display(), e))
        })?;

        Ok(text.split('\u{000C}').map(str::to_string).collect())
    }

    fn name(&self) -> &str {
        "text"
    }
}
