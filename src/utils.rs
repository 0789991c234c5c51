//! Utility functions for realestate-rag
//!
//! This module provides common utility functions used throughout the project.

use std::path::Path;

/// Source formats the ingestor can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    /// Plain text and markdown
    PlainText,
}

impl DocumentFormat {
    /// Detect the format from the file extension, ignoring case
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else if ["txt", "md", "markdown"]
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
        {
            Some(Self::PlainText)
        } else {
            None
        }
    }
}

/// Byte count for log lines, e.g. `1.5 KB`
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    for unit in &UNITS[..UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} {}", size, UNITS[UNITS.len() - 1])
}

/// Shorten text to at most `max_chars` characters for log and console previews
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
