//! Loaded source documents

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// A single page of extracted text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// 0-based page index within the document
    pub index: usize,
    /// Normalized page text
    pub text: String,
}

/// A document loaded at startup, immutable afterwards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDocument {
    /// Document identifier (the path as configured)
    pub id: String,
    /// Pages in document order
    pub pages: Vec<Page>,
}

impl SourceDocument {
    /// Build a document from raw page texts, normalizing each page
    pub fn from_pages<I, S>(id: impl Into<String>, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, text)| Page {
                index,
                text: normalize_page_text(text.as_ref()),
            })
            .collect();

        Self {
            id: id.into(),
            pages,
        }
    }

    /// Number of pages carrying any non-whitespace text
    pub fn non_blank_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|page| !page.text.trim().is_empty())
            .count()
    }

    /// Total characters across all pages
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|page| page.text.chars().count()).sum()
    }
}

fn blank_run_regex() -> &'static Regex {
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    BLANK_RUN.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"))
}

fn space_run_regex() -> &'static Regex {
    static SPACE_RUN: OnceLock<Regex> = OnceLock::new();
    SPACE_RUN.get_or_init(|| Regex::new(r"[^\S\n]{2,}").expect("static regex"))
}

/// Normalize extracted page text.
///
/// Composes Unicode (PDF extractors often emit Hangul as decomposed jamo),
/// unifies line endings, strips trailing spaces, squeezes column gaps to a
/// single space and collapses runs of blank lines into a paragraph break.
pub fn normalize_page_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    let unified = composed.replace("\r\n", "\n").replace('\r', "\n");

    let trimmed = unified
        .lines()
        .map(|line| space_run_regex().replace_all(line.trim_end(), " "))
        .collect::<Vec<_>>()
        .join("\n");

    blank_run_regex()
        .replace_all(trimmed.trim(), "\n\n")
        .into_owned()
}
