//! Text chunking algorithms and utilities
//!
//! Pages are split with a sliding character window. Each window ends at the
//! strongest natural boundary found in the back half of the size budget
//! (paragraph, line, sentence, then word) and falls back to a hard cut when
//! none exists. The next window starts exactly `overlap` characters before the
//! previous end, so consecutive chunks of a page always share `overlap`
//! characters.

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::text::document::SourceDocument;
use serde::{Deserialize, Serialize};

/// A contiguous slice of one page's text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Originating document identifier
    pub source: String,

    /// 0-based page index within the document
    pub page: usize,

    /// Position within the page's chunk sequence
    pub index: usize,

    /// Character offset of the chunk within the page
    pub offset: usize,

    /// Length of the chunk in characters
    pub length: usize,

    /// The actual text content
    pub text: String,
}

/// Break preference, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Line,
    Sentence,
    Word,
}

impl Boundary {
    const ORDER: [Boundary; 4] = [
        Boundary::Paragraph,
        Boundary::Line,
        Boundary::Sentence,
        Boundary::Word,
    ];

    /// Whether a window ending right before `end` ends on this boundary
    fn matches(self, chars: &[char], end: usize) -> bool {
        let last = chars[end - 1];
        let before = if end >= 2 { Some(chars[end - 2]) } else { None };

        match self {
            Boundary::Paragraph => last == '\n' && before == Some('\n'),
            Boundary::Line => last == '\n',
            Boundary::Sentence => {
                last.is_whitespace() && matches!(before, Some('.' | '!' | '?' | '。'))
            }
            Boundary::Word => last.is_whitespace(),
        }
    }
}

/// Text chunker for splitting pages into overlapping chunks
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    /// Create a new text chunker with the given configuration
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Chunk every page of every document, in order
    pub fn chunk_documents(&self, documents: &[SourceDocument]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| self.chunk_document(doc))
            .collect();

        log::info!(
            "Split {} documents into {} chunks (size {}, overlap {})",
            documents.len(),
            chunks.len(),
            self.config.chunk_size,
            self.config.overlap
        );
        chunks
    }

    /// Chunk every page of one document
    pub fn chunk_document(&self, document: &SourceDocument) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = document
            .pages
            .iter()
            .flat_map(|page| self.chunk_page(&document.id, page.index, &page.text))
            .collect();

        log::debug!("{}: {} chunks", document.id, chunks.len());
        chunks
    }

    /// Chunk a single page of text.
    ///
    /// Whitespace-only windows are dropped only at the edges of the page; an
    /// interior one is kept so neighbouring chunks still share `overlap` chars.
    pub fn chunk_page(&self, source: &str, page: usize, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        if chars.iter().all(|c| c.is_whitespace()) {
            return Vec::new();
        }

        let mut windows = Vec::new();
        let mut start = 0;
        loop {
            let end = if total - start <= self.config.chunk_size {
                total
            } else {
                self.find_break(&chars, start)
            };
            windows.push((start, end));

            if end == total {
                break;
            }

            // find_break never returns an end inside the overlap, so this always advances
            start = end - self.config.overlap;
        }

        let has_text =
            |&(start, end): &(usize, usize)| chars[start..end].iter().any(|c| !c.is_whitespace());
        let first = windows.iter().position(has_text).unwrap_or(0);
        let last = windows.iter().rposition(has_text).unwrap_or(0);

        windows[first..=last]
            .iter()
            .enumerate()
            .map(|(index, &(start, end))| Chunk {
                source: source.to_string(),
                page,
                index,
                offset: start,
                length: end - start,
                text: chars[start..end].iter().collect(),
            })
            .collect()
    }

    /// Pick the end of the window starting at `start` (exclusive index)
    fn find_break(&self, chars: &[char], start: usize) -> usize {
        let hard_end = start + self.config.chunk_size;
        let earliest = start + (self.config.overlap + 1).max(self.config.chunk_size / 2);

        for boundary in Boundary::ORDER {
            if let Some(end) = (earliest..=hard_end)
                .rev()
                .find(|&end| boundary.matches(chars, end))
            {
                return end;
            }
        }

        hard_end
    }
}
