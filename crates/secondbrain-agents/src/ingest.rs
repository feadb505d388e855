//! Sentence-aware chunking of text and uploaded files.
//!
//! Chunks never exceed `chunk_size_chars` characters. Sentences are packed
//! greedily; sentences longer than a chunk are cut at word boundaries; a
//! final pass folds undersized chunks into their successor when the result
//! still fits.

use std::sync::OnceLock;

use regex::Regex;

use secondbrain_core::{Chunk, FileKind, SourceId};

use crate::error::Result;
use crate::parsers::{detect_file_kind, parse_pdf_bytes, parse_text_bytes};

fn sentence_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence boundary regex is valid"))
}

/// Splits documents into chunks. Lengths are in characters, not tokens.
#[derive(Debug, Clone)]
pub struct IngestAgent {
    chunk_size_chars: usize,
    min_chunk_chars: usize,
}

impl Default for IngestAgent {
    fn default() -> Self {
        Self::new(800, 200)
    }
}

impl IngestAgent {
    pub fn new(chunk_size_chars: usize, min_chunk_chars: usize) -> Self {
        Self {
            chunk_size_chars: chunk_size_chars.max(1),
            min_chunk_chars,
        }
    }

    pub fn chunk_size_chars(&self) -> usize {
        self.chunk_size_chars
    }

    /// Split after `.`, `!` or `?` followed by whitespace.
    pub fn split_into_sentences(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        let mut sentences = Vec::new();
        let mut last = 0;

        for m in sentence_boundary().find_iter(text) {
            // Punctuation is ASCII, so it is one byte wide.
            sentences.push(text[last..m.start() + 1].trim().to_string());
            last = m.end();
        }
        sentences.push(text[last..].trim().to_string());

        sentences.retain(|s| !s.is_empty());
        sentences
    }

    /// Cut a piece longer than a chunk into windows, backing off to the last
    /// space inside each window when there is one.
    fn split_long_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        if n <= self.chunk_size_chars {
            return vec![text.to_string()];
        }

        let mut parts = Vec::new();
        let mut start = 0;
        while start < n {
            let mut end = (start + self.chunk_size_chars).min(n);
            if end < n {
                if let Some(pos) = chars[start..end].iter().rposition(|c| *c == ' ') {
                    if pos > 0 {
                        end = start + pos;
                    }
                }
            }
            let part: String = chars[start..end].iter().collect();
            let part = part.trim();
            if !part.is_empty() {
                parts.push(part.to_string());
            }
            start = end;
        }
        parts
    }

    fn aggregate_sentences(
        &self,
        sentences: &[String],
        source_id: &SourceId,
        page: Option<u32>,
    ) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();
        let mut buffer_len = 0;
        let mut idx = 0u32;

        let emit = |chunks: &mut Vec<Chunk>, text: String, idx: &mut u32| {
            let text = text.trim().to_string();
            if !text.is_empty() {
                chunks.push(Chunk::new(source_id, *idx, page, text));
                *idx += 1;
            }
        };

        for sent in sentences {
            let s_len = sent.chars().count();

            if s_len > self.chunk_size_chars {
                if !buffer.is_empty() {
                    emit(&mut chunks, buffer.join(" "), &mut idx);
                    buffer.clear();
                    buffer_len = 0;
                }
                for part in self.split_long_text(sent) {
                    emit(&mut chunks, part, &mut idx);
                }
                continue;
            }

            if buffer_len + s_len + 1 <= self.chunk_size_chars {
                buffer.push(sent.as_str());
                buffer_len += s_len + 1;
            } else {
                emit(&mut chunks, buffer.join(" "), &mut idx);
                buffer = vec![sent.as_str()];
                buffer_len = s_len + 1;
            }
        }

        if !buffer.is_empty() {
            emit(&mut chunks, buffer.join(" "), &mut idx);
        }

        self.merge_small_chunks(chunks)
    }

    /// Fold a chunk shorter than `min_chunk_chars` together with its
    /// successor when the merged text still fits. Indices are not renumbered.
    fn merge_small_chunks(&self, chunks: Vec<Chunk>) -> Vec<Chunk> {
        let mut merged: Vec<Chunk> = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            if let Some(prev) = merged.last_mut() {
                let prev_len = prev.meta.char_len;
                if prev_len < self.min_chunk_chars
                    && prev_len + 1 + chunk.meta.char_len <= self.chunk_size_chars
                {
                    prev.absorb(&chunk);
                    continue;
                }
            }
            merged.push(chunk);
        }
        merged
    }

    /// Chunk plain text. Text with no sentences in it (empty or only
    /// whitespace) becomes a single chunk holding the raw text.
    pub fn process_text(&self, text: &str, source_id: Option<SourceId>) -> Vec<Chunk> {
        let source_id = source_id.unwrap_or_else(|| SourceId::generate("txt"));
        let sentences = self.split_into_sentences(text);
        if sentences.is_empty() {
            tracing::debug!(source_id = %source_id, "No sentences, keeping raw text");
            return vec![Chunk::new(&source_id, 0, None, text.to_string())];
        }
        self.aggregate_sentences(&sentences, &source_id, None)
    }

    /// Chunk extracted PDF pages. `page` is the zero-based page index, blank
    /// pages are skipped and chunk indices restart on every page.
    pub fn process_pages(&self, pages: &[String], source_id: &SourceId) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for (page_idx, page_text) in pages.iter().enumerate() {
            if page_text.trim().is_empty() {
                continue;
            }
            let sentences = self.split_into_sentences(page_text);
            chunks.extend(self.aggregate_sentences(&sentences, source_id, Some(page_idx as u32)));
        }
        chunks
    }

    /// Chunk an uploaded file. PDFs are chunked per page (blank pages
    /// skipped); everything else is decoded as text.
    pub fn process_file_bytes(&self, bytes: &[u8], filename: &str) -> Result<Vec<Chunk>> {
        let kind = detect_file_kind(bytes, filename);
        let source_id = if filename.is_empty() {
            SourceId::generate("file")
        } else {
            SourceId::from(filename)
        };

        let chunks = match kind {
            FileKind::Pdf => self.process_pages(&parse_pdf_bytes(bytes)?, &source_id),
            FileKind::Text => parse_text_bytes(bytes)
                .iter()
                .flat_map(|t| self.process_text(t, Some(source_id.clone())))
                .collect(),
        };

        tracing::info!(
            source_id = %source_id,
            kind = ?kind,
            bytes = bytes.len(),
            chunks = chunks.len(),
            "File chunked"
        );
        Ok(chunks)
    }
}
