//! File-backed chunk persistence.
//!
//! Each source is one pretty-printed JSON array of its chunks:
//! ```text
//! {data_dir}/
//!   notes.txt.json
//!   txt-9f8e7d6c.json
//! ```
//! Bytes of the source id outside `[A-Za-z0-9._-]` are percent-encoded, so
//! distinct ids never share a file. Re-ingesting a source overwrites its
//! file. These files back the keyword fallback and the `/sources` listing.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use secondbrain_core::{Chunk, SourceId};

use crate::error::{AgentError, Result};

#[derive(Debug, Clone)]
pub struct ChunkStore {
    dir: PathBuf,
}

impl ChunkStore {
    /// Open the store, creating the directory if it doesn't exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn source_path(&self, source_id: &SourceId) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(source_id)))
    }

    pub fn save(&self, source_id: &SourceId, chunks: &[Chunk]) -> Result<PathBuf> {
        let path = self.source_path(source_id);
        let json = serde_json::to_string_pretty(chunks)?;
        fs::write(&path, json)?;

        tracing::debug!(
            source_id = %source_id,
            chunks = chunks.len(),
            path = %path.display(),
            "Chunks saved"
        );
        Ok(path)
    }

    /// Chunks of one source, in stored order.
    pub fn load(&self, source_id: &SourceId) -> Result<Vec<Chunk>> {
        let path = self.source_path(source_id);
        if !path.is_file() {
            return Err(AgentError::SourceNotFound(source_id.to_string()));
        }
        read_chunks(&path)
    }

    /// Every readable chunk, files in name order. Unreadable or malformed
    /// files are skipped.
    pub fn load_all(&self) -> Result<Vec<Chunk>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut chunks = Vec::new();
        for path in paths {
            match read_chunks(&path) {
                Ok(found) => chunks.extend(found),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable chunk file");
                }
            }
        }
        Ok(chunks)
    }

    /// Chunk counts per source, ordered by source id.
    pub fn list_sources(&self) -> Result<BTreeMap<SourceId, usize>> {
        let mut sources = BTreeMap::new();
        for chunk in self.load_all()? {
            *sources.entry(chunk.meta.source_id).or_insert(0) += 1;
        }
        Ok(sources)
    }

    /// Remove a source's file. Returns whether anything was removed.
    pub fn delete(&self, source_id: &SourceId) -> Result<bool> {
        let path = self.source_path(source_id);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        tracing::info!(source_id = %source_id, "Source deleted");
        Ok(true)
    }
}

fn file_stem(source_id: &SourceId) -> String {
    let mut stem = String::with_capacity(source_id.as_str().len());
    for b in source_id.as_str().bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_') {
            stem.push(char::from(b));
        } else {
            let _ = write!(stem, "%{b:02X}");
        }
    }
    stem
}

fn read_chunks(path: &Path) -> Result<Vec<Chunk>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
