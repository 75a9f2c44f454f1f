use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::errors::{DomainError, Result};

/// A window of words taken from a document, keyed by the hash of its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
}

impl Chunk {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: chunk_id(&text),
            text,
        }
    }
}

/// Lowercase hex SHA-256 of the chunk text.
///
/// Identical text always maps to the same id, so re-ingesting a document
/// overwrites its records instead of duplicating them.
pub fn chunk_id(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Splits text into overlapping fixed-size word windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordChunker {
    chunk_size: usize,
    overlap: usize,
}

impl WordChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DomainError::configuration("chunk_size must be greater than 0"));
        }
        if overlap >= chunk_size {
            return Err(DomainError::configuration(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Lazily yields the windows of `text`, re-joined with single spaces.
    pub fn windows<'a>(&self, text: &'a str) -> WordWindows<'a> {
        WordWindows {
            words: text.split_whitespace().collect(),
            chunk_size: self.chunk_size,
            step: self.step(),
            start: 0,
            done: false,
        }
    }

    pub fn chunks(&self, text: &str) -> Vec<Chunk> {
        self.windows(text).map(Chunk::new).collect()
    }
}

impl Default for WordChunker {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

pub struct WordWindows<'a> {
    words: Vec<&'a str>,
    chunk_size: usize,
    step: usize,
    start: usize,
    done: bool,
}

impl Iterator for WordWindows<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.start >= self.words.len() {
            return None;
        }

        let end = (self.start + self.chunk_size).min(self.words.len());
        let window = self.words[self.start..end].join(" ");

        // A window that reaches the last word already covers the tail.
        if end == self.words.len() {
            self.done = true;
        } else {
            self.start += self.step;
        }

        Some(window)
    }
}
