//! JSON-backed passage store
//!
//! Loads the ingestion job's output once at startup; the collection is
//! immutable for the lifetime of the process and replaced only by a new
//! ingestion run plus a full reload.

use crate::corpus::Passage;
use crate::error::{LawbotError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Immutable, ingestion-ordered collection of passages
#[derive(Debug)]
pub struct PassageStore {
    passages: Vec<Passage>,
}

impl PassageStore {
    /// Load the persisted passage collection
    ///
    /// Absence of the file is fatal to startup and surfaces as
    /// `DataNotFound`; records with empty content or source file are
    /// rejected rather than silently indexed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LawbotError::DataNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|e| LawbotError::Io {
            source: e,
            context: format!("Failed to open passage data: {:?}", path),
        })?;

        let passages: Vec<Passage> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| LawbotError::Json {
                source: e,
                context: format!("Failed to parse passage data: {:?}", path),
            })?;

        Self::from_passages(passages)
    }

    /// Build a store from already-deserialized passages, enforcing invariants
    pub fn from_passages(passages: Vec<Passage>) -> Result<Self> {
        for (index, passage) in passages.iter().enumerate() {
            if passage.content.trim().is_empty() {
                return Err(LawbotError::InvalidPassage {
                    index,
                    message: "empty content".to_string(),
                });
            }
            if passage.metadata.source_file.trim().is_empty() {
                return Err(LawbotError::InvalidPassage {
                    index,
                    message: "empty source_file".to_string(),
                });
            }
        }

        tracing::info!("Passage store loaded: {} passages", passages.len());
        Ok(Self { passages })
    }

    /// All passages in stable ingestion order
    pub fn all(&self) -> &[Passage] {
        &self.passages
    }

    /// O(1) lookup by ingestion position
    pub fn get(&self, index: usize) -> Option<&Passage> {
        self.passages.get(index)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}
