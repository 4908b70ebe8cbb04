/// HNSW-backed semantic index with metadata filtering
///
/// Passage embeddings are computed once at build time (batched) and
/// persisted as a JSON sidecar next to the passage collection, so later
/// loads skip re-embedding. The HNSW graph serves unfiltered queries;
/// filtered queries scan the eligible subset exactly, because a selective
/// filter (a single article) must not miss its passage to graph
/// approximation.
use crate::corpus::{PassageStore, RetrievalFilter};
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use hnsw_rs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("Embedding backend unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),

    #[error("Search failed: {0}")]
    SearchError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Sidecar serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}

/// HNSW construction and search parameters
#[derive(Debug, Clone)]
pub struct HnswParams {
    pub ef_construction: usize,
    pub m: usize,
    pub ef_search: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            ef_construction: 200,
            m: 16,
            ef_search: 50,
        }
    }
}

/// Persisted embedding matrix, invalidated on model or corpus change
#[derive(Serialize, Deserialize)]
struct EmbeddingSidecar {
    model: String,
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

/// Semantic index over the passage store
pub struct VectorIndex {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<PassageStore>,
    embeddings: Vec<Vec<f32>>,
    hnsw: Hnsw<'static, f32, DistCosine>,
    params: HnswParams,
}

impl VectorIndex {
    /// Build the index, reusing the sidecar when it matches the store
    pub fn build(
        store: Arc<PassageStore>,
        provider: Arc<dyn EmbeddingProvider>,
        params: HnswParams,
        batch_size: usize,
        sidecar_path: &Path,
    ) -> Result<Self, VectorIndexError> {
        let embeddings = match Self::load_sidecar(sidecar_path, provider.as_ref(), store.len()) {
            Some(vectors) => {
                tracing::info!(
                    "Reusing persisted embeddings for {} passages",
                    vectors.len()
                );
                vectors
            }
            None => {
                let vectors = Self::embed_corpus(&store, provider.as_ref(), batch_size)?;
                Self::save_sidecar(sidecar_path, provider.as_ref(), &vectors)?;
                vectors
            }
        };

        let hnsw = Hnsw::<f32, DistCosine>::new(
            params.m,
            store.len().max(1),
            16,
            params.ef_construction,
            DistCosine,
        );
        for (index, vector) in embeddings.iter().enumerate() {
            hnsw.insert((vector, index));
        }

        tracing::info!(
            "Vector index built: {} passages, {}D ({})",
            embeddings.len(),
            provider.dimension(),
            provider.model_name()
        );

        Ok(Self {
            provider,
            store,
            embeddings,
            hnsw,
            params,
        })
    }

    fn embed_corpus(
        store: &PassageStore,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Vec<Vec<f32>>, VectorIndexError> {
        let texts: Vec<String> = store.all().iter().map(|p| p.content.clone()).collect();
        let mut vectors = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(batch_size.max(1)) {
            vectors.extend(provider.embed_batch(chunk)?);
        }

        Ok(vectors)
    }

    fn load_sidecar(
        path: &Path,
        provider: &dyn EmbeddingProvider,
        expected_count: usize,
    ) -> Option<Vec<Vec<f32>>> {
        let file = File::open(path).ok()?;
        let sidecar: EmbeddingSidecar = serde_json::from_reader(BufReader::new(file)).ok()?;

        let stale = sidecar.model != provider.model_name()
            || sidecar.dimension != provider.dimension()
            || sidecar.vectors.len() != expected_count;
        if stale {
            tracing::warn!("Embedding sidecar is stale, re-embedding corpus");
            return None;
        }

        Some(sidecar.vectors)
    }

    fn save_sidecar(
        path: &Path,
        provider: &dyn EmbeddingProvider,
        vectors: &[Vec<f32>],
    ) -> Result<(), VectorIndexError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let sidecar = EmbeddingSidecar {
            model: provider.model_name().to_string(),
            dimension: provider.dimension(),
            vectors: vectors.to_vec(),
        };
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), &sidecar)?;
        Ok(())
    }

    /// K nearest passages by cosine similarity, optionally filtered
    ///
    /// Returns passage indices in descending similarity order. An
    /// unreachable embedding backend surfaces as `EmbeddingUnavailable`;
    /// lexical-only degradation is the caller's explicit decision, never
    /// this index's.
    pub fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&RetrievalFilter>,
    ) -> Result<Vec<usize>, VectorIndexError> {
        if k == 0 || self.embeddings.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.provider.embed(query)?;
        if query_vector.len() != self.provider.dimension() {
            return Err(VectorIndexError::InvalidDimension {
                expected: self.provider.dimension(),
                actual: query_vector.len(),
            });
        }

        match filter {
            Some(filter) if !filter.is_empty() => Ok(self.scan_filtered(&query_vector, k, filter)),
            _ => Ok(self.search_graph(&query_vector, k)),
        }
    }

    fn search_graph(&self, query_vector: &[f32], k: usize) -> Vec<usize> {
        let neighbours = self.hnsw.search(query_vector, k, self.params.ef_search);
        neighbours.into_iter().map(|n| n.d_id).collect()
    }

    fn scan_filtered(&self, query_vector: &[f32], k: usize, filter: &RetrievalFilter) -> Vec<usize> {
        let mut scored: Vec<(usize, f32)> = self
            .store
            .all()
            .iter()
            .enumerate()
            .filter(|(_, passage)| filter.matches(&passage.metadata))
            .map(|(index, _)| (index, cosine_similarity(query_vector, &self.embeddings[index])))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored.into_iter().map(|(index, _)| index).collect()
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
