//! Hybrid candidate generation with cross-encoder reranking

use crate::config::RetrievalConfig;
use crate::corpus::{Passage, PassageStore, RetrievalFilter};
use crate::embedding::{tokenize, KeywordIndex, VectorIndex, VectorIndexError};
use crate::retrieval::{RelevanceScorer, RetrievalOutcome, Retriever};
use ahash::AHashSet;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Embedding backend unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Vector search failed: {0}")]
    VectorSearchError(String),

    #[error("Reranking failed: {0}")]
    RerankingError(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl From<VectorIndexError> for SearchError {
    fn from(error: VectorIndexError) -> Self {
        match error {
            VectorIndexError::EmbeddingUnavailable(e) => {
                SearchError::EmbeddingUnavailable(e.to_string())
            }
            other => SearchError::VectorSearchError(other.to_string()),
        }
    }
}

/// The central retrieval algorithm: semantic + keyword recall, content
/// deduplication, cross-encoder precision, top-K selection
pub struct HybridRetriever {
    store: Arc<PassageStore>,
    vector_index: Arc<VectorIndex>,
    keyword_index: Arc<KeywordIndex>,
    reranker: Arc<dyn RelevanceScorer>,
    config: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(
        store: Arc<PassageStore>,
        vector_index: Arc<VectorIndex>,
        keyword_index: Arc<KeywordIndex>,
        reranker: Arc<dyn RelevanceScorer>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            vector_index,
            keyword_index,
            reranker,
            config,
        }
    }

    /// Semantic candidates, honoring the metadata filter
    async fn semantic_candidates(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
    ) -> Result<Vec<usize>, SearchError> {
        let indices = self
            .vector_index
            .search(query, self.config.top_n_vector, filter)?;
        Ok(indices)
    }

    /// Keyword candidates, deliberately unfiltered
    ///
    /// Keyword recall acts as a fallback net and must not be narrowed by
    /// the metadata filter.
    async fn keyword_candidates(&self, query: &str) -> Vec<usize> {
        let tokens = tokenize(query);
        self.keyword_index
            .top_n(&tokens, self.config.top_n_keyword)
            .into_iter()
            .map(|(index, _)| index)
            .collect()
    }

    /// Merge both candidate lists, deduplicating on passage content
    ///
    /// Semantic results are inserted first, so a passage found by both
    /// methods keeps its semantic-search identity and wins reranker score
    /// ties against lexical-origin candidates.
    fn merge_candidates(&self, semantic: Vec<usize>, keyword: Vec<usize>) -> Vec<usize> {
        let mut seen: AHashSet<&str> = AHashSet::default();
        let mut merged = Vec::with_capacity(semantic.len() + keyword.len());

        for index in semantic.into_iter().chain(keyword) {
            let Some(passage) = self.store.get(index) else {
                continue;
            };
            if seen.insert(passage.content.as_str()) {
                merged.push(index);
            }
        }

        merged
    }

    /// Cross-encoder precision pass over the merged set
    fn rerank(&self, query: &str, candidates: Vec<usize>) -> Result<Vec<Passage>, SearchError> {
        let texts: Vec<String> = candidates
            .iter()
            .filter_map(|&index| self.store.get(index))
            .map(|passage| passage.content.clone())
            .collect();

        let scores = self
            .reranker
            .predict(query, &texts)
            .map_err(|e| SearchError::RerankingError(e.to_string()))?;

        let mut scored: Vec<(usize, f32)> = candidates.into_iter().zip(scores).collect();
        // stable sort: ties keep merge order, semantic origin first
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.config.top_k_final);

        Ok(scored
            .into_iter()
            .filter_map(|(index, _)| self.store.get(index).cloned())
            .collect())
    }
}

#[async_trait]
impl Retriever for HybridRetriever {
    async fn retrieve(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
    ) -> Result<RetrievalOutcome, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery(
                "Query text cannot be empty".to_string(),
            ));
        }

        // both searches are read-only and independent
        let (semantic, keyword) = tokio::join!(
            self.semantic_candidates(query, filter),
            self.keyword_candidates(query)
        );
        let semantic = semantic?;

        let candidates = self.merge_candidates(semantic, keyword);
        tracing::debug!(
            candidates = candidates.len(),
            "Merged retrieval candidates"
        );

        if candidates.is_empty() {
            return Ok(RetrievalOutcome::Empty);
        }

        let passages = self.rerank(query, candidates)?;
        Ok(RetrievalOutcome::Found(passages))
    }
}
