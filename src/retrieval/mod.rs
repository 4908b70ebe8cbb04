//! Hybrid Retrieval & Reranking
//!
//! Two-stage design: cheap broad recall (semantic + keyword candidates)
//! followed by an expensive cross-encoder precision pass. Candidate counts
//! are capped small on purpose: reranking dominates query cost.

mod hybrid;
mod reranker;

pub use hybrid::{HybridRetriever, SearchError};
pub use reranker::{CrossEncoderReranker, RelevanceScorer, RerankError};

use crate::corpus::{Passage, RetrievalFilter};
use async_trait::async_trait;

/// Outcome of one retrieval call
///
/// `Empty` is a valid result, not a failure: the corpus simply holds
/// nothing relevant to the question.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    Found(Vec<Passage>),
    Empty,
}

impl RetrievalOutcome {
    pub fn passages(self) -> Vec<Passage> {
        match self {
            RetrievalOutcome::Found(passages) => passages,
            RetrievalOutcome::Empty => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RetrievalOutcome::Empty)
    }
}

/// Retrieval capability consumed by the answer synthesizer
///
/// Callers depend only on this trait; the hybrid reranking retriever is
/// the production implementation.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
    ) -> Result<RetrievalOutcome, SearchError>;
}
