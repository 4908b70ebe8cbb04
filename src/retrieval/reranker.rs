//! Cross-encoder relevance scoring using FastEmbed

use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RerankError {
    #[error("Reranker initialization failed: {0}")]
    InitializationError(String),

    #[error("Reranking failed: {0}")]
    RerankingError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Joint (query, passage) relevance scoring
///
/// The precision stage of retrieval: costlier than embedding similarity,
/// so it only ever sees the merged candidate set.
pub trait RelevanceScorer: Send + Sync {
    /// Score each candidate text against the query
    ///
    /// Returns one score per candidate, in input order.
    fn predict(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>, RerankError>;

    fn model_name(&self) -> &str;
}

/// FastEmbed cross-encoder backend
pub struct CrossEncoderReranker {
    model: Arc<TextRerank>,
    model_name: String,
}

impl CrossEncoderReranker {
    pub fn new(model_name: &str) -> Result<Self, RerankError> {
        let reranker_model = match model_name {
            "bge-reranker-base" => RerankerModel::BGERerankerBase,
            _ => {
                return Err(RerankError::InitializationError(format!(
                    "Unsupported reranker model: {}. Supported: bge-reranker-base",
                    model_name
                )));
            }
        };

        tracing::info!("Initializing reranker model: {}", model_name);

        let init_options =
            RerankInitOptions::new(reranker_model).with_show_download_progress(true);

        let model = TextRerank::try_new(init_options)
            .map_err(|e| RerankError::InitializationError(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: model_name.to_string(),
        })
    }

    pub fn with_default_model() -> Result<Self, RerankError> {
        Self::new("bge-reranker-base")
    }
}

impl RelevanceScorer for CrossEncoderReranker {
    fn predict(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>, RerankError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        if query.is_empty() {
            return Err(RerankError::InvalidInput(
                "Query cannot be empty".to_string(),
            ));
        }

        let documents: Vec<&str> = candidates.iter().map(|s| s.as_str()).collect();

        let results = self
            .model
            .rerank(query, documents, false, None)
            .map_err(|e| RerankError::RerankingError(e.to_string()))?;

        // fastembed returns results sorted by score; restore input order
        let mut scores = vec![0.0f32; candidates.len()];
        for result in results {
            scores[result.index] = result.score;
        }

        Ok(scores)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_model_is_rejected() {
        let result = CrossEncoderReranker::new("vietnamese-reranker-v1");
        assert!(matches!(result, Err(RerankError::InitializationError(_))));
    }

    #[test]
    #[ignore] // Requires model download - run with: cargo test -- --ignored
    fn relevant_candidate_scores_highest() {
        let reranker = CrossEncoderReranker::with_default_model().unwrap();

        let query = "Vượt đèn đỏ bị phạt bao nhiêu tiền?";
        let candidates = vec![
            "Phạt tiền từ 800.000 đồng đối với người không chấp hành hiệu lệnh của đèn tín hiệu \
             giao thông."
                .to_string(),
            "Quy định về đăng kiểm phương tiện cơ giới đường bộ.".to_string(),
        ];

        let scores = reranker.predict(query, &candidates).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores[0] > scores[1]);
    }
}
