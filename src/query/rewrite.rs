//! Colloquial expansion and conversational condensation
use crate::generation::{prompts, ConversationTurn, GenerationClient, GenerationError};
use std::sync::Arc;

/// Built-in colloquial → statutory glossary, scanned in order
///
/// First match wins; only one substitution is ever applied.
const EXPANSIONS: [(&str, &str); 7] = [
    (
        "vượt đèn đỏ",
        "không chấp hành hiệu lệnh của đèn tín hiệu giao thông",
    ),
    ("nồng độ cồn", "trong máu hoặc hơi thở có nồng độ cồn"),
    ("bằng lái", "giấy phép lái xe"),
    ("xe máy", "xe mô tô, xe gắn máy"),
    ("đi ngược chiều", "đi ngược chiều của đường một chiều"),
    ("chạy quá tốc độ", "điều khiển xe chạy quá tốc độ quy định"),
    (
        "không đội mũ bảo hiểm",
        "không đội mũ bảo hiểm hoặc đội mũ bảo hiểm không cài quai đúng quy cách",
    ),
];

/// Rewrites a raw question into retrieval-ready form
pub struct QueryRewriter {
    expansions: Vec<(String, String)>,
    generation: Arc<dyn GenerationClient>,
}

impl QueryRewriter {
    pub fn new(generation: Arc<dyn GenerationClient>) -> Self {
        let expansions = EXPANSIONS
            .iter()
            .map(|(colloquial, legal)| (colloquial.to_string(), legal.to_string()))
            .collect();
        Self {
            expansions,
            generation,
        }
    }

    /// Extend the built-in glossary (configuration-supplied pairs)
    pub fn with_expansions(mut self, extra: Vec<(String, String)>) -> Self {
        self.expansions.extend(extra);
        self
    }

    /// Append the statutory phrasing for the first colloquial match
    ///
    /// Case-insensitive scan; no match returns the question unchanged, so
    /// the result is always a superset of the original text.
    pub fn expand(&self, question: &str) -> String {
        let lowered = question.to_lowercase();
        for (colloquial, legal) in &self.expansions {
            if lowered.contains(colloquial.as_str()) {
                tracing::debug!("Expanded colloquial phrase: {}", colloquial);
                return format!("{} ({})", question, legal);
            }
        }
        question.to_string()
    }

    /// Rewrite a follow-up into a standalone question using the transcript
    ///
    /// Empty history is a no-op: the question is already standalone and a
    /// generation call would only waste latency and invite hallucinated
    /// context.
    pub async fn condense(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<String, GenerationError> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let prompt = prompts::condense_prompt(history, question);
        let standalone = self.generation.complete(&prompt).await?;
        let standalone = standalone.trim();

        // A degenerate rewrite falls back to the expanded question
        if standalone.is_empty() {
            return Ok(question.to_string());
        }
        Ok(standalone.to_string())
    }
}
