//! Deterministic test doubles shared by the integration tests
use async_trait::async_trait;
use lawbot::corpus::{DocumentType, Passage, PassageMetadata};
use lawbot::embedding::{EmbeddingError, EmbeddingProvider};
use lawbot::generation::{GenerationClient, GenerationError};
use lawbot::retrieval::{RelevanceScorer, RerankError};
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const DIMENSION: usize = 32;

/// Bag-of-words embedder: tokens hash onto axes, so shared vocabulary
/// means high cosine similarity. Fully deterministic.
pub struct BagOfWordsEmbedder;

impl EmbeddingProvider for BagOfWordsEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; DIMENSION];
        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            vector[(hasher.finish() % DIMENSION as u64) as usize] += 1.0;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        "bag-of-words-test"
    }
}

/// Token-overlap relevance scorer that records how it was called
pub struct OverlapScorer {
    pub calls: AtomicUsize,
    pub last_candidate_count: AtomicUsize,
}

impl OverlapScorer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_candidate_count: AtomicUsize::new(0),
        }
    }
}

impl RelevanceScorer for OverlapScorer {
    fn predict(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>, RerankError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_candidate_count
            .store(candidates.len(), Ordering::SeqCst);

        let query_tokens: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Ok(candidates
            .iter()
            .map(|candidate| {
                let lowered = candidate.to_lowercase();
                query_tokens
                    .iter()
                    .filter(|token| lowered.contains(token.as_str()))
                    .count() as f32
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "overlap-test"
    }
}

/// Generator that replays scripted replies in order and records prompts
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut replies = self.replies.lock().unwrap();
        match replies.pop_front() {
            Some(reply) => Ok(reply),
            None => Err(GenerationError::RequestError(
                "no scripted reply left".to_string(),
            )),
        }
    }
}

/// Small statute corpus used across the integration tests
pub fn traffic_law_passages() -> Vec<Passage> {
    vec![
        decree_passage(
            "5",
            "Điều 5. Xử phạt người điều khiển xe ô tô vi phạm quy tắc giao thông",
            "Phạt tiền từ 4.000.000 đồng đến 6.000.000 đồng đối với người điều khiển xe ô tô \
             không chấp hành hiệu lệnh của đèn tín hiệu giao thông.",
        ),
        decree_passage(
            "6",
            "Điều 6. Xử phạt người điều khiển xe mô tô vi phạm quy tắc giao thông",
            "Phạt tiền từ 800.000 đồng đến 1.000.000 đồng đối với người điều khiển xe mô tô \
             không chấp hành hiệu lệnh của đèn tín hiệu giao thông.",
        ),
        decree_passage(
            "8",
            "Điều 8. Xử phạt người điều khiển xe đạp vi phạm quy tắc giao thông",
            "Phạt tiền từ 80.000 đồng đến 100.000 đồng đối với người điều khiển xe đạp không đi \
             bên phải theo chiều đi của mình.",
        ),
        decree_passage(
            "9",
            "Điều 9. Xử phạt người đi bộ vi phạm quy tắc giao thông đường bộ",
            "Nghị định quy định phạt tiền từ 60.000 đồng đến 100.000 đồng đối với người đi bộ \
             vượt qua dải phân cách hoặc đi qua đường không đúng nơi quy định.",
        ),
        law_passage(
            "9",
            "Điều 9. Quy tắc chung",
            "Người tham gia giao thông phải đi bên phải theo chiều đi của mình và tuân thủ hệ \
             thống báo hiệu đường bộ.",
        ),
        law_passage(
            "60",
            "Điều 60. Tuổi của người lái xe",
            "Người đủ 18 tuổi trở lên được lái xe mô tô hai bánh có dung tích xi-lanh từ 50 \
             phân khối trở lên.",
        ),
    ]
}

fn decree_passage(article: &str, title: &str, content: &str) -> Passage {
    Passage {
        content: content.to_string(),
        metadata: PassageMetadata {
            source_file: "nghi-dinh-100-2019.pdf".to_string(),
            document_type: DocumentType::Decree,
            document_number: "100/2019/NĐ-CP".to_string(),
            chapter: "Chương II - Hành vi vi phạm, hình thức xử phạt".to_string(),
            section: Some("Mục 1 - Vi phạm quy tắc giao thông đường bộ".to_string()),
            article_title: title.to_string(),
            article_number: article.to_string(),
        },
    }
}

fn law_passage(article: &str, title: &str, content: &str) -> Passage {
    Passage {
        content: content.to_string(),
        metadata: PassageMetadata {
            source_file: "luat-giao-thong-duong-bo-2008.pdf".to_string(),
            document_type: DocumentType::Law,
            document_number: "23/2008/QH12".to_string(),
            chapter: "Chương I - Những quy định chung".to_string(),
            section: None,
            article_title: title.to_string(),
            article_number: article.to_string(),
        },
    }
}
