//! RAG service: the single entry point exposed to the serving layer
//!
//! Owns the loaded pipeline and the `NotReady` → `Ready` state machine.
//! `ask` never returns an error: every query-time failure degrades to a
//! canned Vietnamese answer with empty sources, keeping the request layer
//! trivial.

use crate::config::Config;
use crate::corpus::{PassageMetadata, PassageStore};
use crate::embedding::{FastEmbedProvider, HnswParams, KeywordIndex, VectorIndex};
use crate::error::{LawbotError, Result};
use crate::generation::{
    prompts, ConversationTurn, GenerationClient, HttpGenerationClient,
};
use crate::query::{MetadataExtractor, QueryRewriter};
use crate::retrieval::{
    CrossEncoderReranker, HybridRetriever, RetrievalOutcome, Retriever,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// What `ask` always returns
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<PassageMetadata>,
}

impl ChatResponse {
    fn canned(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            sources: Vec::new(),
        }
    }
}

/// Loaded retrieval + synthesis components
struct Pipeline {
    rewriter: QueryRewriter,
    extractor: MetadataExtractor,
    retriever: Arc<dyn Retriever>,
    generation: Arc<dyn GenerationClient>,
}

enum State {
    NotReady,
    Ready(Pipeline),
}

/// The pipeline object constructed once at startup and injected into
/// request handlers
pub struct RagService {
    config: Config,
    state: RwLock<State>,
}

impl RagService {
    /// Create the service in `NotReady` state; call `load` before `ask`
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: RwLock::new(State::NotReady),
        }
    }

    /// Wire the service from prebuilt components, already `Ready`
    ///
    /// Used by tests and by callers that bring their own backends.
    pub fn with_components(
        config: Config,
        retriever: Arc<dyn Retriever>,
        generation: Arc<dyn GenerationClient>,
    ) -> Self {
        let pipeline = Pipeline {
            rewriter: QueryRewriter::new(generation.clone()),
            extractor: MetadataExtractor::new(),
            retriever,
            generation,
        };
        Self {
            config,
            state: RwLock::new(State::Ready(pipeline)),
        }
    }

    /// Load models, data and indexes; the only transition to `Ready`
    ///
    /// Any failure leaves the service `NotReady` and is reported to the
    /// caller; the host process decides whether that is fatal.
    pub async fn load(&self) -> Result<()> {
        tracing::info!("Loading RAG pipeline components");

        let store = Arc::new(PassageStore::load(&self.config.storage.passages_path())?);

        let provider = Arc::new(
            FastEmbedProvider::new(&self.config.embedding.model)
                .map_err(|e| LawbotError::Embedding(e.to_string()))?,
        );

        let params = HnswParams {
            ef_construction: self.config.retrieval.hnsw_ef_construction,
            m: self.config.retrieval.hnsw_m,
            ef_search: self.config.retrieval.hnsw_ef_search,
        };
        let vector_index = Arc::new(
            VectorIndex::build(
                store.clone(),
                provider,
                params,
                self.config.embedding.batch_size,
                &self.config.storage.embeddings_path(),
            )
            .map_err(|e| LawbotError::Embedding(e.to_string()))?,
        );

        let keyword_index = Arc::new(KeywordIndex::build(&store));

        let reranker = Arc::new(
            CrossEncoderReranker::new(&self.config.reranker.model)
                .map_err(|e| LawbotError::Rerank(e.to_string()))?,
        );

        let generation: Arc<dyn GenerationClient> = Arc::new(
            HttpGenerationClient::new(&self.config.generation)
                .map_err(|e| LawbotError::Generation(e.to_string()))?,
        );

        let retriever = Arc::new(HybridRetriever::new(
            store,
            vector_index,
            keyword_index,
            reranker,
            self.config.retrieval.clone(),
        ));

        let pipeline = Pipeline {
            rewriter: QueryRewriter::new(generation.clone()),
            extractor: MetadataExtractor::new(),
            retriever,
            generation,
        };

        *self.state.write().await = State::Ready(pipeline);
        tracing::info!("RAG pipeline is ready");
        Ok(())
    }

    pub async fn is_ready(&self) -> bool {
        matches!(*self.state.read().await, State::Ready(_))
    }

    /// Answer one question against the loaded corpus
    ///
    /// Never raises: while loading it returns the startup message, and any
    /// internal failure is caught here and degraded to the apologetic
    /// canned answer.
    pub async fn ask(&self, question: &str, history: &[ConversationTurn]) -> ChatResponse {
        let state = self.state.read().await;
        let State::Ready(pipeline) = &*state else {
            return ChatResponse::canned(prompts::STARTING_UP);
        };

        match pipeline.answer(question, history).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("ask failed: {}", e);
                ChatResponse::canned(prompts::PROCESSING_ERROR)
            }
        }
    }
}

impl Pipeline {
    async fn answer(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<ChatResponse> {
        if is_meta_question(question) {
            return self.answer_meta(question, history).await;
        }
        self.answer_grounded(question, history).await
    }

    /// Self-referential questions bypass retrieval entirely
    async fn answer_meta(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<ChatResponse> {
        tracing::debug!("Detected meta-conversation question");

        if history.is_empty() {
            return Ok(ChatResponse::canned(prompts::INTRODUCTION));
        }

        let prompt = prompts::meta_prompt(history, question);
        let answer = self
            .generation
            .complete(&prompt)
            .await
            .map_err(|e| LawbotError::Generation(e.to_string()))?;

        Ok(ChatResponse {
            answer,
            sources: Vec::new(),
        })
    }

    /// Default path: rewrite, filter, retrieve, synthesize
    async fn answer_grounded(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<ChatResponse> {
        let expanded = self.rewriter.expand(question);
        let standalone = self
            .rewriter
            .condense(&expanded, history)
            .await
            .map_err(|e| LawbotError::Generation(e.to_string()))?;

        let filter = self.extractor.extract(&standalone);
        let filter = (!filter.is_empty()).then_some(&filter);

        let outcome = self
            .retriever
            .retrieve(&standalone, filter)
            .await
            .map_err(|e| LawbotError::Retrieval(e.to_string()))?;

        let passages = match outcome {
            RetrievalOutcome::Empty => {
                tracing::info!("No relevant passages found");
                return Ok(ChatResponse::canned(prompts::NO_CONTEXT_FOUND));
            }
            RetrievalOutcome::Found(passages) => passages,
        };

        let prompt = prompts::grounded_prompt(&passages, &standalone);
        let answer = self
            .generation
            .complete(&prompt)
            .await
            .map_err(|e| LawbotError::Generation(e.to_string()))?;

        // sources are exactly the passages fed into the prompt
        let sources = passages.into_iter().map(|p| p.metadata).collect();

        Ok(ChatResponse { answer, sources })
    }
}

fn is_meta_question(question: &str) -> bool {
    let lowered = question.to_lowercase();
    prompts::META_QUESTION_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{DocumentType, Passage, RetrievalFilter};
    use crate::generation::GenerationError;
    use crate::retrieval::SearchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubRetriever {
        outcome: RetrievalOutcome,
        calls: AtomicUsize,
        last_filter: Mutex<Option<RetrievalFilter>>,
    }

    impl StubRetriever {
        fn new(outcome: RetrievalOutcome) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
                last_filter: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Retriever for StubRetriever {
        async fn retrieve(
            &self,
            _query: &str,
            filter: Option<&RetrievalFilter>,
        ) -> std::result::Result<RetrievalOutcome, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_filter.lock().unwrap() = filter.cloned();
            Ok(self.outcome.clone())
        }
    }

    struct StubGenerator {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationClient for StubGenerator {
        async fn complete(&self, _prompt: &str) -> std::result::Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .map_err(GenerationError::RequestError)
        }
    }

    fn sample_passage() -> Passage {
        Passage {
            content: "Phạt tiền từ 4.000.000 đồng đến 6.000.000 đồng...".to_string(),
            metadata: PassageMetadata {
                source_file: "nghi-dinh-100-2019.pdf".to_string(),
                document_type: DocumentType::Decree,
                document_number: "100/2019/NĐ-CP".to_string(),
                chapter: "Chương II".to_string(),
                section: None,
                article_title: "Điều 5. Xử phạt người điều khiển xe ô tô".to_string(),
                article_number: "5".to_string(),
            },
        }
    }

    fn service(retriever: Arc<StubRetriever>, generator: Arc<StubGenerator>) -> RagService {
        RagService::with_components(Config::default(), retriever, generator)
    }

    #[tokio::test]
    async fn not_ready_returns_startup_message() {
        let service = RagService::new(Config::default());
        assert!(!service.is_ready().await);

        let response = service.ask("vượt đèn đỏ phạt bao nhiêu?", &[]).await;
        assert_eq!(response.answer, prompts::STARTING_UP);
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn meta_question_without_history_returns_introduction() {
        let retriever = Arc::new(StubRetriever::new(RetrievalOutcome::Empty));
        let generator = Arc::new(StubGenerator::ok("không được gọi"));
        let service = service(retriever.clone(), generator.clone());

        let response = service.ask("Bạn là ai?", &[]).await;
        assert_eq!(response.answer, prompts::INTRODUCTION);
        assert!(response.sources.is_empty());
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn meta_question_with_history_uses_transcript_only() {
        let retriever = Arc::new(StubRetriever::new(RetrievalOutcome::Empty));
        let generator = Arc::new(StubGenerator::ok("Bạn vừa hỏi về mức phạt vượt đèn đỏ."));
        let service = service(retriever.clone(), generator.clone());

        let history = vec![ConversationTurn::new(
            "vượt đèn đỏ phạt bao nhiêu?",
            "Theo Điều 5...",
        )];
        let response = service.ask("tôi vừa hỏi gì?", &history).await;
        assert_eq!(response.answer, "Bạn vừa hỏi về mức phạt vượt đèn đỏ.");
        assert!(response.sources.is_empty());
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn grounded_answer_cites_exactly_the_fed_passages() {
        let passage = sample_passage();
        let retriever = Arc::new(StubRetriever::new(RetrievalOutcome::Found(vec![
            passage.clone(),
        ])));
        let generator = Arc::new(StubGenerator::ok("Mức phạt là 4-6 triệu đồng (theo Điều 5)."));
        let service = service(retriever, generator);

        let response = service.ask("ô tô vượt đèn đỏ phạt bao nhiêu?", &[]).await;
        assert_eq!(response.sources, vec![passage.metadata]);
    }

    #[tokio::test]
    async fn empty_retrieval_short_circuits_synthesis() {
        let retriever = Arc::new(StubRetriever::new(RetrievalOutcome::Empty));
        let generator = Arc::new(StubGenerator::ok("không được gọi"));
        let service = service(retriever.clone(), generator.clone());

        let response = service.ask("thuế thu nhập cá nhân?", &[]).await;
        assert_eq!(response.answer, prompts::NO_CONTEXT_FOUND);
        assert!(response.sources.is_empty());
        // empty history means condensation made no call either
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extracted_filter_reaches_the_retriever() {
        let retriever = Arc::new(StubRetriever::new(RetrievalOutcome::Empty));
        let generator = Arc::new(StubGenerator::ok(""));
        let service = service(retriever.clone(), generator);

        service.ask("Điều 9 nghị định 100 quy định gì?", &[]).await;

        let filter = retriever.last_filter.lock().unwrap().clone().unwrap();
        assert_eq!(filter.document_type, Some(DocumentType::Decree));
        assert_eq!(filter.document_number.as_deref(), Some("100"));
        assert_eq!(filter.article_number.as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn generation_failure_degrades_to_apology() {
        let retriever = Arc::new(StubRetriever::new(RetrievalOutcome::Found(vec![
            sample_passage(),
        ])));
        let generator = Arc::new(StubGenerator::failing("timeout"));
        let service = service(retriever, generator);

        let response = service.ask("mức phạt vượt đèn đỏ?", &[]).await;
        assert_eq!(response.answer, prompts::PROCESSING_ERROR);
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn identical_questions_yield_identical_sources() {
        let passage = sample_passage();
        let retriever = Arc::new(StubRetriever::new(RetrievalOutcome::Found(vec![
            passage.clone(),
        ])));
        let generator = Arc::new(StubGenerator::ok("câu trả lời cố định"));
        let service = service(retriever, generator);

        let first = service.ask("mức phạt vượt đèn đỏ?", &[]).await;
        let second = service.ask("mức phạt vượt đèn đỏ?", &[]).await;
        assert_eq!(first.sources, second.sources);
        assert_eq!(first.answer, second.answer);
    }
}
