/// In-memory BM25 keyword index over the passage store
///
/// Built once at load time from the full corpus; O(corpus) build cost is
/// accepted because the corpus is thousands of passages, not millions.
/// Postings are derived from passage content and never persisted.
use crate::corpus::PassageStore;
use ahash::AHashMap;

const BM25_K1: f32 = 1.5;
const BM25_B: f32 = 0.75;

/// Lowercased whitespace tokenization, shared by index build and queries
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// BM25 term-frequency index
///
/// Scores every passage for a tokenized query; `top_n` keeps only positive
/// scores and breaks ties by ingestion order.
pub struct KeywordIndex {
    /// term -> number of passages containing it
    document_frequencies: AHashMap<String, u32>,
    /// per-passage term frequencies, in ingestion order
    term_frequencies: Vec<AHashMap<String, u32>>,
    /// per-passage token counts
    document_lengths: Vec<f32>,
    average_length: f32,
}

impl KeywordIndex {
    /// Build the index from the full passage store
    pub fn build(store: &PassageStore) -> Self {
        let mut document_frequencies: AHashMap<String, u32> = AHashMap::new();
        let mut term_frequencies = Vec::with_capacity(store.len());
        let mut document_lengths = Vec::with_capacity(store.len());

        for passage in store.all() {
            let tokens = tokenize(&passage.content);
            document_lengths.push(tokens.len() as f32);

            let mut frequencies: AHashMap<String, u32> = AHashMap::new();
            for token in tokens {
                *frequencies.entry(token).or_insert(0) += 1;
            }
            for term in frequencies.keys() {
                *document_frequencies.entry(term.clone()).or_insert(0) += 1;
            }
            term_frequencies.push(frequencies);
        }

        let average_length = if document_lengths.is_empty() {
            0.0
        } else {
            document_lengths.iter().sum::<f32>() / document_lengths.len() as f32
        };

        tracing::info!(
            "Keyword index built: {} passages, {} distinct terms",
            term_frequencies.len(),
            document_frequencies.len()
        );

        Self {
            document_frequencies,
            term_frequencies,
            document_lengths,
            average_length,
        }
    }

    /// BM25 score of one query against every passage, in ingestion order
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f32> {
        let total_docs = self.term_frequencies.len() as f32;
        let mut scores = vec![0.0f32; self.term_frequencies.len()];

        for token in query_tokens {
            let Some(&df) = self.document_frequencies.get(token) else {
                continue;
            };
            let idf = (1.0 + (total_docs - df as f32 + 0.5) / (df as f32 + 0.5)).ln();

            for (index, frequencies) in self.term_frequencies.iter().enumerate() {
                let Some(&tf) = frequencies.get(token) else {
                    continue;
                };
                let tf = tf as f32;
                let length_norm =
                    1.0 - BM25_B + BM25_B * self.document_lengths[index] / self.average_length;
                scores[index] += idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * length_norm);
            }
        }

        scores
    }

    /// The n best-scoring passage indices with score > 0
    ///
    /// Sort is stable, so equal scores keep ingestion order.
    pub fn top_n(&self, query_tokens: &[String], n: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .scores(query_tokens)
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(n);
        ranked
    }

    pub fn len(&self) -> usize {
        self.term_frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.term_frequencies.is_empty()
    }
}
