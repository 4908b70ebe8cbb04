//! Embedding & Indexing
//!
//! Local embedding generation plus the two candidate-generation indexes:
//! - `EmbeddingProvider` trait with a FastEmbed multilingual backend
//! - `VectorIndex`: HNSW semantic search with metadata filtering
//! - `KeywordIndex`: in-memory BM25 over whitespace tokens
mod keyword_index;
mod provider;
mod vector_index;

pub use keyword_index::{tokenize, KeywordIndex};
pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
pub use vector_index::{HnswParams, VectorIndex, VectorIndexError};
