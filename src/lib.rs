//! Lawbot - Legal QA over Vietnamese road-traffic statutes
//!
//! A hybrid retrieval and reranking pipeline: semantic (embedding) and
//! lexical (BM25) candidate generation over a fixed statute corpus,
//! cross-encoder reranking, and grounded answer synthesis with citations.
//! The web layer, chat persistence and PDF ingestion are external
//! collaborators; this crate exposes a single `RagService` with
//! `load`/`is_ready`/`ask`.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod query;
pub mod retrieval;
pub mod service;

pub use error::{LawbotError, Result};
