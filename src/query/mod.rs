//! Query preprocessing
//!
//! Two independent steps run before retrieval: the rewriter expands
//! colloquial phrasing and condenses follow-ups into standalone questions,
//! and the metadata extractor derives a retrieval filter from explicit
//! document/article references in the question text.
mod metadata;
mod rewrite;

pub use metadata::MetadataExtractor;
pub use rewrite::QueryRewriter;
