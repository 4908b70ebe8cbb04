//! Passage corpus: the immutable unit of retrievable statute text
//!
//! Passages are produced offline by the ingestion job (PDF → structured
//! records) and loaded read-only at startup. Nothing in this module mutates
//! after load.

mod store;

pub use store::PassageStore;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of legal document a passage was segmented from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "Luật")]
    Law,
    #[serde(rename = "Nghị định")]
    Decree,
    #[serde(rename = "Thông tư")]
    Circular,
    #[serde(rename = "Văn bản khác")]
    Other,
}

impl DocumentType {
    /// Vietnamese display name as stored by the ingestion job
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Law => "Luật",
            DocumentType::Decree => "Nghị định",
            DocumentType::Circular => "Thông tư",
            DocumentType::Other => "Văn bản khác",
        }
    }

    /// Parse a document-type keyword as it appears in question text
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let normalized = keyword.trim().to_lowercase();
        match normalized.as_str() {
            "luật" => Some(DocumentType::Law),
            "nghị định" => Some(DocumentType::Decree),
            "thông tư" => Some(DocumentType::Circular),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural metadata attached to every passage
///
/// Closed field set; the ingestion job guarantees `article_number` is the
/// numeric label extracted from `article_title` for article-structured
/// documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageMetadata {
    pub source_file: String,
    pub document_type: DocumentType,
    pub document_number: String,
    #[serde(default)]
    pub chapter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub article_title: String,
    pub article_number: String,
}

impl PassageMetadata {
    /// Short citation used in prompt context and answer sources,
    /// e.g. "Điều 9. ... (Nghị định 100/2019/NĐ-CP)"
    pub fn citation(&self) -> String {
        format!(
            "{} ({} {})",
            self.article_title, self.document_type, self.document_number
        )
    }
}

/// A segmented, citable unit of statute text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    #[serde(flatten)]
    pub metadata: PassageMetadata,
}

/// Metadata constraints derived from a single question
///
/// Built fresh per query by the metadata extractor; empty means no
/// constraint. Document number matches by substring (questions usually give
/// a short form of the canonical number), article number by equality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalFilter {
    pub document_type: Option<DocumentType>,
    pub document_number: Option<String>,
    pub article_number: Option<String>,
}

impl RetrievalFilter {
    pub fn is_empty(&self) -> bool {
        self.document_type.is_none()
            && self.document_number.is_none()
            && self.article_number.is_none()
    }

    /// True when the passage satisfies every present constraint
    pub fn matches(&self, metadata: &PassageMetadata) -> bool {
        if let Some(doc_type) = self.document_type {
            if metadata.document_type != doc_type {
                return false;
            }
        }
        if let Some(number) = &self.document_number {
            if !metadata.document_number.contains(number.as_str()) {
                return false;
            }
        }
        if let Some(article) = &self.article_number {
            if metadata.article_number != *article {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decree_metadata() -> PassageMetadata {
        PassageMetadata {
            source_file: "nghi-dinh-100-2019.pdf".to_string(),
            document_type: DocumentType::Decree,
            document_number: "100/2019/NĐ-CP".to_string(),
            chapter: "Chương II".to_string(),
            section: None,
            article_title: "Điều 9. Xử phạt người điều khiển xe đạp".to_string(),
            article_number: "9".to_string(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = RetrievalFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&decree_metadata()));
    }

    #[test]
    fn document_number_is_substring_constraint() {
        let filter = RetrievalFilter {
            document_number: Some("100".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&decree_metadata()));

        let filter = RetrievalFilter {
            document_number: Some("168".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&decree_metadata()));
    }

    #[test]
    fn article_number_is_equality_constraint() {
        let filter = RetrievalFilter {
            article_number: Some("9".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&decree_metadata()));

        let filter = RetrievalFilter {
            article_number: Some("90".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&decree_metadata()));
    }

    #[test]
    fn all_constraints_are_conjunctive() {
        let filter = RetrievalFilter {
            document_type: Some(DocumentType::Decree),
            document_number: Some("100".to_string()),
            article_number: Some("10".to_string()),
        };
        assert!(!filter.matches(&decree_metadata()));
    }

    #[test]
    fn document_type_serializes_with_display_name() {
        let json = serde_json::to_string(&DocumentType::Decree).unwrap();
        assert_eq!(json, "\"Nghị định\"");

        let parsed: DocumentType = serde_json::from_str("\"Thông tư\"").unwrap();
        assert_eq!(parsed, DocumentType::Circular);
    }

    #[test]
    fn document_type_from_keyword_is_case_insensitive() {
        assert_eq!(
            DocumentType::from_keyword("Nghị định"),
            Some(DocumentType::Decree)
        );
        assert_eq!(DocumentType::from_keyword("luật"), Some(DocumentType::Law));
        assert_eq!(DocumentType::from_keyword("quyết định"), None);
    }
}
