//! Metadata extraction from question text
use crate::corpus::{DocumentType, RetrievalFilter};
use regex::Regex;

/// Pulls document and article references out of a question
///
/// Pure function over the text: whatever matches populates the filter,
/// absence of a match is normal and produces an empty filter. There is no
/// error path.
pub struct MetadataExtractor {
    document_pattern: Regex,
    article_pattern: Regex,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        // "nghị định 100", "Luật số 23/2008", "thông tư 12/2020/TT-BGTVT"
        let document_pattern =
            Regex::new(r"(?i)(luật|nghị\s+định|thông\s+tư)\s+(?:số\s+)?(\d+[\w/.\-]*)")
                .expect("document reference pattern is valid");
        // "Điều 9", "article 9"
        let article_pattern =
            Regex::new(r"(?i)(?:điều|article)\s+(\d+)").expect("article reference pattern is valid");

        Self {
            document_pattern,
            article_pattern,
        }
    }

    /// Build the retrieval filter for one question
    ///
    /// The document number is kept as a substring constraint: questions
    /// usually carry a short form ("nghị định 100") of the canonical
    /// stored number ("100/2019/NĐ-CP"). Article numbers match exactly.
    pub fn extract(&self, question: &str) -> RetrievalFilter {
        let mut filter = RetrievalFilter::default();

        if let Some(captures) = self.document_pattern.captures(question) {
            filter.document_type = DocumentType::from_keyword(&normalize_spaces(&captures[1]));
            filter.document_number = Some(captures[2].trim_end_matches('.').to_string());
        }

        if let Some(captures) = self.article_pattern.captures(question) {
            filter.article_number = Some(captures[1].to_string());
        }

        if !filter.is_empty() {
            tracing::debug!(?filter, "Extracted metadata filter");
        }
        filter
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decree_and_article_references_are_both_captured() {
        let extractor = MetadataExtractor::new();
        let filter = extractor.extract("Điều 9 nghị định 100 quy định gì?");

        assert_eq!(filter.document_type, Some(DocumentType::Decree));
        assert_eq!(filter.document_number.as_deref(), Some("100"));
        assert_eq!(filter.article_number.as_deref(), Some("9"));
    }

    #[test]
    fn law_reference_with_so_prefix() {
        let extractor = MetadataExtractor::new();
        let filter = extractor.extract("Luật số 23/2008 nói gì về tốc độ?");

        assert_eq!(filter.document_type, Some(DocumentType::Law));
        assert_eq!(filter.document_number.as_deref(), Some("23/2008"));
        assert_eq!(filter.article_number, None);
    }

    #[test]
    fn circular_reference_is_case_insensitive() {
        let extractor = MetadataExtractor::new();
        let filter = extractor.extract("THÔNG TƯ 12/2020 có hiệu lực khi nào?");

        assert_eq!(filter.document_type, Some(DocumentType::Circular));
        assert_eq!(filter.document_number.as_deref(), Some("12/2020"));
    }

    #[test]
    fn article_only_reference() {
        let extractor = MetadataExtractor::new();
        let filter = extractor.extract("điều 60 quy định về độ tuổi lái xe");

        assert_eq!(filter.document_type, None);
        assert_eq!(filter.document_number, None);
        assert_eq!(filter.article_number.as_deref(), Some("60"));
    }

    #[test]
    fn plain_question_yields_empty_filter() {
        let extractor = MetadataExtractor::new();
        let filter = extractor.extract("vượt đèn đỏ bị phạt bao nhiêu tiền?");
        assert!(filter.is_empty());
    }
}
