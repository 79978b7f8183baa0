//! Page-range text extraction for quiz context.

use std::sync::Arc;

use crate::object_store::ObjectStore;

/// Text pulled from a window of pages around the reader's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub content: String,
    pub start_page: i64,
    pub end_page: i64,
}

pub trait TextExtractor: Send + Sync {
    /// Extract text from pages `[current_page - page_range, current_page]`,
    /// clamped to the document. Page numbers are 1-based.
    fn extract_range(
        &self,
        name: &str,
        current_page: i64,
        page_range: i64,
    ) -> std::result::Result<ExtractedText, String>;
}

/// Extractor for plain-text objects with form-feed page breaks.
pub struct PlainTextExtractor {
    objects: Arc<dyn ObjectStore>,
}

impl PlainTextExtractor {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract_range(
        &self,
        name: &str,
        current_page: i64,
        page_range: i64,
    ) -> std::result::Result<ExtractedText, String> {
        let bytes = self.objects.read(name)?;
        let text = String::from_utf8(bytes).map_err(|_| "document is not valid UTF-8".to_string())?;
        let pages: Vec<&str> = text.split('\u{c}').collect();
        let total = pages.len() as i64;
        let end = current_page.clamp(1, total);
        let start = (end - page_range).max(1);
        let content = pages[(start - 1) as usize..end as usize]
            .iter()
            .map(|p| p.trim())
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(ExtractedText {
            content,
            start_page: start,
            end_page: end,
        })
    }
}
