use crate::error::ConvoError;

/// Boundary to a document-text extraction utility.
pub trait DocumentTextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ConvoError>;
}

/// Extracts PDF text page by page with `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl DocumentTextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ConvoError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ConvoError::Document(format!("PDF extraction failed: {e}")))?;
        tracing::debug!(pages = pages.len(), "extracted pdf pages");
        Ok(join_pages(pages))
    }
}

/// Plain UTF-8 text files, decoded lossily.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl DocumentTextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ConvoError> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Pick an extractor from the file name. Anything that is not a PDF is read as text.
pub fn extractor_for(file_name: &str) -> Box<dyn DocumentTextExtractor> {
    if file_name.to_lowercase().ends_with(".pdf") {
        Box::new(PdfTextExtractor)
    } else {
        Box::new(PlainTextExtractor)
    }
}

/// Skip pages with no text, join the rest with newlines.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .filter(|page| !page.as_ref().trim().is_empty())
        .map(|page| page.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_pages_skips_empty_pages() {
        let text = join_pages(["first page", "", "  \n", "third page"]);
        assert_eq!(text, "first page\nthird page");
    }

    #[test]
    fn join_pages_of_nothing_is_empty() {
        assert_eq!(join_pages(Vec::<String>::new()), "");
    }

    #[test]
    fn garbage_bytes_are_a_document_error() {
        let err = PdfTextExtractor.extract(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ConvoError::Document(_)));
    }

    #[test]
    fn extractor_choice_follows_extension() {
        let text = extractor_for("notes.txt").extract(b"hello").unwrap();
        assert_eq!(text, "hello");
    }
}
