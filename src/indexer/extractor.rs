use super::pdf_extractor::extract_pdf_to_markdown;
use crate::error::ExtractionSkip;
use crate::types::Document;
use std::fs;
use std::path::Path;

/// Turns one file into zero or more documents
///
/// Any reason a file cannot contribute text is reported as an
/// [`ExtractionSkip`]; callers log it and move on.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    max_file_size: u64,
}

impl TextExtractor {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Extract the text of `path`, naming documents after `relative_name`
    pub fn extract(
        &self,
        path: &Path,
        relative_name: &str,
    ) -> Result<Vec<Document>, ExtractionSkip> {
        let metadata =
            fs::metadata(path).map_err(|e| ExtractionSkip::Unreadable(e.to_string()))?;
        if metadata.len() > self.max_file_size {
            return Err(ExtractionSkip::TooLarge {
                size: metadata.len(),
                max: self.max_file_size,
            });
        }

        let text = if is_pdf(path) {
            extract_pdf_to_markdown(path).map_err(|e| ExtractionSkip::Pdf(format!("{:#}", e)))?
        } else {
            let bytes = fs::read(path).map_err(|e| ExtractionSkip::Unreadable(e.to_string()))?;
            if !is_text(&bytes) {
                return Err(ExtractionSkip::Binary);
            }
            String::from_utf8(bytes).map_err(|_| ExtractionSkip::InvalidUtf8)?
        };

        if text.trim().is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![Document::new(relative_name, text)])
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// A NUL byte marks a file as binary; everything else is left to UTF-8 decoding
pub(crate) fn is_text(content: &[u8]) -> bool {
    !content.contains(&0)
}
