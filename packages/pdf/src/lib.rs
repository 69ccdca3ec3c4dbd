#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-page PDF text extraction.
//!
//! Text is pulled out of PDFs with pure-Rust extraction ([`pdf_extract`])
//! and handed on as plain [`PageText`] values in approximate reading order.
//! No layout or table structure is recovered.
//!
//! Callers depend on the [`PageSource`] trait rather than on
//! [`pdf_extract`] directly, so the scanning pipeline can be driven from a
//! PDF on disk ([`PdfFile`]), PDF bytes already in memory ([`PdfBytes`]),
//! or literal text ([`TextPages`]).

use std::path::PathBuf;

use pdf_max_models::PageText;

/// Errors specific to PDF extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// Reading the PDF file failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// PDF text extraction failed (malformed or unsupported PDF).
    #[error("PDF extraction error: {0}")]
    Extraction(String),
}

/// Anything that can produce the text of a document page by page.
pub trait PageSource {
    /// Returns every page's text in document order, numbered from 1.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the underlying document cannot be read.
    fn pages(&self) -> Result<Vec<PageText>, PdfError>;
}

/// A PDF file on disk.
#[derive(Debug, Clone)]
pub struct PdfFile {
    path: PathBuf,
}

impl PdfFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageSource for PdfFile {
    fn pages(&self) -> Result<Vec<PageText>, PdfError> {
        let bytes = std::fs::read(&self.path).map_err(|source| PdfError::Io {
            path: self.path.clone(),
            source,
        })?;

        log::debug!("Read {} bytes from {}", bytes.len(), self.path.display());

        extract_pages_from_mem(&bytes)
    }
}

/// PDF bytes already held in memory.
#[derive(Debug, Clone, Copy)]
pub struct PdfBytes<'a>(pub &'a [u8]);

impl PageSource for PdfBytes<'_> {
    fn pages(&self) -> Result<Vec<PageText>, PdfError> {
        extract_pages_from_mem(self.0)
    }
}

/// Pre-extracted page text, one string per page.
#[derive(Debug, Clone, Default)]
pub struct TextPages {
    pages: Vec<String>,
}

impl TextPages {
    #[must_use]
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }

    /// A single-page document.
    #[must_use]
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            pages: vec![text.into()],
        }
    }
}

impl PageSource for TextPages {
    fn pages(&self) -> Result<Vec<PageText>, PdfError> {
        Ok(number_pages(self.pages.iter().cloned()))
    }
}

/// Extracts per-page text from PDF bytes.
///
/// # Errors
///
/// Returns [`PdfError::Extraction`] if the bytes are not a readable PDF.
pub fn extract_pages_from_mem(bytes: &[u8]) -> Result<Vec<PageText>, PdfError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

    let pages = number_pages(pages);

    log::debug!(
        "Extracted {} page(s), {} characters of text",
        pages.len(),
        pages.iter().map(|p| p.text.len()).sum::<usize>()
    );

    Ok(pages)
}

/// Joins every page's text with newlines, the same way the document-wide
/// unit detection sees it.
#[must_use]
pub fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn number_pages(texts: impl IntoIterator<Item = String>) -> Vec<PageText> {
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| PageText::new(i + 1, text))
        .collect()
}
