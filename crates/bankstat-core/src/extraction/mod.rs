pub mod delimited;
pub mod layout;
pub mod pdftotext;
pub mod workbook;

use crate::error::StatementError;

/// A piece of positioned text from a PDF page. Coordinates are in layout
/// units with the origin at the top-left, y growing downward.
#[derive(Debug, Clone)]
pub struct PositionedFragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Positioned fragments extracted from a single PDF page.
#[derive(Debug, Clone)]
pub struct PageFragments {
    pub page_number: usize,
    pub fragments: Vec<PositionedFragment>,
}

/// Named-field tabular data from delimited text or a workbook sheet.
#[derive(Debug, Clone, Default)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract positioned text from PDF bytes, one entry per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageFragments>, StatementError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
