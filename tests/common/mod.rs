pub mod fixtures;
pub mod pdf_assertions;

use inkpress::{Document, DocumentRenderer};
use lopdf::Document as LopdfDocument;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A rendered PDF, parsed back for inspection.
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save PDF to a file for manual debugging
    #[allow(dead_code)]
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Renders every page of `doc` and parses the result.
pub fn render_pdf(
    renderer: &DocumentRenderer,
    doc: &dyn Document,
) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    let mut out = Vec::new();
    renderer.render_pdf(doc, &mut out)?;
    GeneratedPdf::from_bytes(out)
}
