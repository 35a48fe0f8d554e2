//! Resume text extraction from PDF documents.
//!
//! Pages are read with `lopdf` in page order. A page whose text cannot be
//! decoded contributes an empty segment so page positions are preserved.

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

use std::path::Path;

use cvscreen_shared::{Result, ScreenError};
use lopdf::Document;
use tracing::{debug, info, instrument, warn};

/// Extract the text of every page of the PDF at `path`, in page order.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_pages(path: &Path) -> Result<Vec<String>> {
    let doc = load(path)?;

    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for page_num in pages.keys() {
        let text = match doc.extract_text(&[*page_num]) {
            Ok(text) => text,
            Err(e) => {
                warn!(page = page_num, error = %e, "page text not extractable");
                String::new()
            }
        };
        texts.push(text);
    }

    debug!(pages = texts.len(), "extracted page text");
    Ok(texts)
}

/// Read a resume and return its page texts joined by newlines.
pub fn read_resume(path: &Path) -> Result<String> {
    let pages = extract_pages(path)?;
    let text = join_pages(&pages);
    info!(path = %path.display(), pages = pages.len(), chars = text.len(), "resume read");
    Ok(text)
}

fn load(path: &Path) -> Result<Document> {
    Document::load(path).map_err(|e| ScreenError::document(path, e.to_string()))
}

/// Join page texts with a single newline between pages.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim_end_matches(['\r', '\n']))
        .collect::<Vec<_>>()
        .join("\n")
}
