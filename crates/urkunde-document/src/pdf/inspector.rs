// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF inspector — re-open rendered documents with `lopdf` to check their
// structure (page count, page sizes) without trusting the composer.

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument};
use urkunde_core::error::{GenerationError, Result};

/// Read-only view over a rendered PDF.
pub struct PdfInspector {
    document: Document,
}

impl PdfInspector {
    /// Parse PDF bytes. Anything lopdf cannot load is a `RenderFailure`.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            GenerationError::RenderFailure(format!("not a readable PDF: {err}"))
        })?;

        debug!(pages = document.get_pages().len(), "PDF parsed");
        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height in points of a page (1-indexed), taken from its
    /// media box. Inherited boxes on the page tree are honoured.
    pub fn page_size(&self, page_number: u32) -> Option<(f32, f32)> {
        let page_id = *self.document.get_pages().get(&page_number)?;
        let [x0, y0, x1, y1] = self.media_box(page_id)?;
        Some(((x1 - x0).abs(), (y1 - y0).abs()))
    }

    fn media_box(&self, node: ObjectId) -> Option<[f32; 4]> {
        let mut current = Some(node);
        // Page trees are shallow; the bound only guards against cycles.
        for _ in 0..32 {
            let dict = self.document.get_dictionary(current?).ok()?;
            if let Some(rect) = rect_entry(dict, b"MediaBox") {
                return Some(rect);
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }
}

fn rect_entry(dict: &Dictionary, key: &[u8]) -> Option<[f32; 4]> {
    let values = dict.get(key).and_then(Object::as_array).ok()?;
    let numbers: Vec<f32> = values.iter().filter_map(|v| v.as_float().ok()).collect();
    numbers.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_a_render_failure() {
        assert!(matches!(
            PdfInspector::from_bytes(b"definitely not a pdf"),
            Err(GenerationError::RenderFailure(_))
        ));
    }

    #[test]
    fn truncated_pdf_is_rejected() {
        assert!(PdfInspector::from_bytes(b"%PDF-1.7\n").is_err());
    }
}
