//! Page preview rendering and its coalescing queue.
//!
//! Rendering runs under `spawn_blocking` for the same reason text extraction
//! does (see [`crate::pipeline::text`]). The scale factor is derived from the
//! requested target width: pdfium renders the page at
//! `target_width / native_page_width` so the bitmap always fits the preview
//! surface regardless of the page's physical size.

use crate::error::Pdf2CsvError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

/// Render one page of a PDF to a bitmap sized to `target_width`.
///
/// `page_number` is 1-indexed and must satisfy `1 <= page_number <= page_count`.
pub async fn render_page(
    pdf_bytes: Vec<u8>,
    page_number: usize,
    target_width: u32,
) -> Result<DynamicImage, Pdf2CsvError> {
    let result =
        tokio::task::spawn_blocking(move || render_page_blocking(&pdf_bytes, page_number, target_width))
            .await
            .map_err(|e| Pdf2CsvError::Internal(format!("Render task panicked: {}", e)))?;

    result
}

/// Blocking implementation of page rendering.
fn render_page_blocking(
    pdf_bytes: &[u8],
    page_number: usize,
    target_width: u32,
) -> Result<DynamicImage, Pdf2CsvError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| Pdf2CsvError::PdfRead {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;

    if page_number < 1 || page_number > page_count {
        return Err(Pdf2CsvError::PdfRender {
            page: page_number,
            detail: format!("page out of range (document has {} pages)", page_count),
        });
    }

    let page = pages
        .get((page_number - 1) as u16)
        .map_err(|e| Pdf2CsvError::PdfRender {
            page: page_number,
            detail: format!("{:?}", e),
        })?;

    let render_config = PdfRenderConfig::new().set_target_width(target_width as i32);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| Pdf2CsvError::PdfRender {
            page: page_number,
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px",
        page_number,
        image.width(),
        image.height()
    );

    Ok(image)
}

/// Coalescing discipline for preview renders: at most one render in flight,
/// and a single `pending` slot that the latest request overwrites.
///
/// This is not cancellation — an in-flight render always runs to completion.
/// Intermediate queued page numbers are dropped, not batched: only the most
/// recently requested page is rendered once the active render finishes.
#[derive(Debug, Default)]
pub struct RenderQueue {
    active: bool,
    pending: Option<usize>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a render is in flight.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Request a page render.
    ///
    /// Returns `Some(page)` when the caller should start rendering now, or
    /// `None` when a render is already in flight and the request was parked
    /// in the pending slot (replacing any previously parked page).
    pub fn request(&mut self, page: usize) -> Option<usize> {
        if self.active {
            self.pending = Some(page);
            None
        } else {
            self.active = true;
            Some(page)
        }
    }

    /// Mark the in-flight render complete and drain the pending slot.
    ///
    /// Returns `Some(page)` when a parked request should be rendered next
    /// (the queue stays active), or `None` when the queue goes idle.
    pub fn complete(&mut self) -> Option<usize> {
        match self.pending.take() {
            Some(next) => Some(next),
            None => {
                self.active = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_request_starts_immediately() {
        let mut q = RenderQueue::new();
        assert_eq!(q.request(1), Some(1));
        assert!(q.is_active());
    }

    #[test]
    fn latest_pending_request_wins() {
        let mut q = RenderQueue::new();
        assert_eq!(q.request(1), Some(1));
        // Pages 2 and 3 requested while page 1 renders; 2 is dropped.
        assert_eq!(q.request(2), None);
        assert_eq!(q.request(3), None);
        assert_eq!(q.complete(), Some(3));
        assert!(q.is_active());
        assert_eq!(q.complete(), None);
        assert!(!q.is_active());
    }

    #[test]
    fn complete_without_pending_goes_idle() {
        let mut q = RenderQueue::new();
        q.request(5);
        assert_eq!(q.complete(), None);
        assert_eq!(q.request(6), Some(6));
    }

    // Needs libpdfium installed; gated like the other pdfium-touching tests.
    #[tokio::test]
    async fn render_garbage_fails_as_pdf_read() {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run pdfium tests");
            return;
        }
        let err = render_page(b"junk".to_vec(), 1, 800).await.unwrap_err();
        assert!(matches!(err, Pdf2CsvError::PdfRead { .. }));
    }
}
