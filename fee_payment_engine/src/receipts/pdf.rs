use std::path::{Path, PathBuf};

use log::*;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::{receipt_file_name, ReceiptDocument};
use crate::{
    db_types::VerifiedPayment,
    traits::{ReceiptLocation, ReceiptRenderer, RenderError},
};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const FONT_SIZE: f32 = 12.0;
const TITLE_X: f32 = 200.0;
const TITLE_Y: f32 = 750.0;
const ITEM_X: f32 = 50.0;
const TITLE_GAP: f32 = 40.0;
const LINE_SPACING: f32 = 25.0;
const FOOTER_GAP: f32 = 30.0;

/// Writes receipts as PDF files into a single directory.
#[derive(Debug, Clone)]
pub struct PdfReceiptRenderer {
    receipt_dir: PathBuf,
}

impl PdfReceiptRenderer {
    pub fn new<P: Into<PathBuf>>(receipt_dir: P) -> Self {
        Self { receipt_dir: receipt_dir.into() }
    }

    pub fn receipt_dir(&self) -> &Path {
        &self.receipt_dir
    }

    /// Where the receipt for `reference` is (or would be) written.
    pub fn location_for(&self, reference: &str) -> Result<ReceiptLocation, RenderError> {
        let file_name = receipt_file_name(reference)?;
        Ok(ReceiptLocation::new(self.receipt_dir.join(file_name)))
    }
}

impl ReceiptRenderer for PdfReceiptRenderer {
    async fn render(&self, payment: &VerifiedPayment) -> Result<ReceiptLocation, RenderError> {
        let location = self.location_for(&payment.reference)?;
        let document = ReceiptDocument::for_payment(payment);
        let bytes = tokio::task::spawn_blocking(move || layout_pdf(&document))
            .await
            .map_err(|e| RenderError::DocumentError(e.to_string()))??;
        let write_error = |e: std::io::Error| RenderError::WriteError {
            path: location.path.display().to_string(),
            reason: e.to_string(),
        };
        tokio::fs::create_dir_all(&self.receipt_dir).await.map_err(write_error)?;
        // Write to a scratch file first so that a half-written receipt is never served
        let scratch = location.path.with_extension("pdf.partial");
        tokio::fs::write(&scratch, bytes).await.map_err(write_error)?;
        tokio::fs::rename(&scratch, &location.path).await.map_err(write_error)?;
        info!("🧾️ Receipt for [{}] written to {}", payment.reference, location.path.display());
        Ok(location)
    }
}

fn layout_pdf(document: &ReceiptDocument) -> Result<Vec<u8>, RenderError> {
    let (pdf, page, layer) = PdfDocument::new(document.title(), pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "Receipt");
    let font =
        pdf.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| RenderError::DocumentError(format!("{e:?}")))?;
    let layer = pdf.get_page(page).get_layer(layer);
    layer.use_text(document.title(), FONT_SIZE, pt(TITLE_X), pt(TITLE_Y), &font);
    let mut y = TITLE_Y - TITLE_GAP;
    for line in document.items() {
        layer.use_text(winansi(&line), FONT_SIZE, pt(ITEM_X), pt(y), &font);
        y -= LINE_SPACING;
    }
    layer.use_text(document.footer(), FONT_SIZE, pt(TITLE_X), pt(y - FOOTER_GAP), &font);
    pdf.save_to_bytes().map_err(|e| RenderError::DocumentError(format!("{e:?}")))
}

// The built-in PDF fonts have no Naira glyph
fn winansi(line: &str) -> String {
    line.replace('₦', "NGN ")
}

fn pt(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}
