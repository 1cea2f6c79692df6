//! Laid-out document model.
//!
//! Coordinates are millimetres from the top-left corner of the page; text
//! ops are positioned by their baseline. Conversion to PDF user space
//! happens only in [`crate::render`].

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::assets::RasterImage;
use crate::metrics::{FontFace, MM_PER_PT};

/// Helvetica ascender and descender as fractions of the em size.
const ASCENT: f32 = 0.718;
const DESCENT: f32 = 0.207;

/// MIME prefix of [`PreviewHandle::data_uri`].
pub const PDF_DATA_URI_PREFIX: &str = "data:application/pdf;base64,";

/// 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Components scaled to `0.0..=1.0` for PDF operators.
    #[must_use]
    pub fn unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectMm {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectMm {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// True when the interiors overlap. Touching edges do not count.
    #[must_use]
    pub fn intersects(&self, other: &RectMm) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    #[must_use]
    pub fn contains(&self, other: &RectMm) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// A single line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOp {
    pub x: f32,
    pub baseline: f32,
    pub text: String,
    pub face: FontFace,
    pub size_pt: f32,
    pub color: Rgb,
}

impl TextOp {
    #[must_use]
    pub fn width_mm(&self) -> f32 {
        self.face.text_width_mm(&self.text, self.size_pt)
    }

    /// Glyph box from ascender to descender.
    #[must_use]
    pub fn bounds(&self) -> RectMm {
        let size_mm = self.size_pt * MM_PER_PT;
        let top = self.baseline - ASCENT * size_mm;
        RectMm::new(self.x, top, self.width_mm(), (ASCENT + DESCENT) * size_mm)
    }
}

/// One drawing instruction, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: RectMm,
        color: Rgb,
        corner_radius: f32,
    },
    Text(TextOp),
    Image {
        rect: RectMm,
        image: Arc<RasterImage>,
    },
}

impl DrawOp {
    #[must_use]
    pub fn bounds(&self) -> RectMm {
        match self {
            Self::FillRect { rect, .. } | Self::Image { rect, .. } => *rect,
            Self::Text(text) => text.bounds(),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextOp> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A fixed-size page and its ops.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width_mm: f32,
    pub height_mm: f32,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn text_ops(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(DrawOp::as_text)
    }

    /// First text op whose content equals `text`.
    #[must_use]
    pub fn find_text(&self, text: &str) -> Option<&TextOp> {
        self.text_ops().find(|op| op.text == text)
    }
}

/// Immutable, paginated result of
/// [`CertificateBuilder::build`](crate::CertificateBuilder::build).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    registration_code: String,
    pages: Vec<Page>,
}

impl Document {
    pub(crate) fn new(registration_code: String, pages: Vec<Page>) -> Self {
        Self {
            registration_code,
            pages,
        }
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn registration_code(&self) -> &str {
        &self.registration_code
    }

    /// Serialize to PDF. The output depends only on the document.
    #[must_use]
    pub fn to_portable_bytes(&self) -> Vec<u8> {
        let bytes = crate::render::render_pdf(self);
        tramite_utils::logging::log_document_built(
            &self.registration_code,
            self.pages.len(),
            &bytes,
        );
        bytes
    }

    /// Render and wrap the bytes for display.
    #[must_use]
    pub fn to_preview_handle(&self) -> PreviewHandle {
        let (page_width_mm, page_height_mm) = self
            .pages
            .first()
            .map_or((0.0, 0.0), |page| (page.width_mm, page.height_mm));
        PreviewHandle {
            page_count: self.pages.len(),
            page_width_mm,
            page_height_mm,
            bytes: self.to_portable_bytes(),
        }
    }
}

/// Rendered certificate ready for a viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewHandle {
    pub page_count: usize,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    #[serde(skip)]
    bytes: Vec<u8>,
}

impl PreviewHandle {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// `data:application/pdf;base64,...`, loadable by browsers and viewers.
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("{PDF_DATA_URI_PREFIX}{}", STANDARD.encode(&self.bytes))
    }
}
