//! PDF serialization with `pdf-writer`.
//!
//! Object numbering, stream compression and resource names are all derived
//! from the document in order, and no creation date or file identifier is
//! written, so equal documents serialize to equal bytes.

use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::assets::RasterImage;
use crate::document::{Document, DrawOp, RectMm, Rgb, TextOp};
use crate::metrics::{FontFace, MM_PER_PT, encode_win_ansi};

const DEFLATE_LEVEL: u8 = 6;
/// Control-point distance for a quarter circle drawn with one cubic.
const KAPPA: f32 = 0.552_284_8;

fn pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

struct RefAllocator(i32);

impl RefAllocator {
    fn next(&mut self) -> Ref {
        let r = Ref::new(self.0);
        self.0 += 1;
        r
    }
}

/// Page height in points, used to flip the y axis.
struct PageSpace {
    height_pt: f32,
}

impl PageSpace {
    fn y(&self, y_mm: f32) -> f32 {
        self.height_pt - pt(y_mm)
    }

    /// Lower-left corner of `rect` in PDF user space.
    fn origin(&self, rect: &RectMm) -> (f32, f32) {
        (pt(rect.x), self.y(rect.bottom()))
    }
}

pub(crate) fn render_pdf(doc: &Document) -> Vec<u8> {
    let mut pdf = Pdf::new();
    pdf.set_version(1, 7);
    let mut refs = RefAllocator(1);

    let catalog_id = refs.next();
    let pages_id = refs.next();
    let info_id = refs.next();
    let fonts = [FontFace::Regular, FontFace::Bold].map(|face| (face, refs.next()));

    for (face, id) in fonts {
        pdf.type1_font(id)
            .base_font(Name(face.base_font().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    // Each distinct image is embedded once, in first-use order.
    let mut images: Vec<(&RasterImage, String, Ref)> = Vec::new();
    for op in doc.pages().iter().flat_map(|page| page.ops.iter()) {
        if let DrawOp::Image { image, .. } = op {
            if images.iter().all(|(seen, _, _)| *seen != image.as_ref()) {
                let name = format!("Im{}", images.len() + 1);
                images.push((image.as_ref(), name, refs.next()));
            }
        }
    }
    for (image, _, id) in &images {
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&image.rgb, DEFLATE_LEVEL);
        let mut xobj = pdf.image_xobject(*id, &compressed);
        xobj.filter(Filter::FlateDecode);
        xobj.width(image.width_px as i32);
        xobj.height(image.height_px as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
    }

    let page_refs: Vec<(Ref, Ref)> = doc.pages().iter().map(|_| (refs.next(), refs.next())).collect();

    for (page, (page_id, content_id)) in doc.pages().iter().zip(&page_refs) {
        let space = PageSpace {
            height_pt: pt(page.height_mm),
        };
        let mut content = Content::new();
        for op in &page.ops {
            match op {
                DrawOp::FillRect {
                    rect,
                    color,
                    corner_radius,
                } => fill_rect(&mut content, &space, rect, *color, *corner_radius),
                DrawOp::Text(text) => draw_text(&mut content, &space, text),
                DrawOp::Image { rect, image } => {
                    let Some((_, name, _)) = images.iter().find(|(seen, _, _)| *seen == image.as_ref()) else {
                        continue;
                    };
                    let (x, y) = space.origin(rect);
                    content.save_state();
                    content.transform([pt(rect.width), 0.0, 0.0, pt(rect.height), x, y]);
                    content.x_object(Name(name.as_bytes()));
                    content.restore_state();
                }
            }
        }

        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), DEFLATE_LEVEL);
        pdf.stream(*content_id, &compressed).filter(Filter::FlateDecode);

        let mut pdf_page = pdf.page(*page_id);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, pt(page.width_mm), pt(page.height_mm)))
            .parent(pages_id)
            .contents(*content_id);
        let mut resources = pdf_page.resources();
        {
            let mut font_dict = resources.fonts();
            for (face, id) in fonts {
                font_dict.pair(Name(face.resource_name().as_bytes()), id);
            }
        }
        if !images.is_empty() {
            let mut xobjects = resources.x_objects();
            for (_, name, id) in &images {
                xobjects.pair(Name(name.as_bytes()), *id);
            }
        }
        resources.finish();
        pdf_page.finish();
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_refs.iter().map(|(page_id, _)| *page_id))
        .count(page_refs.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr(&format!("Certificado de Registro Sanitario {}", doc.registration_code())))
        .producer(TextStr("tramite"));

    pdf.finish()
}

fn set_fill(content: &mut Content, color: Rgb) {
    let (r, g, b) = color.unit();
    content.set_fill_rgb(r, g, b);
}

fn fill_rect(content: &mut Content, space: &PageSpace, rect: &RectMm, color: Rgb, radius_mm: f32) {
    set_fill(content, color);
    let (x, y) = space.origin(rect);
    let (w, h) = (pt(rect.width), pt(rect.height));
    let r = pt(radius_mm).min(w / 2.0).min(h / 2.0);

    if r <= 0.0 {
        content.rect(x, y, w, h);
    } else {
        let k = r * KAPPA;
        content.move_to(x + r, y);
        content.line_to(x + w - r, y);
        content.cubic_to(x + w - r + k, y, x + w, y + r - k, x + w, y + r);
        content.line_to(x + w, y + h - r);
        content.cubic_to(x + w, y + h - r + k, x + w - r + k, y + h, x + w - r, y + h);
        content.line_to(x + r, y + h);
        content.cubic_to(x + r - k, y + h, x, y + h - r + k, x, y + h - r);
        content.line_to(x, y + r);
        content.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
        content.close_path();
    }
    content.fill_nonzero();
}

fn draw_text(content: &mut Content, space: &PageSpace, text: &TextOp) {
    if text.text.is_empty() {
        return;
    }
    set_fill(content, text.color);
    let encoded = encode_win_ansi(&text.text);
    content.begin_text();
    content.set_font(Name(text.face.resource_name().as_bytes()), text.size_pt);
    content.next_line(pt(text.x), space.y(text.baseline));
    content.show(Str(&encoded));
    content.end_text();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CertificateBuilder, CertificateRecord};

    fn inflate_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let mut rest = pdf;
        while let Some(start) = find(rest, b"stream\n") {
            let body = &rest[start + b"stream\n".len()..];
            let Some(end) = find(body, b"\nendstream") else {
                break;
            };
            if let Ok(bytes) = miniz_oxide::inflate::decompress_to_vec_zlib(&body[..end]) {
                out.push(bytes);
            }
            rest = &body[end + b"\nendstream".len()..];
        }
        out
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn test_header_and_trailer() {
        let document = CertificateBuilder::without_assets().build(&CertificateRecord::new("A", "B"));
        let bytes = render_pdf(&document);
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(find(&bytes, b"%%EOF").is_some());
        assert!(find(&bytes, b"/Helvetica-Bold").is_some());
        assert!(find(&bytes, b"/WinAnsiEncoding").is_some());
        assert!(find(&bytes, b"/CreationDate").is_none());
    }

    #[test]
    fn test_content_stream_carries_encoded_text() {
        let document = CertificateBuilder::without_assets()
            .build(&CertificateRecord::new("PF010-2025-001234", "15 de enero de 2027"));
        let bytes = render_pdf(&document);
        let streams = inflate_streams(&bytes);

        let page = streams
            .iter()
            .find(|s| find(s, b"BT").is_some())
            .expect("page content stream");
        assert!(find(page, b"(PF010-2025-001234) Tj").is_some());
        assert!(find(page, b"(15 de enero de 2027) Tj").is_some());
        // Non-ASCII strings are written in hex; "Número" in WinAnsi.
        let lower = String::from_utf8_lossy(page).to_ascii_lowercase();
        assert!(lower.contains("4efa6d65726f"));
    }

    #[test]
    fn test_rounded_rect_uses_curves() {
        let mut content = Content::new();
        let space = PageSpace { height_pt: 792.0 };
        fill_rect(
            &mut content,
            &space,
            &RectMm::new(20.0, 20.0, 100.0, 15.0),
            Rgb(240, 240, 240),
            3.0,
        );
        let raw = content.finish();
        let ops = String::from_utf8_lossy(raw.as_slice()).to_string();
        assert_eq!(ops.matches(" c\n").count(), 4);
        assert!(ops.ends_with("f\n") || ops.ends_with('f'));
    }
}
