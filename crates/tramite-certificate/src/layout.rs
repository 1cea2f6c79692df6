//! Page geometry and the flowing text cursor.

use crate::document::{DrawOp, Page, RectMm, Rgb, TextOp};
use crate::metrics::FontFace;
use crate::wrap::wrap_text;

pub const PAGE_WIDTH_MM: f32 = 215.9;
pub const PAGE_HEIGHT_MM: f32 = 279.4;
pub const MARGIN_LEFT_MM: f32 = 20.0;
pub const MARGIN_RIGHT_MM: f32 = 20.0;
pub const MARGIN_TOP_MM: f32 = 20.0;
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - MARGIN_LEFT_MM - MARGIN_RIGHT_MM;
/// Lowest baseline body text may use; also the signature slot.
pub const CONTENT_FLOOR_MM: f32 = PAGE_HEIGHT_MM - 20.0;
pub const LINE_HEIGHT_MM: f32 = 5.0;

pub const BAND_WIDTH_MM: f32 = 15.0;
pub const LOGO_HEIGHT_MM: f32 = 20.0;
pub const TITLE_BASELINE_MM: f32 = MARGIN_TOP_MM + 35.0;
pub const BODY_START_MM: f32 = MARGIN_TOP_MM + 50.0;
pub const BOX_HEIGHT_MM: f32 = 15.0;
pub const BOX_RADIUS_MM: f32 = 3.0;

pub const BAND: Rgb = Rgb(208, 247, 248);
pub const DARK_GRAY: Rgb = Rgb(60, 60, 60);
pub const BLUE: Rgb = Rgb(0, 102, 204);
pub const RED: Rgb = Rgb(220, 53, 69);
pub const LIGHT_GRAY: Rgb = Rgb(240, 240, 240);

/// Top-to-bottom flow over as many pages as the content needs.
///
/// The cursor holds the baseline of the next line. It only moves down on a
/// page; crossing [`CONTENT_FLOOR_MM`] opens a new page with the cursor back
/// at the top margin.
#[derive(Debug)]
pub(crate) struct Flow {
    pages: Vec<Vec<DrawOp>>,
    cursor: f32,
}

impl Flow {
    pub(crate) fn new() -> Self {
        let mut flow = Self {
            pages: Vec::new(),
            cursor: BODY_START_MM,
        };
        flow.open_page();
        flow
    }

    fn open_page(&mut self) {
        self.pages.push(vec![DrawOp::FillRect {
            rect: RectMm::new(0.0, 0.0, BAND_WIDTH_MM, PAGE_HEIGHT_MM),
            color: BAND,
            corner_radius: 0.0,
        }]);
    }

    fn break_page(&mut self) {
        self.open_page();
        self.cursor = MARGIN_TOP_MM;
    }

    pub(crate) fn cursor(&self) -> f32 {
        self.cursor
    }

    pub(crate) fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    pub(crate) fn advance(&mut self, by: f32) {
        self.cursor += by;
    }

    /// Start a new page unless `height` fits above the floor.
    pub(crate) fn ensure_room(&mut self, height: f32) {
        if self.cursor + height > CONTENT_FLOOR_MM {
            self.break_page();
        }
    }

    /// Wrapped paragraph at the left margin, then `spacing` below its last line.
    pub(crate) fn paragraph(&mut self, text: &str, face: FontFace, size_pt: f32, spacing: f32) {
        let lines = wrap_text(text, face, size_pt, CONTENT_WIDTH_MM);
        if lines.is_empty() {
            return;
        }
        for line in lines {
            if self.cursor > CONTENT_FLOOR_MM {
                self.break_page();
            }
            self.push(text_op(MARGIN_LEFT_MM, self.cursor, line, face, size_pt, DARK_GRAY));
            self.cursor += LINE_HEIGHT_MM;
        }
        self.cursor += spacing;
    }

    /// Single-line heading kept on the same page as the first line after it.
    pub(crate) fn heading(&mut self, text: &str, size_pt: f32, advance: f32) {
        if self.cursor + advance > CONTENT_FLOOR_MM {
            self.break_page();
        }
        self.push(text_op(
            MARGIN_LEFT_MM,
            self.cursor,
            text.to_string(),
            FontFace::Bold,
            size_pt,
            DARK_GRAY,
        ));
        self.cursor += advance;
    }

    /// Place `op` on the bottom slot of the last page, adding a page when the
    /// flow has already passed the slot.
    pub(crate) fn push_at_floor(&mut self, mut op: TextOp) {
        if self.cursor > CONTENT_FLOOR_MM {
            self.break_page();
        }
        op.baseline = CONTENT_FLOOR_MM;
        self.push(DrawOp::Text(op));
    }

    pub(crate) fn into_pages(self) -> Vec<Page> {
        self.pages
            .into_iter()
            .map(|ops| Page {
                width_mm: PAGE_WIDTH_MM,
                height_mm: PAGE_HEIGHT_MM,
                ops,
            })
            .collect()
    }
}

pub(crate) fn text_op(
    x: f32,
    baseline: f32,
    text: String,
    face: FontFace,
    size_pt: f32,
    color: Rgb,
) -> DrawOp {
    DrawOp::Text(TextOp {
        x,
        baseline,
        text,
        face,
        size_pt,
        color,
    })
}

/// Text op horizontally centred on `center_x`.
pub(crate) fn centered_text(
    center_x: f32,
    baseline: f32,
    text: &str,
    face: FontFace,
    size_pt: f32,
    color: Rgb,
) -> DrawOp {
    let width = face.text_width_mm(text, size_pt);
    text_op(center_x - width / 2.0, baseline, text.to_string(), face, size_pt, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baselines(flow: Flow) -> Vec<Vec<f32>> {
        flow.into_pages()
            .iter()
            .map(|page| page.text_ops().map(|op| op.baseline).collect())
            .collect()
    }

    #[test]
    fn test_new_flow_has_band_page() {
        let pages = Flow::new().into_pages();
        assert_eq!(pages.len(), 1);
        assert!(matches!(
            pages[0].ops[0],
            DrawOp::FillRect { color: BAND, .. }
        ));
    }

    #[test]
    fn test_paragraph_advances_by_lines_plus_spacing() {
        let mut flow = Flow::new();
        flow.paragraph("uno\ndos", FontFace::Regular, 10.0, 3.0);
        assert!((flow.cursor() - (BODY_START_MM + 2.0 * LINE_HEIGHT_MM + 3.0)).abs() < 1e-4);
    }

    #[test]
    fn test_lines_past_floor_move_to_next_page() {
        let mut flow = Flow::new();
        flow.advance(CONTENT_FLOOR_MM - BODY_START_MM - 2.0);
        flow.paragraph("a\nb\nc", FontFace::Regular, 10.0, 0.0);

        let pages = baselines(flow);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 1);
        assert!((pages[0][0] - (CONTENT_FLOOR_MM - 2.0)).abs() < 1e-3);
        assert_eq!(pages[1], vec![MARGIN_TOP_MM, MARGIN_TOP_MM + LINE_HEIGHT_MM]);
    }

    #[test]
    fn test_floor_slot_uses_last_page_when_room() {
        let mut flow = Flow::new();
        flow.push_at_floor(TextOp {
            x: MARGIN_LEFT_MM,
            baseline: 0.0,
            text: "Firma".into(),
            face: FontFace::Regular,
            size_pt: 10.0,
            color: DARK_GRAY,
        });
        let pages = baselines(flow);
        assert_eq!(pages, vec![vec![CONTENT_FLOOR_MM]]);
    }

    #[test]
    fn test_centered_text_is_symmetric() {
        let DrawOp::Text(op) = centered_text(100.0, 50.0, "ABC", FontFace::Bold, 14.0, BLUE) else {
            panic!("expected text op");
        };
        let bounds = op.bounds();
        assert!(((bounds.x + bounds.right()) / 2.0 - 100.0).abs() < 1e-4);
    }
}
