//! Greedy word wrap against Helvetica metrics.

use crate::metrics::FontFace;

/// Slack for float accumulation when comparing widths.
const WIDTH_EPSILON_MM: f32 = 1e-3;

/// Split `text` into lines no wider than `max_width_mm`.
///
/// Explicit newlines start a new line, runs of spaces collapse, and a word
/// wider than the line is split between characters. A line only exceeds the
/// width when it holds a single glyph that is itself too wide. Blank input
/// yields no lines.
#[must_use]
pub fn wrap_text(text: &str, face: FontFace, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let fits = |candidate: &str| face.text_width_mm(candidate, size_pt) <= max_width_mm + WIDTH_EPSILON_MM;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();

        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            if !current.is_empty() {
                let candidate = format!("{current} {word}");
                if fits(&candidate) {
                    current = candidate;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
            }

            if fits(word) {
                current.push_str(word);
            } else {
                let mut pieces = split_word(word, &fits);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        lines.push(current);
    }

    lines
}

/// Cut a word into maximal pieces that fit, one glyph minimum per piece.
fn split_word(word: &str, fits: &impl Fn(&str) -> bool) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if piece.chars().count() > 1 && !fits(&piece) {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
