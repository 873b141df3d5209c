//! Bitmap text over an external glyph source.
//!
//! Glyphs are 16 rows of 2 bytes, most significant bit leftmost. ASCII
//! characters advance 8 pixels and only use the left half of the cell; all
//! other code points are full-width.

use unios_abi::{Color32, Rect};

use crate::surface::Surface;

pub const GLYPH_HEIGHT: i32 = 16;
pub const GLYPH_BYTES: usize = 32;
pub const ASCII_ADVANCE: i32 = 8;
pub const WIDE_ADVANCE: i32 = 16;

const ELLIPSIS: &str = "...";

pub type Glyph = [u8; GLYPH_BYTES];

pub trait GlyphSource {
    fn glyph(&self, ch: char) -> Option<&Glyph>;

    fn advance(&self, ch: char) -> i32 {
        if ch.is_ascii() {
            ASCII_ADVANCE
        } else {
            WIDE_ADVANCE
        }
    }
}

/// A flat font blob: glyph for code point `c` at byte `c * 32`.
#[derive(Clone, Copy)]
pub struct RawFont<'a> {
    data: &'a [u8],
}

impl<'a> RawFont<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl GlyphSource for RawFont<'_> {
    fn glyph(&self, ch: char) -> Option<&Glyph> {
        let offset = (ch as usize).checked_mul(GLYPH_BYTES)?;
        let end = offset.checked_add(GLYPH_BYTES)?;
        self.data.get(offset..end)?.try_into().ok()
    }
}

pub fn text_width<F: GlyphSource + ?Sized>(font: &F, text: &str) -> i32 {
    text.chars().map(|ch| font.advance(ch)).sum()
}

/// Draw one character with its top-left at `(x, y)`, touching only pixels
/// inside `clip`. Characters missing from the font render as `?`.
/// Returns the advance.
pub fn draw_char<B, F>(
    dst: &mut Surface<B>,
    x: i32,
    y: i32,
    ch: char,
    color: Color32,
    font: &F,
    clip: Rect,
) -> i32
where
    B: AsRef<[u32]> + AsMut<[u32]>,
    F: GlyphSource + ?Sized,
{
    let advance = font.advance(ch);
    let Some(glyph) = font.glyph(ch).or_else(|| font.glyph('?')) else {
        return advance;
    };
    let cols = advance.min(WIDE_ADVANCE);
    for (row, bits) in glyph.chunks_exact(2).enumerate() {
        let bits = u16::from_be_bytes([bits[0], bits[1]]);
        if bits == 0 {
            continue;
        }
        let py = y + row as i32;
        for col in 0..cols {
            let px = x + col;
            if bits & (0x8000 >> col) != 0 && clip.contains(px, py) {
                dst.put_pixel(px, py, color);
            }
        }
    }
    advance
}

/// Draw `text` starting at `(x, y)`. Returns the pen position after the
/// last character.
pub fn draw_text<B, F>(
    dst: &mut Surface<B>,
    x: i32,
    y: i32,
    text: &str,
    color: Color32,
    font: &F,
    clip: Rect,
) -> i32
where
    B: AsRef<[u32]> + AsMut<[u32]>,
    F: GlyphSource + ?Sized,
{
    let mut pen = x;
    for ch in text.chars() {
        if pen >= clip.right() {
            break;
        }
        pen += draw_char(dst, pen, y, ch, color, font, clip);
    }
    pen
}

/// A prefix of some text that fits a pixel budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fitted<'s> {
    pub text: &'s str,
    /// The text was cut and should be followed by an ellipsis.
    pub truncated: bool,
}

/// Cut `text` so that it, plus an ellipsis if anything was cut, is at most
/// `max_width` pixels wide.
pub fn fit_text<'s, F: GlyphSource + ?Sized>(font: &F, text: &'s str, max_width: i32) -> Fitted<'s> {
    if text_width(font, text) <= max_width {
        return Fitted {
            text,
            truncated: false,
        };
    }
    let budget = max_width - text_width(font, ELLIPSIS);
    if budget < 0 {
        return Fitted {
            text: "",
            truncated: false,
        };
    }
    let mut used = 0;
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        let adv = font.advance(ch);
        if used + adv > budget {
            break;
        }
        used += adv;
        end = idx + ch.len_utf8();
    }
    Fitted {
        text: &text[..end],
        truncated: true,
    }
}

/// Draw `text` vertically centered in `area`, truncated with an ellipsis
/// when it does not fit the width.
pub fn draw_text_fitted<B, F>(dst: &mut Surface<B>, area: Rect, text: &str, color: Color32, font: &F)
where
    B: AsRef<[u32]> + AsMut<[u32]>,
    F: GlyphSource + ?Sized,
{
    let fitted = fit_text(font, text, area.w);
    let y = area.y + (area.h - GLYPH_HEIGHT) / 2;
    let pen = draw_text(dst, area.x, y, fitted.text, color, font, area);
    if fitted.truncated {
        draw_text(dst, pen, y, ELLIPSIS, color, font, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::OwnedSurface;

    /// Every glyph is a solid block; 'x' has no glyph.
    struct BlockFont(Glyph);

    impl GlyphSource for BlockFont {
        fn glyph(&self, ch: char) -> Option<&Glyph> {
            if ch == 'x' { None } else { Some(&self.0) }
        }
    }

    fn block() -> BlockFont {
        BlockFont([0xFF; GLYPH_BYTES])
    }

    #[test]
    fn test_raw_font_indexing() {
        let mut blob = [0u8; GLYPH_BYTES * 3];
        blob[GLYPH_BYTES * 2] = 0xAB;
        let font = RawFont::new(&blob);
        assert_eq!(font.glyph('\u{2}').map(|g| g[0]), Some(0xAB));
        assert!(font.glyph('\u{3}').is_none());
        assert!(font.glyph('\u{10FFFF}').is_none());
    }

    #[test]
    fn test_widths() {
        let font = block();
        assert_eq!(text_width(&font, "abc"), 24);
        assert_eq!(text_width(&font, "a\u{4e2d}"), 24);
    }

    #[test]
    fn test_ascii_glyph_uses_left_half() {
        let font = block();
        let mut s = OwnedSurface::new(32, 16).unwrap();
        let clip = s.bounds();
        let adv = draw_char(&mut s, 0, 0, 'a', Color32::WHITE, &font, clip);
        assert_eq!(adv, 8);
        assert_eq!(s.pixel(7, 15), Some(Color32::WHITE));
        assert_eq!(s.pixel(8, 0), Some(Color32(0)));
    }

    #[test]
    fn test_missing_glyph_falls_back() {
        let font = block();
        let mut s = OwnedSurface::new(8, 16).unwrap();
        let clip = s.bounds();
        draw_char(&mut s, 0, 0, 'x', Color32::WHITE, &font, clip);
        assert_eq!(s.pixel(0, 0), Some(Color32::WHITE));
    }

    #[test]
    fn test_draw_respects_clip() {
        let font = block();
        let mut s = OwnedSurface::new(32, 16).unwrap();
        draw_text(&mut s, 0, 0, "abcd", Color32::WHITE, &font, Rect::new(0, 0, 12, 16));
        assert_eq!(s.pixel(11, 0), Some(Color32::WHITE));
        assert_eq!(s.pixel(12, 0), Some(Color32(0)));
    }

    #[test]
    fn test_fit_text() {
        let font = block();
        let fits = fit_text(&font, "hello", 40);
        assert_eq!(fits, Fitted { text: "hello", truncated: false });

        // 48px: ellipsis takes 24, three characters remain.
        let cut = fit_text(&font, "hello world", 48);
        assert_eq!(cut, Fitted { text: "hel", truncated: true });
        assert!(text_width(&font, cut.text) + text_width(&font, "...") <= 48);

        let none = fit_text(&font, "hello world", 10);
        assert_eq!(none.text, "");
        assert!(!none.truncated);
    }

    #[test]
    fn test_fit_text_never_splits_code_points() {
        let font = block();
        let cut = fit_text(&font, "\u{4e2d}\u{6587}\u{6807}\u{9898}", 50);
        assert_eq!(cut.text, "\u{4e2d}");
        assert!(cut.truncated);
    }
}
