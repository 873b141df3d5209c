//! Window decoration, painted into the window's own surface: a title bar
//! with close/maximize/minimize buttons, and a frame around the client area.

use unios_abi::window::{BORDER_WIDTH, DecorButton, TITLE_BAR_HEIGHT, title_text_area};
use unios_abi::{Color32, Rect};

use crate::blit::fill_rect;
use crate::surface::Surface;
use crate::text::{GlyphSource, draw_text_fitted};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecorStyle {
    pub title_active: Color32,
    pub title_inactive: Color32,
    pub title_text: Color32,
    pub border: Color32,
    pub button: Color32,
    pub close_button: Color32,
    pub button_glyph: Color32,
}

impl DecorStyle {
    pub const DEFAULT: Self = Self {
        title_active: Color32(0xFF33_3333),
        title_inactive: Color32(0xFF55_5555),
        title_text: Color32::WHITE,
        border: Color32(0xFF66_6666),
        button: Color32(0xFF4A_4A4A),
        close_button: Color32(0xFFC0_392B),
        button_glyph: Color32::WHITE,
    };
}

impl Default for DecorStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Client area of a `width` x `height` decorated window, window-local.
pub fn client_area(width: i32, height: i32) -> Rect {
    Rect::new(
        BORDER_WIDTH,
        TITLE_BAR_HEIGHT,
        width - 2 * BORDER_WIDTH,
        height - TITLE_BAR_HEIGHT - BORDER_WIDTH,
    )
}

/// Fill the surface with `bg` and paint the full decoration over it.
pub fn paint_window<B, F>(
    surface: &mut Surface<B>,
    style: &DecorStyle,
    title: &str,
    bg: Color32,
    focused: bool,
    font: Option<&F>,
) where
    B: AsRef<[u32]> + AsMut<[u32]>,
    F: GlyphSource + ?Sized,
{
    surface.clear(bg);
    paint_frame(surface, style, title, focused, font);
}

/// Repaint title bar, buttons and borders, leaving the client area alone.
pub fn paint_frame<B, F>(
    surface: &mut Surface<B>,
    style: &DecorStyle,
    title: &str,
    focused: bool,
    font: Option<&F>,
) where
    B: AsRef<[u32]> + AsMut<[u32]>,
    F: GlyphSource + ?Sized,
{
    let w = surface.width() as i32;
    let h = surface.height() as i32;

    let bar = if focused {
        style.title_active
    } else {
        style.title_inactive
    };
    fill_rect(surface, Rect::new(0, 0, w, TITLE_BAR_HEIGHT), bar);

    let body = h - TITLE_BAR_HEIGHT;
    if body > 0 {
        fill_rect(surface, Rect::new(0, TITLE_BAR_HEIGHT, BORDER_WIDTH, body), style.border);
        fill_rect(
            surface,
            Rect::new(w - BORDER_WIDTH, TITLE_BAR_HEIGHT, BORDER_WIDTH, body),
            style.border,
        );
        fill_rect(surface, Rect::new(0, h - BORDER_WIDTH, w, BORDER_WIDTH), style.border);
    }

    for button in DecorButton::ALL {
        paint_button(surface, style, button, button.rect(w));
    }

    if let Some(font) = font {
        let area = title_text_area(w);
        if !area.is_empty() {
            draw_text_fitted(surface, area, title, style.title_text, font);
        }
    }
}

fn paint_button<B>(surface: &mut Surface<B>, style: &DecorStyle, button: DecorButton, r: Rect)
where
    B: AsRef<[u32]> + AsMut<[u32]>,
{
    let fill = match button {
        DecorButton::Close => style.close_button,
        _ => style.button,
    };
    fill_rect(surface, r, fill);

    let g = style.button_glyph;
    let inset = r.w / 4;
    let inner = Rect::new(r.x + inset, r.y + inset, r.w - 2 * inset, r.h - 2 * inset);
    match button {
        DecorButton::Close => {
            for i in 0..inner.w.min(inner.h) {
                surface.put_pixel(inner.x + i, inner.y + i, g);
                surface.put_pixel(inner.right() - 1 - i, inner.y + i, g);
            }
        }
        DecorButton::Maximize => {
            fill_rect(surface, Rect::new(inner.x, inner.y, inner.w, 2), g);
            fill_rect(surface, Rect::new(inner.x, inner.bottom() - 1, inner.w, 1), g);
            fill_rect(surface, Rect::new(inner.x, inner.y, 1, inner.h), g);
            fill_rect(surface, Rect::new(inner.right() - 1, inner.y, 1, inner.h), g);
        }
        DecorButton::Minimize => {
            fill_rect(surface, Rect::new(inner.x, inner.bottom() - 2, inner.w, 2), g);
        }
    }
}
