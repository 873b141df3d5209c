//! Software cursor drawn over the composed scene.
//!
//! The backbuffer never keeps cursor pixels. The cursor lives on the
//! frontbuffer only, and the backbuffer is the clean source for erasing it.

use unios_abi::{DisplayMode, Rect};
use unios_gfx::cursor::{CURSOR_SIZE, cursor_sprite};
use unios_gfx::{OwnedSurface, blit, blit_alpha};

use crate::display::{Buffers, FramebufferProvider};
use crate::error::WmResult;

pub struct CursorOverlay {
    enabled: bool,
    x: i32,
    y: i32,
    /// Where the sprite currently sits on the frontbuffer.
    drawn: Option<(i32, i32)>,
    /// Backbuffer pixels under the sprite while it is stamped there.
    saved: OwnedSurface,
}

fn sprite_rect(x: i32, y: i32) -> Rect {
    Rect::new(x, y, CURSOR_SIZE as i32, CURSOR_SIZE as i32)
}

impl CursorOverlay {
    /// A cursor at the center of the screen.
    pub fn new(mode: DisplayMode, enabled: bool) -> WmResult<Self> {
        Ok(Self {
            enabled,
            x: mode.width as i32 / 2,
            y: mode.height as i32 / 2,
            drawn: None,
            saved: OwnedSurface::new(CURSOR_SIZE, CURSOR_SIZE)?,
        })
    }

    #[inline]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Move the hotspot, clamped to the screen.
    pub fn set_position(&mut self, x: i32, y: i32, mode: DisplayMode) {
        self.x = x.clamp(0, (mode.width as i32 - 1).max(0));
        self.y = y.clamp(0, (mode.height as i32 - 1).max(0));
    }

    /// The sprite is not on screen where it should be.
    #[inline]
    pub fn needs_render(&self) -> bool {
        self.enabled && self.drawn != Some((self.x, self.y))
    }

    /// Move the sprite on the frontbuffer if the pointer moved.
    pub fn render<D: FramebufferProvider + ?Sized>(&mut self, display: &mut D) {
        if !self.needs_render() {
            return;
        }
        let Buffers { mut front, back } = display.buffers();
        if let Some((px, py)) = self.drawn {
            blit(&mut front, px, py, &back, Some(sprite_rect(px, py)));
        }
        blit_alpha(&mut front, self.x, self.y, &cursor_sprite());
        self.drawn = Some((self.x, self.y));
    }

    /// Present `rects` with the cursor composited in.
    pub fn present<D: FramebufferProvider + ?Sized>(&mut self, display: &mut D, rects: &[Rect]) {
        if !self.enabled {
            display.present(rects);
            return;
        }
        let (x, y) = (self.x, self.y);
        {
            let Buffers { back, .. } = display.buffers();
            let mut back = back;
            blit(&mut self.saved, 0, 0, &back, Some(sprite_rect(x, y)));
            blit_alpha(&mut back, x, y, &cursor_sprite());
        }
        display.present(rects);
        {
            let Buffers { back, .. } = display.buffers();
            let mut back = back;
            blit(&mut back, x, y, &self.saved, None);
        }
        if self.drawn == Some((x, y)) {
            return;
        }
        // The sprite moved since it was last drawn and the presented region
        // may not cover either position.
        let Buffers { mut front, back } = display.buffers();
        if let Some((px, py)) = self.drawn {
            blit(&mut front, px, py, &back, Some(sprite_rect(px, py)));
        }
        blit_alpha(&mut front, x, y, &cursor_sprite());
        self.drawn = Some((x, y));
    }
}
