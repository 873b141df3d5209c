use crate::rect::Rect;

/// The active video mode as reported by the framebuffer provider.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    /// Bytes per scanline.
    pub pitch: u32,
    pub bpp: u8,
}

impl DisplayMode {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pitch: width * 4,
            bpp: 32,
        }
    }

    /// The whole screen in pixel coordinates.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::sized(self.width as i32, self.height as i32)
    }
}
