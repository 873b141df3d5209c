/// A 32-bit pixel value, `0xAARRGGBB`.
///
/// Surfaces are always 32bpp so a `Color32` is written to pixel memory as-is.
/// The alpha byte only matters to `blit_alpha`, which treats zero as a hole.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Color32(pub u32);

impl Color32 {
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Desktop fill behind every window.
    pub const DESKTOP: Self = Self(0xFF33_6699);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Zero alpha: skipped by alpha blits.
    #[inline]
    pub const fn is_clear(self) -> bool {
        self.alpha() == 0
    }

    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for Color32 {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}
