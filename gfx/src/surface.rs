//! 32bpp pixel surfaces.
//!
//! A [`Surface`] is generic over its backing store, which makes ownership
//! part of the type: an [`OwnedSurface`] frees its pixels on drop, while
//! [`SurfaceView`] and [`SurfaceViewMut`] borrow memory owned elsewhere
//! (the hardware framebuffer, a userland mapping).

use alloc::boxed::Box;
use alloc::vec::Vec;

use unios_abi::{Color32, Rect};

use crate::error::{GfxError, GfxResult};

pub const BYTES_PER_PIXEL: usize = 4;

pub struct Surface<B> {
    width: u32,
    height: u32,
    /// Bytes per row; always a multiple of 4 and at least `width * 4`.
    pitch: usize,
    pixels: B,
}

pub type OwnedSurface = Surface<Box<[u32]>>;
pub type SurfaceView<'a> = Surface<&'a [u32]>;
pub type SurfaceViewMut<'a> = Surface<&'a mut [u32]>;

impl OwnedSurface {
    /// Allocate a zeroed surface. Fails instead of aborting when memory is
    /// short.
    pub fn new(width: u32, height: u32) -> GfxResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(GfxError::InvalidDimensions { width, height })?;
        let mut buf: Vec<u32> = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| GfxError::NoMemory {
            bytes: len.saturating_mul(BYTES_PER_PIXEL),
        })?;
        buf.resize(len, 0);
        Ok(Self {
            width,
            height,
            pitch: width as usize * BYTES_PER_PIXEL,
            pixels: buf.into_boxed_slice(),
        })
    }

    pub fn filled(width: u32, height: u32, color: Color32) -> GfxResult<Self> {
        let mut surface = Self::new(width, height)?;
        surface.pixels.fill(color.to_u32());
        Ok(surface)
    }
}

impl<B: AsRef<[u32]>> Surface<B> {
    /// Wrap a tightly packed buffer known to hold `width * height` pixels.
    pub(crate) fn packed(pixels: B, width: u32, height: u32) -> Self {
        debug_assert_eq!(pixels.as_ref().len(), width as usize * height as usize);
        Self {
            width,
            height,
            pitch: width as usize * BYTES_PER_PIXEL,
            pixels,
        }
    }

    /// Wrap an existing buffer. Returns `None` when the pitch is not a whole
    /// number of pixels, is narrower than a row, or the buffer is too short.
    pub fn from_parts(pixels: B, width: u32, height: u32, pitch: usize) -> Option<Self> {
        if pitch % BYTES_PER_PIXEL != 0 || pitch < width as usize * BYTES_PER_PIXEL {
            return None;
        }
        let needed = (pitch / BYTES_PER_PIXEL).checked_mul(height as usize)?;
        if pixels.as_ref().len() < needed {
            return None;
        }
        Some(Self {
            width,
            height,
            pitch,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    #[inline]
    pub fn bpp(&self) -> u8 {
        32
    }

    /// Bytes spanned by the pixel rows.
    #[inline]
    pub fn size(&self) -> usize {
        self.pitch * self.height as usize
    }

    /// Row stride in pixels.
    #[inline]
    pub fn stride(&self) -> usize {
        self.pitch / BYTES_PER_PIXEL
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        self.pixels.as_ref()
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color32> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        let idx = y as usize * self.stride() + x as usize;
        self.pixels().get(idx).copied().map(Color32)
    }

    /// `len` pixels of row `y` starting at column `x`. Callers pass a span
    /// already clipped to the surface.
    #[inline]
    pub(crate) fn span(&self, x: usize, y: usize, len: usize) -> &[u32] {
        let start = y * self.stride() + x;
        &self.pixels()[start..start + len]
    }

    pub fn view(&self) -> SurfaceView<'_> {
        Surface {
            width: self.width,
            height: self.height,
            pitch: self.pitch,
            pixels: self.pixels(),
        }
    }
}

impl<B: AsRef<[u32]> + AsMut<[u32]>> Surface<B> {
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        self.pixels.as_mut()
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color32) {
        if !self.bounds().contains(x, y) {
            return;
        }
        let idx = y as usize * self.stride() + x as usize;
        if let Some(px) = self.pixels_mut().get_mut(idx) {
            *px = color.to_u32();
        }
    }

    #[inline]
    pub(crate) fn span_mut(&mut self, x: usize, y: usize, len: usize) -> &mut [u32] {
        let start = y * self.stride() + x;
        &mut self.pixels_mut()[start..start + len]
    }

    pub fn view_mut(&mut self) -> SurfaceViewMut<'_> {
        Surface {
            width: self.width,
            height: self.height,
            pitch: self.pitch,
            pixels: self.pixels.as_mut(),
        }
    }

    pub fn clear(&mut self, color: Color32) {
        self.pixels_mut().fill(color.to_u32());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed_and_sized() {
        let s = OwnedSurface::new(7, 3).unwrap();
        assert_eq!(s.pitch(), 28);
        assert_eq!(s.size(), 7 * 3 * 4);
        assert_eq!(s.pixels().len(), 21);
        assert!(s.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_oversized_allocation_fails() {
        let err = OwnedSurface::new(u32::MAX, u32::MAX);
        assert!(err.is_err());
    }

    #[test]
    fn test_from_parts_validates_pitch() {
        let buf = [0u32; 40];
        assert!(SurfaceView::from_parts(&buf[..], 8, 5, 32).is_some());
        // pitch wider than a row is fine
        assert!(SurfaceView::from_parts(&buf[..], 6, 5, 32).is_some());
        assert!(SurfaceView::from_parts(&buf[..], 9, 5, 32).is_none());
        assert!(SurfaceView::from_parts(&buf[..], 8, 5, 30).is_none());
        assert!(SurfaceView::from_parts(&buf[..], 8, 6, 32).is_none());
    }

    #[test]
    fn test_pixel_access_out_of_bounds() {
        let mut s = OwnedSurface::filled(4, 4, Color32::WHITE).unwrap();
        s.put_pixel(-1, 0, Color32::BLACK);
        s.put_pixel(4, 0, Color32::BLACK);
        assert!(s.pixels().iter().all(|&p| p == Color32::WHITE.to_u32()));
        assert_eq!(s.pixel(4, 4), None);
        s.put_pixel(3, 3, Color32::BLACK);
        assert_eq!(s.pixel(3, 3), Some(Color32::BLACK));
    }
}
