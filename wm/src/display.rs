//! Framebuffer provider seam.
//!
//! The window manager draws into a RAM backbuffer and pushes finished
//! regions to the hardware-visible frontbuffer through `present`. Mode
//! setting and mapping the linear framebuffer happen before a provider is
//! handed over.

use unios_abi::{DisplayMode, Rect};
use unios_gfx::{OwnedSurface, Surface, SurfaceViewMut, blit};

use crate::error::{WmError, WmResult};

/// Both buffers, borrowed together.
pub struct Buffers<'a> {
    pub front: SurfaceViewMut<'a>,
    pub back: SurfaceViewMut<'a>,
}

pub trait FramebufferProvider {
    fn mode(&self) -> DisplayMode;

    fn buffers(&mut self) -> Buffers<'_>;

    /// Copy `rects` from back to front; the whole screen if `rects` is
    /// empty.
    fn present(&mut self, rects: &[Rect]) {
        let Buffers { mut front, back } = self.buffers();
        if rects.is_empty() {
            blit(&mut front, 0, 0, &back, None);
            return;
        }
        for r in rects {
            blit(&mut front, r.x, r.y, &back, Some(*r));
        }
    }
}

fn check_mode(mode: DisplayMode) -> WmResult<()> {
    if mode.width == 0 || mode.height == 0 || mode.bpp != 32 {
        return Err(WmError::NoDisplay);
    }
    Ok(())
}

/// A display whose frontbuffer is plain memory. Used for headless runs.
pub struct MemoryFramebuffer {
    mode: DisplayMode,
    front: OwnedSurface,
    back: OwnedSurface,
}

impl MemoryFramebuffer {
    pub fn new(width: u32, height: u32) -> WmResult<Self> {
        let mode = DisplayMode::new(width, height);
        check_mode(mode)?;
        Ok(Self {
            mode,
            front: OwnedSurface::new(width, height)?,
            back: OwnedSurface::new(width, height)?,
        })
    }

    /// What is on screen.
    pub fn front(&self) -> &OwnedSurface {
        &self.front
    }

    pub fn back(&self) -> &OwnedSurface {
        &self.back
    }
}

impl FramebufferProvider for MemoryFramebuffer {
    fn mode(&self) -> DisplayMode {
        self.mode
    }

    fn buffers(&mut self) -> Buffers<'_> {
        Buffers {
            front: self.front.view_mut(),
            back: self.back.view_mut(),
        }
    }
}

/// A mapped linear framebuffer plus a RAM backbuffer of the same size.
pub struct LinearFramebuffer<'fb> {
    mode: DisplayMode,
    front: SurfaceViewMut<'fb>,
    back: OwnedSurface,
}

impl<'fb> LinearFramebuffer<'fb> {
    /// `pixels` is the mapped framebuffer, `pitch` its scanline length in
    /// bytes as reported by the video driver.
    pub fn new(pixels: &'fb mut [u32], width: u32, height: u32, pitch: u32) -> WmResult<Self> {
        let mode = DisplayMode {
            width,
            height,
            pitch,
            bpp: 32,
        };
        check_mode(mode)?;
        let front =
            Surface::from_parts(pixels, width, height, pitch as usize).ok_or(WmError::NoDisplay)?;
        Ok(Self {
            mode,
            front,
            back: OwnedSurface::new(width, height)?,
        })
    }
}

impl FramebufferProvider for LinearFramebuffer<'_> {
    fn mode(&self) -> DisplayMode {
        self.mode
    }

    fn buffers(&mut self) -> Buffers<'_> {
        Buffers {
            front: self.front.view_mut(),
            back: self.back.view_mut(),
        }
    }
}
