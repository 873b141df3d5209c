//! Pixel plumbing for the window system: surfaces, clipped blits, damage
//! tracking, title bar decoration, text and the pointer sprite.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod blit;
pub mod cursor;
pub mod damage;
pub mod decor;
pub mod error;
pub mod surface;
pub mod text;

pub use blit::{blit, blit_alpha, blit_clipped, fill_rect, fill_rect_clipped};
pub use damage::DamageTracker;
pub use error::{GfxError, GfxResult};
pub use surface::{OwnedSurface, Surface, SurfaceView, SurfaceViewMut};
pub use text::{GlyphSource, RawFont};
