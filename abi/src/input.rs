//! Input records delivered by the pointer and keyboard drivers.
//!
//! Both records pack into a `u64` so an interrupt handler can hand them to
//! the window manager through a single atomic word.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MouseButtons: u8 {
        const LEFT   = 1 << 0;
        const RIGHT  = 1 << 1;
        const MIDDLE = 1 << 2;
    }
}

/// Absolute pointer position plus the current button mask.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
    pub buttons: MouseButtons,
}

impl PointerEvent {
    #[inline]
    pub const fn new(x: i32, y: i32, buttons: MouseButtons) -> Self {
        Self { x, y, buttons }
    }

    /// Coordinates are clamped to 16 bits each.
    pub fn pack(&self) -> u64 {
        let x = self.x.clamp(i16::MIN as i32, i16::MAX as i32) as i16 as u16 as u64;
        let y = self.y.clamp(i16::MIN as i32, i16::MAX as i32) as i16 as u16 as u64;
        x | (y << 16) | ((self.buttons.bits() as u64) << 32)
    }

    pub fn unpack(raw: u64) -> Self {
        Self {
            x: raw as u16 as i16 as i32,
            y: (raw >> 16) as u16 as i16 as i32,
            buttons: MouseButtons::from_bits_truncate((raw >> 32) as u8),
        }
    }

    #[inline]
    pub fn left(&self) -> bool {
        self.buttons.contains(MouseButtons::LEFT)
    }
}

/// A single key code from the keyboard driver.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: u32,
}

impl KeyEvent {
    #[inline]
    pub const fn pack(&self) -> u64 {
        self.code as u64
    }

    #[inline]
    pub const fn unpack(raw: u64) -> Self {
        Self { code: raw as u32 }
    }
}
