//! unios kernel/userland ABI types for the window system.
//!
//! Everything a client process and the window manager must agree on lives
//! here: geometry, colors, window flags and decoration layout, input records,
//! the fixed-size IPC message and the syscall numbers.
//!
//! All wire-visible types are `#[repr(C)]`.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod display;
pub mod draw;
pub mod input;
pub mod ipc;
pub mod rect;
pub mod syscall;
pub mod window;

pub use display::DisplayMode;
pub use draw::Color32;
pub use input::{KeyEvent, MouseButtons, PointerEvent};
pub use ipc::Message;
pub use rect::Rect;
pub use syscall::*;
pub use window::*;
