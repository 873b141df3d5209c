//! unios window manager: window tree, damage-driven compositor, pointer
//! interaction, software cursor and the window syscalls.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod compositor;
pub mod config;
pub mod cursor;
pub mod display;
pub mod error;
pub mod input;
pub mod interaction;
pub mod ipc;
pub mod manager;
pub mod service;
pub mod syscall;
pub mod tree;
pub mod window;


pub use config::WmConfig;
pub use cursor::CursorOverlay;
pub use display::{Buffers, FramebufferProvider, LinearFramebuffer, MemoryFramebuffer};
pub use error::{WmError, WmResult};
pub use input::InputMailbox;
pub use interaction::{EdgeMask, Gesture, HitZone, hit_test, resize_rect};
pub use ipc::{BusError, LocalBus, MessageBus};
pub use manager::WindowManager;
pub use service::{Clock, SharedWm, WmService};
pub use syscall::{SurfaceMapper, SyscallArgs, UserMemory};
pub use tree::{WindowId, WindowTree};
pub use window::{MinimizeRestore, UserMapping, Window, decode_title};
