//! Syscall numbers served by the window manager.
//!
//! Numbers are part of the userland ABI; never renumber, only append.

// =============================================================================
// Window syscalls
// =============================================================================

pub const SYSCALL_GET_ROOT_WINDOW: u64 = 40;
pub const SYSCALL_OPEN_WINDOW: u64 = 41;
pub const SYSCALL_CLOSE_WINDOW: u64 = 42;
pub const SYSCALL_REFRESH_WINDOW: u64 = 43;
pub const SYSCALL_REFRESH_WINDOW_MANAGER: u64 = 44;
pub const SYSCALL_SET_WINDOW_SURFACE_BUFFER: u64 = 45;
pub const SYSCALL_SET_ROOT_WINDOW_OWNER: u64 = 46;
pub const SYSCALL_GET_WINDOW_INFO: u64 = 47;
pub const SYSCALL_MOVE_WINDOW_ABS: u64 = 48;
pub const SYSCALL_TOGGLE_MAXIMIZE: u64 = 49;
pub const SYSCALL_TOGGLE_MINIMIZE: u64 = 50;

/// Returned in the result register when a window syscall fails.
pub const SYSCALL_WINDOW_ERROR: u64 = u64::MAX;
