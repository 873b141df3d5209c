//! Window syscalls.
//!
//! Every handle coming from userland goes through the live-window table;
//! a stale or forged handle fails closed with `false`, `-1` or a null
//! pointer and is never dereferenced.

use alloc::string::String;

use unios_abi::ipc::Pid;
use unios_abi::syscall::*;
use unios_abi::window::{INVALID_WINDOW_HANDLE, TITLE_MAX, WindowHandle};
use unios_abi::{Color32, WindowInfo};
use unios_lib::klog_debug;

use crate::display::FramebufferProvider;
use crate::error::{WmError, WmResult};
use crate::manager::WindowManager;
use crate::tree::WindowId;
use crate::window::{UserMapping, decode_title};

/// Raw syscall arguments, in register order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyscallArgs {
    pub arg0: u64,
    pub arg1: u64,
    pub arg2: u64,
    pub arg3: u64,
    pub arg4: u64,
    pub arg5: u64,
}

impl SyscallArgs {
    #[inline]
    pub fn arg0_i32(&self) -> i32 {
        self.arg0 as i32
    }
    #[inline]
    pub fn arg1_i32(&self) -> i32 {
        self.arg1 as i32
    }
    #[inline]
    pub fn arg2_i32(&self) -> i32 {
        self.arg2 as i32
    }
    #[inline]
    pub fn arg3_i32(&self) -> i32 {
        self.arg3 as i32
    }
    #[inline]
    pub fn arg4_u32(&self) -> u32 {
        self.arg4 as u32
    }
}

/// Title bytes at `addr` in `pid`, read up to the first NUL. A null
/// pointer is an empty title.
fn read_title<U: UserMemory + ?Sized>(user: &mut U, pid: Pid, addr: u64) -> Option<String> {
    if addr == 0 {
        return Some(String::new());
    }
    let mut buf = [0u8; TITLE_MAX + 1];
    if !user.copy_from_user(pid, addr, &mut buf) {
        return None;
    }
    Some(decode_title(&buf))
}

/// Maps a window surface into a process. Page table work lives with the
/// memory manager.
pub trait SurfaceMapper {
    /// Map `pixels` into `pid` and return the user address of the first
    /// pixel.
    fn map_surface(&mut self, pid: Pid, pixels: &mut [u32]) -> Option<u64>;

    /// Remove a mapping made by [`map_surface`](Self::map_surface). `len` is
    /// the mapped size in bytes.
    fn unmap_surface(&mut self, pid: Pid, addr: u64, len: usize);
}

/// Copies between the caller's address space and the kernel.
pub trait UserMemory {
    fn copy_from_user(&mut self, pid: Pid, addr: u64, buf: &mut [u8]) -> bool;

    fn copy_to_user(&mut self, pid: Pid, addr: u64, bytes: &[u8]) -> bool;
}

fn info_bytes(info: WindowInfo) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (chunk, v) in out.chunks_exact_mut(4).zip([info.x, info.y, info.w, info.h]) {
        chunk.copy_from_slice(&v.to_ne_bytes());
    }
    out
}

#[inline]
fn ret_bool(ok: bool) -> u64 {
    ok as u64
}

#[inline]
fn ret_handle(handle: WindowHandle) -> u64 {
    if handle < 0 {
        SYSCALL_WINDOW_ERROR
    } else {
        handle as u64
    }
}

impl<D: FramebufferProvider> WindowManager<D> {
    fn checked(&self, handle: WindowHandle) -> WmResult<WindowId> {
        self.lookup(handle).ok_or(WmError::InvalidHandle)
    }

    fn report<T>(&self, call: &str, handle: WindowHandle, result: WmResult<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(err) => {
                klog_debug!("wm: {}({}) rejected: {}", call, handle, err);
                None
            }
        }
    }

    /// Unmap every surface its window has let go of, then free it.
    pub fn release_retired<M: SurfaceMapper + ?Sized>(&mut self, mapper: &mut M) {
        for retired in self.retired.drain(..) {
            let UserMapping { pid, addr } = retired.mapping;
            mapper.unmap_surface(pid, addr, retired.surface.size());
            klog_debug!("wm: unmapped surface at {:#x} from process {}", addr, pid);
        }
    }

    pub fn sys_get_root_window(&self) -> WindowHandle {
        self.root().to_handle()
    }

    /// Open a window owned by `caller`. A zero `bg` means white.
    #[allow(clippy::too_many_arguments)]
    pub fn sys_open_window(
        &mut self,
        caller: Pid,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        bg: u32,
        title: &str,
    ) -> WindowHandle {
        let bg = if bg == 0 { Color32::WHITE } else { Color32(bg) };
        let result = self.create(x, y, w, h, title, bg).and_then(|id| {
            self.set_owner(id, caller)?;
            Ok(id)
        });
        self.report("open_window", INVALID_WINDOW_HANDLE, result)
            .map_or(INVALID_WINDOW_HANDLE, WindowId::to_handle)
    }

    pub fn sys_close_window(&mut self, handle: WindowHandle) -> bool {
        let result = self.checked(handle).and_then(|id| self.destroy(id));
        self.report("close_window", handle, result).is_some()
    }

    pub fn sys_refresh_window(&mut self, handle: WindowHandle) -> bool {
        let result = self.checked(handle).and_then(|id| self.refresh(id));
        self.report("refresh_window", handle, result).is_some()
    }

    pub fn sys_refresh_window_manager(&mut self) -> bool {
        self.refresh_all();
        true
    }

    /// Map the window's pixels into `caller`, once; later calls return the
    /// same address until a resize retires the mapping.
    pub fn sys_set_window_surface_buffer<M: SurfaceMapper + ?Sized>(
        &mut self,
        caller: Pid,
        handle: WindowHandle,
        mapper: &mut M,
    ) -> Option<u64> {
        self.release_retired(mapper);
        let id = self.report("set_window_surface_buffer", handle, self.checked(handle))?;
        let window = self.tree.get_mut(id)?;
        if window.owner != caller {
            klog_debug!(
                "wm: process {} cannot map window {} owned by {}",
                caller,
                handle,
                window.owner
            );
            return None;
        }
        if let Some(mapping) = window.user_mapping
            && mapping.pid == caller
        {
            return Some(mapping.addr);
        }
        if let Some(stale) = window.user_mapping.take() {
            mapper.unmap_surface(stale.pid, stale.addr, window.surface.size());
        }
        let addr = mapper.map_surface(caller, window.surface.pixels_mut())?;
        window.user_mapping = Some(UserMapping { pid: caller, addr });
        Some(addr)
    }

    pub fn sys_set_root_window_owner(&mut self, pid: Pid) -> bool {
        let root = self.root();
        let result = self.set_owner(root, pid);
        self.report("set_root_window_owner", root.to_handle(), result)
            .is_some()
    }

    /// Geometry of a window, or all `-1` for a bad handle.
    pub fn sys_get_window_info(&self, handle: WindowHandle) -> WindowInfo {
        self.lookup(handle)
            .and_then(|id| self.info(id))
            .unwrap_or(WindowInfo::INVALID)
    }

    pub fn sys_move_window_abs(&mut self, handle: WindowHandle, x: i32, y: i32) -> bool {
        let result = self.checked(handle).and_then(|id| self.move_to(id, x, y));
        self.report("move_window_abs", handle, result).is_some()
    }

    pub fn sys_toggle_maximize(&mut self, handle: WindowHandle) -> bool {
        let result = self.checked(handle).and_then(|id| self.toggle_maximize(id));
        self.report("toggle_maximize", handle, result).is_some()
    }

    pub fn sys_toggle_minimize(&mut self, handle: WindowHandle) -> bool {
        let result = self.checked(handle).and_then(|id| self.toggle_minimize(id));
        self.report("toggle_minimize", handle, result).is_some()
    }

    /// Decode and run window syscall `nr` on behalf of `caller`.
    ///
    /// Handle results come back as the handle or [`SYSCALL_WINDOW_ERROR`],
    /// booleans as 1 or 0, and the surface pointer as the address or 0.
    /// Surfaces retired by the call are unmapped before returning.
    pub fn dispatch<U>(&mut self, nr: u64, caller: Pid, args: SyscallArgs, user: &mut U) -> u64
    where
        U: SurfaceMapper + UserMemory + ?Sized,
    {
        let ret = self.dispatch_call(nr, caller, args, user);
        self.release_retired(user);
        ret
    }

    fn dispatch_call<U>(&mut self, nr: u64, caller: Pid, args: SyscallArgs, user: &mut U) -> u64
    where
        U: SurfaceMapper + UserMemory + ?Sized,
    {
        let handle = args.arg0_i32();
        match nr {
            SYSCALL_GET_ROOT_WINDOW => ret_handle(self.sys_get_root_window()),
            SYSCALL_OPEN_WINDOW => {
                let Some(title) = read_title(user, caller, args.arg5) else {
                    klog_debug!("wm: open_window: bad title pointer {:#x}", args.arg5);
                    return SYSCALL_WINDOW_ERROR;
                };
                ret_handle(self.sys_open_window(
                    caller,
                    args.arg0_i32(),
                    args.arg1_i32(),
                    args.arg2_i32(),
                    args.arg3_i32(),
                    args.arg4_u32(),
                    &title,
                ))
            }
            SYSCALL_CLOSE_WINDOW => ret_bool(self.sys_close_window(handle)),
            SYSCALL_REFRESH_WINDOW => ret_bool(self.sys_refresh_window(handle)),
            SYSCALL_REFRESH_WINDOW_MANAGER => ret_bool(self.sys_refresh_window_manager()),
            SYSCALL_SET_WINDOW_SURFACE_BUFFER => self
                .sys_set_window_surface_buffer(caller, handle, user)
                .unwrap_or(0),
            SYSCALL_SET_ROOT_WINDOW_OWNER => {
                ret_bool(self.sys_set_root_window_owner(args.arg0_i32()))
            }
            SYSCALL_GET_WINDOW_INFO => {
                let info = self.sys_get_window_info(handle);
                let written = user.copy_to_user(caller, args.arg1, &info_bytes(info));
                ret_bool(written && info.is_valid())
            }
            SYSCALL_MOVE_WINDOW_ABS => {
                ret_bool(self.sys_move_window_abs(handle, args.arg1_i32(), args.arg2_i32()))
            }
            SYSCALL_TOGGLE_MAXIMIZE => ret_bool(self.sys_toggle_maximize(handle)),
            SYSCALL_TOGGLE_MINIMIZE => ret_bool(self.sys_toggle_minimize(handle)),
            _ => {
                klog_debug!("wm: unknown window syscall {}", nr);
                SYSCALL_WINDOW_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WmConfig;
    use crate::display::MemoryFramebuffer;
    use std::vec::Vec;

    const TITLE_ADDR: u64 = 0x8000;

    struct FakeUser {
        next: u64,
        maps: usize,
        unmaps: Vec<(Pid, u64, usize)>,
        title: &'static [u8],
        copied: Vec<(Pid, u64, Vec<u8>)>,
    }

    impl FakeUser {
        fn new() -> Self {
            Self {
                next: 0x4000_0000,
                maps: 0,
                unmaps: Vec::new(),
                title: b"clock\0",
                copied: Vec::new(),
            }
        }
    }

    impl SurfaceMapper for FakeUser {
        fn map_surface(&mut self, _pid: Pid, pixels: &mut [u32]) -> Option<u64> {
            self.maps += 1;
            let addr = self.next;
            self.next += (pixels.len() * 4) as u64;
            Some(addr)
        }

        fn unmap_surface(&mut self, pid: Pid, addr: u64, len: usize) {
            self.unmaps.push((pid, addr, len));
        }
    }

    impl UserMemory for FakeUser {
        fn copy_from_user(&mut self, _pid: Pid, addr: u64, buf: &mut [u8]) -> bool {
            if addr != TITLE_ADDR {
                return false;
            }
            let n = self.title.len().min(buf.len());
            buf[..n].copy_from_slice(&self.title[..n]);
            true
        }

        fn copy_to_user(&mut self, pid: Pid, addr: u64, bytes: &[u8]) -> bool {
            self.copied.push((pid, addr, bytes.to_vec()));
            true
        }
    }

    fn wm() -> WindowManager<MemoryFramebuffer> {
        let fb = MemoryFramebuffer::new(320, 240).unwrap();
        WindowManager::new(fb, WmConfig::default()).unwrap()
    }

    fn open(wm: &mut WindowManager<MemoryFramebuffer>, user: &mut FakeUser) -> u64 {
        let args = SyscallArgs {
            arg0: 10,
            arg1: 20,
            arg2: 100,
            arg3: 80,
            ..SyscallArgs::default()
        };
        wm.dispatch(SYSCALL_OPEN_WINDOW, 5, args, user)
    }

    #[test]
    fn test_root_handle_is_zero() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        let r = wm.dispatch(SYSCALL_GET_ROOT_WINDOW, 1, SyscallArgs::default(), &mut user);
        assert_eq!(r, 0);
    }

    #[test]
    fn test_open_sets_owner_and_geometry() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        let handle = open(&mut wm, &mut user);
        assert_ne!(handle, SYSCALL_WINDOW_ERROR);
        let id = wm.lookup(handle as i32).unwrap();
        assert_eq!(wm.window(id).unwrap().owner(), 5);
        assert_eq!(wm.window(id).unwrap().title(), "");
        assert_eq!(
            wm.sys_get_window_info(handle as i32),
            WindowInfo {
                x: 10,
                y: 20,
                w: 100,
                h: 80
            }
        );
    }

    #[test]
    fn test_stale_handle_fails_closed_everywhere() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        let handle = open(&mut wm, &mut user);
        let args = SyscallArgs {
            arg0: handle,
            ..SyscallArgs::default()
        };
        assert_eq!(wm.dispatch(SYSCALL_CLOSE_WINDOW, 5, args, &mut user), 1);

        for nr in [
            SYSCALL_CLOSE_WINDOW,
            SYSCALL_REFRESH_WINDOW,
            SYSCALL_MOVE_WINDOW_ABS,
            SYSCALL_TOGGLE_MAXIMIZE,
            SYSCALL_TOGGLE_MINIMIZE,
            SYSCALL_SET_WINDOW_SURFACE_BUFFER,
            SYSCALL_GET_WINDOW_INFO,
        ] {
            assert_eq!(wm.dispatch(nr, 5, args, &mut user), 0, "syscall {}", nr);
        }
        assert_eq!(wm.sys_get_window_info(handle as i32), WindowInfo::INVALID);
        assert_eq!(user.maps, 0);

        // The slot is reused by the next window but the old handle stays dead.
        let fresh = open(&mut wm, &mut user);
        assert_ne!(fresh, handle);
        assert!(!wm.sys_refresh_window(handle as i32));
        assert!(wm.sys_refresh_window(fresh as i32));
    }

    #[test]
    fn test_negative_handles_rejected() {
        let mut wm = wm();
        assert!(!wm.sys_close_window(-1));
        assert!(!wm.sys_move_window_abs(-7, 0, 0));
        assert_eq!(wm.sys_get_window_info(-1), WindowInfo::INVALID);
    }

    #[test]
    fn test_root_cannot_be_closed() {
        let mut wm = wm();
        assert!(!wm.sys_close_window(0));
        assert_eq!(wm.tree().len(), 1);
    }

    #[test]
    fn test_surface_mapping_is_cached_per_window() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        let handle = open(&mut wm, &mut user) as i32;
        let first = wm.sys_set_window_surface_buffer(5, handle, &mut user);
        let second = wm.sys_set_window_surface_buffer(5, handle, &mut user);
        assert_eq!(first, Some(0x4000_0000));
        assert_eq!(first, second);
        assert_eq!(user.maps, 1);
        // Someone else's window.
        assert_eq!(wm.sys_set_window_surface_buffer(6, handle, &mut user), None);
    }

    #[test]
    fn test_resize_retires_mapping() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        let handle = open(&mut wm, &mut user) as i32;
        let old = wm.sys_set_window_surface_buffer(5, handle, &mut user).unwrap();
        assert!(wm.sys_toggle_maximize(handle));
        // The old pixels outlive the resize until the mapping is gone.
        assert_eq!(wm.retired_surfaces(), 1);
        assert!(user.unmaps.is_empty());

        let new = wm.sys_set_window_surface_buffer(5, handle, &mut user).unwrap();
        assert_ne!(new, old);
        assert_eq!(user.maps, 2);
        assert_eq!(user.unmaps, [(5, old, 100 * 80 * 4)]);
        assert_eq!(wm.retired_surfaces(), 0);
    }

    #[test]
    fn test_close_unmaps_surface() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        let handle = open(&mut wm, &mut user);
        let args = SyscallArgs {
            arg0: handle,
            ..SyscallArgs::default()
        };
        let addr = wm.dispatch(SYSCALL_SET_WINDOW_SURFACE_BUFFER, 5, args, &mut user);
        assert_eq!(addr, 0x4000_0000);

        assert_eq!(wm.dispatch(SYSCALL_CLOSE_WINDOW, 5, args, &mut user), 1);
        assert_eq!(user.unmaps, [(5, addr, 100 * 80 * 4)]);
        assert_eq!(wm.retired_surfaces(), 0);
    }

    #[test]
    fn test_unmapped_window_close_retires_nothing() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        let handle = open(&mut wm, &mut user) as i32;
        assert!(wm.sys_close_window(handle));
        assert_eq!(wm.retired_surfaces(), 0);
    }

    #[test]
    fn test_window_info_copied_out() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        let handle = open(&mut wm, &mut user);
        let args = SyscallArgs {
            arg0: handle,
            arg1: 0x1000,
            ..SyscallArgs::default()
        };
        assert_eq!(wm.dispatch(SYSCALL_GET_WINDOW_INFO, 5, args, &mut user), 1);
        let (pid, addr, bytes) = &user.copied[0];
        assert_eq!((*pid, *addr), (5, 0x1000));
        assert_eq!(&bytes[0..4], &10i32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &80i32.to_ne_bytes());
    }

    #[test]
    fn test_set_root_owner_and_move() {
        let mut wm = wm();
        assert!(wm.sys_set_root_window_owner(3));
        assert_eq!(wm.root_owner(), 3);
        let h = wm.sys_open_window(5, 0, 0, 100, 100, 0, "");
        assert!(wm.sys_move_window_abs(h, 40, 50));
        // Same position again is still a success.
        assert!(wm.sys_move_window_abs(h, 40, 50));
        assert_eq!(wm.sys_get_window_info(h).x, 40);
    }

    #[test]
    fn test_open_reads_title() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        let args = SyscallArgs {
            arg2: 120,
            arg3: 90,
            arg5: TITLE_ADDR,
            ..SyscallArgs::default()
        };
        let handle = wm.dispatch(SYSCALL_OPEN_WINDOW, 5, args, &mut user);
        let id = wm.lookup(handle as i32).unwrap();
        assert_eq!(wm.window(id).unwrap().title(), "clock");

        let bad = SyscallArgs {
            arg5: 0xdead,
            ..args
        };
        assert_eq!(
            wm.dispatch(SYSCALL_OPEN_WINDOW, 5, bad, &mut user),
            SYSCALL_WINDOW_ERROR
        );
        assert_eq!(wm.tree().len(), 2);
    }

    #[test]
    fn test_unknown_syscall() {
        let mut wm = wm();
        let mut user = FakeUser::new();
        assert_eq!(
            wm.dispatch(999, 1, SyscallArgs::default(), &mut user),
            SYSCALL_WINDOW_ERROR
        );
    }
}
