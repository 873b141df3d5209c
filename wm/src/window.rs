use alloc::string::String;
use alloc::vec::Vec;

use unios_abi::ipc::{NO_OWNER, Pid};
use unios_abi::window::{
    MIN_MINIMIZED_WIDTH, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH, MINIMIZED_HEIGHT, TITLE_MAX,
    WindowFlags,
};
use unios_abi::{Color32, Rect};
use unios_gfx::OwnedSurface;

use crate::tree::WindowId;

/// Where a minimized window goes back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinimizeRestore {
    pub bounds: Rect,
    pub was_maximized: bool,
}

/// A window surface mapped into a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserMapping {
    pub pid: Pid,
    pub addr: u64,
}

/// A surface the window no longer uses but a process may still have mapped.
/// Kept alive until the mapping is torn down.
pub(crate) struct RetiredSurface {
    pub(crate) mapping: UserMapping,
    pub(crate) surface: OwnedSurface,
}

pub struct Window {
    /// Geometry relative to the parent's origin.
    pub(crate) rect: Rect,
    pub(crate) flags: WindowFlags,
    pub(crate) bg: Color32,
    pub(crate) title: String,
    pub(crate) owner: Pid,
    pub(crate) surface: OwnedSurface,
    /// Drawn with title bar and frame. Only the root is bare.
    pub(crate) decorated: bool,
    pub(crate) parent: Option<WindowId>,
    /// Back to front.
    pub(crate) children: Vec<WindowId>,
    /// Bounds to return to when un-maximizing.
    pub(crate) normal_bounds: Rect,
    /// Set exactly while `MINIMIZED` is.
    pub(crate) restore: Option<MinimizeRestore>,
    /// Where the surface is mapped in the owner's address space, if it is.
    pub(crate) user_mapping: Option<UserMapping>,
}

impl Window {
    pub(crate) fn new(rect: Rect, title: &str, bg: Color32, surface: OwnedSurface) -> Self {
        Self {
            rect,
            flags: WindowFlags::VISIBLE,
            bg,
            title: clamp_title(title),
            owner: NO_OWNER,
            surface,
            decorated: true,
            parent: None,
            children: Vec::new(),
            normal_bounds: rect,
            restore: None,
            user_mapping: None,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub fn bg(&self) -> Color32 {
        self.bg
    }

    #[inline]
    pub fn owner(&self) -> Pid {
        self.owner
    }

    #[inline]
    pub fn surface(&self) -> &OwnedSurface {
        &self.surface
    }

    #[inline]
    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[WindowId] {
        &self.children
    }

    #[inline]
    pub fn normal_bounds(&self) -> Rect {
        self.normal_bounds
    }

    #[inline]
    pub fn minimize_restore(&self) -> Option<MinimizeRestore> {
        self.restore
    }

    #[inline]
    pub fn is_maximized(&self) -> bool {
        self.flags.contains(WindowFlags::MAXIMIZED)
    }

    #[inline]
    pub fn is_minimized(&self) -> bool {
        self.flags.contains(WindowFlags::MINIMIZED)
    }

    /// Visible and not minimized: composited and hit-tested.
    #[inline]
    pub fn is_shown(&self) -> bool {
        self.flags.is_hittable()
    }

    /// Smallest size the window may take in its current state.
    pub fn min_size(&self) -> (i32, i32) {
        if self.is_minimized() {
            (MIN_MINIMIZED_WIDTH, MINIMIZED_HEIGHT)
        } else {
            (MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT)
        }
    }
}

/// Keep at most `TITLE_MAX` bytes, cutting on a character boundary.
pub(crate) fn clamp_title(title: &str) -> String {
    let mut end = title.len().min(TITLE_MAX);
    while !title.is_char_boundary(end) {
        end -= 1;
    }
    String::from(&title[..end])
}

/// Decode a title copied from userland. Invalid UTF-8 sequences become `?`.
pub fn decode_title(bytes: &[u8]) -> String {
    let bytes = match bytes.iter().position(|&b| b == 0) {
        Some(nul) => &bytes[..nul],
        None => bytes,
    };
    let mut out = String::new();
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        if !chunk.invalid().is_empty() {
            out.push('?');
        }
    }
    clamp_title(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_title_respects_char_boundaries() {
        let long = "abcdefghijklmnopqrstuvwxyz012345678";
        assert_eq!(clamp_title(long).len(), TITLE_MAX);

        // 3-byte characters: 10 fit in 30 bytes, the 11th would straddle 31.
        let wide = "\u{4e2d}".repeat(12);
        let clamped = clamp_title(&wide);
        assert_eq!(clamped.len(), 30);
        assert_eq!(clamped.chars().count(), 10);
    }

    #[test]
    fn test_decode_title_replaces_invalid() {
        assert_eq!(decode_title(b"ok\xFFgo"), "ok?go");
        assert_eq!(decode_title(b"term\0garbage"), "term");
        assert_eq!(decode_title(b"\xE4\xB8\xAD"), "\u{4e2d}");
    }
}
