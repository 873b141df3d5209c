//! Window arena.
//!
//! Windows live in a fixed-capacity slot table and refer to each other by
//! [`WindowId`]. An id carries the generation of its slot; releasing a slot
//! bumps the generation, so an id held past `destroy` resolves to nothing
//! even after the slot is reused.

use alloc::vec::Vec;

use unios_abi::window::{MAX_WINDOWS, WindowHandle};

use crate::error::{WmError, WmResult};
use crate::window::Window;

const INDEX_BITS: u32 = 8;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
/// Generations wrap inside 23 bits so handles stay non-negative `i32`s.
const GENERATION_MASK: u32 = (1 << (31 - INDEX_BITS)) - 1;

const _: () = assert!(MAX_WINDOWS == 1 << INDEX_BITS);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId {
    index: u32,
    generation: u32,
}

impl WindowId {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// The integer handed to userland.
    #[inline]
    pub fn to_handle(self) -> WindowHandle {
        ((self.generation << INDEX_BITS) | self.index) as WindowHandle
    }

    /// Decode a userland handle. Only the shape is checked here; whether it
    /// names a live window is up to the tree.
    pub fn from_handle(handle: WindowHandle) -> Option<Self> {
        if handle < 0 {
            return None;
        }
        let raw = handle as u32;
        Some(Self {
            index: raw & INDEX_MASK,
            generation: raw >> INDEX_BITS,
        })
    }
}

struct Slot {
    generation: u32,
    window: Option<Window>,
}

pub struct WindowTree {
    slots: Vec<Slot>,
    root: WindowId,
    live: usize,
}

impl WindowTree {
    /// Create the tree with `root` in slot 0.
    pub fn new(root: Window) -> WmResult<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve(MAX_WINDOWS)
            .map_err(|_| WmError::NoMemory)?;
        slots.push(Slot {
            generation: 0,
            window: Some(root),
        });
        Ok(Self {
            slots,
            root: WindowId {
                index: 0,
                generation: 0,
            },
            live: 1,
        })
    }

    #[inline]
    pub fn root(&self) -> WindowId {
        self.root
    }

    /// Live windows, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.window.as_ref()
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.window.as_mut()
    }

    #[inline]
    pub fn contains(&self, id: WindowId) -> bool {
        self.get(id).is_some()
    }

    /// Resolve a userland handle to a live window id.
    pub fn resolve(&self, handle: WindowHandle) -> Option<WindowId> {
        WindowId::from_handle(handle).filter(|&id| self.contains(id))
    }

    /// Store `window` in a free slot. The window is not linked anywhere yet.
    pub fn insert(&mut self, window: Window) -> WmResult<WindowId> {
        let index = match self.slots.iter().position(|s| s.window.is_none()) {
            Some(index) => index,
            None if self.slots.len() < MAX_WINDOWS => {
                self.slots
                    .try_reserve(1)
                    .map_err(|_| WmError::NoMemory)?;
                self.slots.push(Slot {
                    generation: 0,
                    window: None,
                });
                self.slots.len() - 1
            }
            None => return Err(WmError::TableFull),
        };
        let slot = &mut self.slots[index];
        slot.window = Some(window);
        self.live += 1;
        Ok(WindowId {
            index: index as u32,
            generation: slot.generation,
        })
    }

    /// Release the slot of `id`, returning the window. Links are not
    /// touched; detach first.
    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let window = slot.window.take()?;
        slot.generation = (slot.generation + 1) & GENERATION_MASK;
        self.live -= 1;
        Some(window)
    }

    /// Append `child` as the frontmost child of `parent`.
    pub fn attach(&mut self, parent: WindowId, child: WindowId) -> WmResult<()> {
        if !self.contains(child) {
            return Err(WmError::InvalidHandle);
        }
        let p = self.get_mut(parent).ok_or(WmError::InvalidHandle)?;
        p.children
            .try_reserve(1)
            .map_err(|_| WmError::NoMemory)?;
        p.children.push(child);
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        Ok(())
    }

    /// Unlink `child` from its parent's child list.
    pub fn detach(&mut self, child: WindowId) {
        let Some(parent) = self.get(child).and_then(|c| c.parent) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = None;
        }
    }

    pub fn children(&self, id: WindowId) -> &[WindowId] {
        self.get(id).map(|w| w.children.as_slice()).unwrap_or(&[])
    }

    /// Move `id` to the front of its siblings. Returns false if it has no
    /// parent or already is frontmost.
    pub fn raise(&mut self, id: WindowId) -> bool {
        let Some(parent) = self.get(id).and_then(|w| w.parent) else {
            return false;
        };
        let Some(p) = self.get_mut(parent) else {
            return false;
        };
        match p.children.iter().position(|&c| c == id) {
            Some(pos) if pos + 1 != p.children.len() => {
                let moved = p.children.remove(pos);
                p.children.push(moved);
                true
            }
            _ => false,
        }
    }

    /// Screen position of the top-left corner of `id`.
    pub fn origin(&self, id: WindowId) -> Option<(i32, i32)> {
        let mut window = self.get(id)?;
        let (mut x, mut y) = (window.rect.x, window.rect.y);
        while let Some(parent) = window.parent {
            window = self.get(parent)?;
            x = x.saturating_add(window.rect.x);
            y = y.saturating_add(window.rect.y);
        }
        Some((x, y))
    }

    /// `id` and all its descendants, parents before children.
    pub fn subtree(&self, id: WindowId) -> Vec<WindowId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        out.push(id);
        let mut next = 0;
        while next < out.len() {
            let current = out[next];
            out.extend_from_slice(self.children(current));
            next += 1;
        }
        out
    }

    /// True if `id` is `ancestor` or lies below it.
    pub fn is_within(&self, id: WindowId, ancestor: WindowId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.get(c).and_then(|w| w.parent);
        }
        false
    }
}
