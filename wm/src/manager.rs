//! The window manager context.
//!
//! [`WindowManager`] owns everything the window system mutates: the window
//! arena, damage, the pointer gesture in progress, focus, the cursor and the
//! display. It is built once at startup and handed to the service loop and
//! the syscall layer; there is no ambient global state.

use alloc::vec::Vec;

use unios_abi::ipc::{NO_OWNER, Pid};
use unios_abi::window::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH, MINIMIZED_HEIGHT, WindowFlags};
use unios_abi::{Color32, DisplayMode, MouseButtons, Rect, WindowInfo};
use unios_gfx::decor::{DecorStyle, client_area, paint_frame, paint_window};
use unios_gfx::{DamageTracker, GlyphSource, OwnedSurface, fill_rect};
use unios_lib::{klog_debug, klog_info, klog_set_level, klog_warn};

use crate::config::WmConfig;
use crate::cursor::CursorOverlay;
use crate::display::FramebufferProvider;
use crate::error::{WmError, WmResult};
use crate::interaction::Gesture;
use crate::tree::{WindowId, WindowTree};
use crate::window::{MinimizeRestore, RetiredSurface, Window, clamp_title};

pub struct WindowManager<D> {
    pub(crate) config: WmConfig,
    pub(crate) style: DecorStyle,
    pub(crate) display: D,
    pub(crate) mode: DisplayMode,
    pub(crate) tree: WindowTree,
    pub(crate) damage: DamageTracker,
    pub(crate) gesture: Gesture,
    /// Button mask of the last pointer report.
    pub(crate) buttons: MouseButtons,
    pub(crate) focused: Option<WindowId>,
    pub(crate) cursor: CursorOverlay,
    pub(crate) font: Option<&'static dyn GlyphSource>,
    /// Surfaces dropped by their window while still mapped into a process.
    pub(crate) retired: Vec<RetiredSurface>,
}

impl<D: FramebufferProvider> WindowManager<D> {
    /// Take over `display`: create the root window covering the whole mode
    /// and schedule a full repaint.
    pub fn new(display: D, config: WmConfig) -> WmResult<Self> {
        let mode = display.mode();
        if mode.width == 0 || mode.height == 0 {
            return Err(WmError::NoDisplay);
        }
        if let Some(level) = config.log_level {
            klog_set_level(level);
        }

        let surface = OwnedSurface::filled(mode.width, mode.height, config.desktop_color)?;
        let mut root = Window::new(mode.bounds(), "desktop", config.desktop_color, surface);
        root.decorated = false;
        let tree = WindowTree::new(root)?;

        let mut damage = DamageTracker::new(mode.bounds());
        damage.add_screen();
        let cursor = CursorOverlay::new(mode, config.cursor)?;

        klog_info!("wm: display {}x{}@{}", mode.width, mode.height, mode.bpp);

        Ok(Self {
            config,
            style: DecorStyle::DEFAULT,
            display,
            mode,
            tree,
            damage,
            gesture: Gesture::Idle,
            buttons: MouseButtons::empty(),
            focused: None,
            cursor,
            font: None,
            retired: Vec::new(),
        })
    }

    /// Glyphs for title text. Without a font titles are not drawn.
    pub fn set_font(&mut self, font: &'static dyn GlyphSource) {
        self.font = Some(font);
    }

    pub fn set_style(&mut self, style: DecorStyle) {
        self.style = style;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    pub fn config(&self) -> &WmConfig {
        &self.config
    }

    #[inline]
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    #[inline]
    pub fn display(&self) -> &D {
        &self.display
    }

    #[inline]
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    #[inline]
    pub fn root(&self) -> WindowId {
        self.tree.root()
    }

    #[inline]
    pub fn tree(&self) -> &WindowTree {
        &self.tree
    }

    #[inline]
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.tree.get(id)
    }

    /// Resolve a userland handle.
    #[inline]
    pub fn lookup(&self, handle: i32) -> Option<WindowId> {
        self.tree.resolve(handle)
    }

    #[inline]
    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    #[inline]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    #[inline]
    pub fn pending_damage(&self) -> Option<Rect> {
        self.damage.peek()
    }

    #[inline]
    pub fn cursor_position(&self) -> (i32, i32) {
        self.cursor.position()
    }

    /// Pixels of a window, for its owner to draw into. Call
    /// [`WindowManager::invalidate`] afterwards.
    pub fn surface_mut(&mut self, id: WindowId) -> Option<&mut OwnedSurface> {
        self.tree.get_mut(id).map(|w| &mut w.surface)
    }

    pub fn info(&self, id: WindowId) -> Option<WindowInfo> {
        self.tree.get(id).map(|w| WindowInfo::from_rect(w.rect))
    }

    /// Surfaces still waiting for their user mapping to be torn down.
    pub fn retired_surfaces(&self) -> usize {
        self.retired.len()
    }

    pub fn root_owner(&self) -> Pid {
        self.tree.get(self.root()).map_or(NO_OWNER, |w| w.owner)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Open a decorated top-level window, frontmost.
    pub fn create(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        title: &str,
        bg: Color32,
    ) -> WmResult<WindowId> {
        self.create_child(self.root(), x, y, w, h, title, bg)
    }

    /// Open a window inside `parent`, positioned relative to it.
    #[allow(clippy::too_many_arguments)]
    pub fn create_child(
        &mut self,
        parent: WindowId,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        title: &str,
        bg: Color32,
    ) -> WmResult<WindowId> {
        if !self.tree.contains(parent) {
            return Err(WmError::InvalidHandle);
        }
        let w = w.clamp(MIN_WINDOW_WIDTH, (self.mode.width as i32).max(MIN_WINDOW_WIDTH));
        let h = h.clamp(MIN_WINDOW_HEIGHT, (self.mode.height as i32).max(MIN_WINDOW_HEIGHT));

        let surface = OwnedSurface::new(w as u32, h as u32).map_err(|err| {
            klog_warn!("wm: cannot allocate window surface: {}", err);
            WmError::from(err)
        })?;
        let id = self
            .tree
            .insert(Window::new(Rect::new(x, y, w, h), title, bg, surface))?;
        if let Err(err) = self.tree.attach(parent, id) {
            self.tree.remove(id);
            return Err(err);
        }

        self.repaint(id, true);
        self.invalidate_window(id);
        klog_info!(
            "wm: window {} \"{}\" at {},{} {}x{}",
            id.to_handle(),
            title,
            x,
            y,
            w,
            h
        );
        Ok(id)
    }

    /// Close a window and everything inside it.
    pub fn destroy(&mut self, id: WindowId) -> WmResult<()> {
        if id == self.root() {
            return Err(WmError::RootWindow);
        }
        if !self.tree.contains(id) {
            return Err(WmError::InvalidHandle);
        }
        if let Some(target) = self.gesture.target()
            && self.tree.is_within(target, id)
        {
            klog_debug!("wm: gesture on window {} aborted", target.to_handle());
            self.gesture = Gesture::Idle;
        }
        if let Some(focused) = self.focused
            && self.tree.is_within(focused, id)
        {
            self.focused = None;
        }

        self.invalidate_window(id);
        let doomed = self.tree.subtree(id);
        self.tree.detach(id);
        for victim in doomed.into_iter().rev() {
            if let Some(window) = self.tree.remove(victim)
                && let Some(mapping) = window.user_mapping
            {
                self.retired.push(RetiredSurface {
                    mapping,
                    surface: window.surface,
                });
            }
        }
        klog_info!("wm: window {} closed", id.to_handle());
        Ok(())
    }

    pub fn set_owner(&mut self, id: WindowId, owner: Pid) -> WmResult<()> {
        let window = self.tree.get_mut(id).ok_or(WmError::InvalidHandle)?;
        window.owner = owner;
        Ok(())
    }

    pub fn set_title(&mut self, id: WindowId, title: &str) -> WmResult<()> {
        let window = self.tree.get_mut(id).ok_or(WmError::InvalidHandle)?;
        window.title = clamp_title(title);
        self.repaint(id, false);
        self.invalidate_window(id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stacking and geometry
    // -----------------------------------------------------------------------

    /// Raise `id` above its siblings. Returns false if nothing changed.
    pub fn bring_to_front(&mut self, id: WindowId) -> bool {
        if id == self.root() || !self.tree.raise(id) {
            return false;
        }
        self.invalidate_window(id);
        true
    }

    /// Move and resize. The size is clamped to the window's minimum; a size
    /// change reallocates the surface and repaints decoration, dropping the
    /// old content.
    pub fn set_bounds(&mut self, id: WindowId, rect: Rect) -> WmResult<()> {
        if id == self.root() {
            return Err(WmError::RootWindow);
        }
        let window = self.tree.get(id).ok_or(WmError::InvalidHandle)?;
        let (min_w, min_h) = window.min_size();
        let new = Rect::new(rect.x, rect.y, rect.w.max(min_w), rect.h.max(min_h));
        let old = window.rect;
        if new == old {
            return Ok(());
        }

        let surface = if new.w != old.w || new.h != old.h {
            Some(OwnedSurface::new(new.w as u32, new.h as u32)?)
        } else {
            None
        };

        self.invalidate_window(id);
        let window = self.tree.get_mut(id).ok_or(WmError::InvalidHandle)?;
        window.rect = new;
        if let Some(surface) = surface {
            let old_surface = core::mem::replace(&mut window.surface, surface);
            if let Some(mapping) = window.user_mapping.take() {
                klog_debug!("wm: window {} resized, user mapping retired", id.to_handle());
                self.retired.push(RetiredSurface {
                    mapping,
                    surface: old_surface,
                });
            }
            self.repaint(id, true);
        }
        self.invalidate_window(id);
        Ok(())
    }

    /// Move without resizing. Moving to the current position succeeds
    /// without doing anything.
    pub fn move_to(&mut self, id: WindowId, x: i32, y: i32) -> WmResult<()> {
        let rect = self.tree.get(id).ok_or(WmError::InvalidHandle)?.rect;
        self.set_bounds(id, Rect::new(x, y, rect.w, rect.h))
    }

    /// Frontmost shown top-level window containing the point, or the root.
    pub fn from_point(&self, x: i32, y: i32) -> WindowId {
        let root = self.root();
        self.tree
            .children(root)
            .iter()
            .rev()
            .copied()
            .find(|&id| {
                self.tree
                    .get(id)
                    .is_some_and(|w| w.is_shown() && w.rect.contains(x, y))
            })
            .unwrap_or(root)
    }

    // -----------------------------------------------------------------------
    // Damage
    // -----------------------------------------------------------------------

    /// Mark `local` (window coordinates) for repaint.
    pub fn invalidate(&mut self, id: WindowId, local: Rect) {
        let Some((ox, oy)) = self.tree.origin(id) else {
            return;
        };
        if let Some(window) = self.tree.get_mut(id) {
            window.flags.insert(WindowFlags::DIRTY);
        }
        self.damage.add_local(ox, oy, local);
    }

    pub(crate) fn invalidate_window(&mut self, id: WindowId) {
        if let Some(rect) = self.tree.get(id).map(|w| w.rect) {
            self.invalidate(id, Rect::sized(rect.w, rect.h));
        }
    }

    /// Repaint the whole window on the next pass.
    pub fn refresh(&mut self, id: WindowId) -> WmResult<()> {
        if !self.tree.contains(id) {
            return Err(WmError::InvalidHandle);
        }
        self.invalidate_window(id);
        Ok(())
    }

    /// Repaint the whole screen on the next pass.
    pub fn refresh_all(&mut self) {
        self.damage.add_screen();
    }

    /// Fill the client area (the whole surface for the root).
    pub fn fill(&mut self, id: WindowId, color: Color32) -> WmResult<()> {
        let window = self.tree.get_mut(id).ok_or(WmError::InvalidHandle)?;
        let area = if window.decorated {
            client_area(window.rect.w, window.rect.h)
        } else {
            window.surface.bounds()
        };
        fill_rect(&mut window.surface, area, color);
        self.invalidate(id, area);
        Ok(())
    }

    fn repaint(&mut self, id: WindowId, full: bool) {
        let focused = self.focused == Some(id);
        let font = self.font;
        let style = self.style;
        let Some(window) = self.tree.get_mut(id) else {
            return;
        };
        if !window.decorated {
            if full {
                window.surface.clear(window.bg);
            }
            return;
        }
        if full {
            paint_window(&mut window.surface, &style, &window.title, window.bg, focused, font);
        } else {
            paint_frame(&mut window.surface, &style, &window.title, focused, font);
        }
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// Give keyboard focus to `id`. Focusing the root clears focus.
    pub fn focus(&mut self, id: WindowId) {
        if self.focused == Some(id) {
            return;
        }
        if let Some(prev) = self.focused.take() {
            if let Some(window) = self.tree.get_mut(prev) {
                window.flags.remove(WindowFlags::FOCUSED);
            }
            self.repaint(prev, false);
            self.invalidate_window(prev);
        }
        if id == self.root() {
            return;
        }
        let Some(window) = self.tree.get_mut(id) else {
            return;
        };
        window.flags.insert(WindowFlags::FOCUSED);
        self.focused = Some(id);
        self.repaint(id, false);
        self.invalidate_window(id);
    }

    // -----------------------------------------------------------------------
    // Maximize / minimize
    // -----------------------------------------------------------------------

    /// Screen bounds expressed in the coordinates of `id`'s parent.
    fn screen_in_parent(&self, id: WindowId) -> Rect {
        let (px, py) = self
            .tree
            .get(id)
            .and_then(|w| w.parent)
            .and_then(|p| self.tree.origin(p))
            .unwrap_or((0, 0));
        self.mode.bounds().translate(px.saturating_neg(), py.saturating_neg())
    }

    pub fn toggle_maximize(&mut self, id: WindowId) -> WmResult<()> {
        if id == self.root() {
            return Err(WmError::RootWindow);
        }
        let window = self.tree.get(id).ok_or(WmError::InvalidHandle)?;
        if window.is_minimized() {
            return self.restore_minimized(id);
        }
        if window.is_maximized() {
            let normal = window.normal_bounds;
            self.set_bounds(id, normal)?;
            if let Some(window) = self.tree.get_mut(id) {
                window.flags.remove(WindowFlags::MAXIMIZED);
            }
            klog_debug!("wm: window {} restored", id.to_handle());
        } else {
            let current = window.rect;
            let full = self.screen_in_parent(id);
            self.set_bounds(id, full)?;
            if let Some(window) = self.tree.get_mut(id) {
                window.normal_bounds = current;
                window.flags.insert(WindowFlags::MAXIMIZED);
            }
            klog_debug!("wm: window {} maximized", id.to_handle());
        }
        Ok(())
    }

    pub fn toggle_minimize(&mut self, id: WindowId) -> WmResult<()> {
        if id == self.root() {
            return Err(WmError::RootWindow);
        }
        let window = self.tree.get(id).ok_or(WmError::InvalidHandle)?;
        if window.is_minimized() {
            return self.restore_minimized(id);
        }
        let restore = MinimizeRestore {
            bounds: window.rect,
            was_maximized: window.is_maximized(),
        };
        let strip = Rect::new(
            window.rect.x,
            window.rect.y,
            window.rect.w.min(self.mode.width as i32),
            MINIMIZED_HEIGHT,
        );

        self.set_flag(id, WindowFlags::MINIMIZED, true);
        if let Err(err) = self.set_bounds(id, strip) {
            self.set_flag(id, WindowFlags::MINIMIZED, false);
            return Err(err);
        }
        if let Some(window) = self.tree.get_mut(id) {
            window.flags.remove(WindowFlags::MAXIMIZED);
            window.restore = Some(restore);
        }
        if self.focused == Some(id) {
            self.focus(self.root());
        }
        self.invalidate_window(id);
        klog_debug!("wm: window {} minimized", id.to_handle());
        Ok(())
    }

    fn restore_minimized(&mut self, id: WindowId) -> WmResult<()> {
        let Some(restore) = self.tree.get(id).and_then(|w| w.restore) else {
            return Ok(());
        };
        self.set_flag(id, WindowFlags::MINIMIZED, false);
        if let Err(err) = self.set_bounds(id, restore.bounds) {
            self.set_flag(id, WindowFlags::MINIMIZED, true);
            return Err(err);
        }
        if let Some(window) = self.tree.get_mut(id) {
            window.restore = None;
            window.flags.set(WindowFlags::MAXIMIZED, restore.was_maximized);
        }
        self.invalidate_window(id);
        klog_debug!("wm: window {} unminimized", id.to_handle());
        Ok(())
    }

    fn set_flag(&mut self, id: WindowId, flag: WindowFlags, on: bool) {
        if let Some(window) = self.tree.get_mut(id) {
            window.flags.set(flag, on);
        }
    }

    /// Show or hide a window without touching its geometry.
    pub fn set_visible(&mut self, id: WindowId, visible: bool) -> WmResult<()> {
        if id == self.root() {
            return Err(WmError::RootWindow);
        }
        if !self.tree.contains(id) {
            return Err(WmError::InvalidHandle);
        }
        self.set_flag(id, WindowFlags::VISIBLE, visible);
        self.invalidate_window(id);
        Ok(())
    }
}
