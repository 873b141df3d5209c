//! Pointer interaction: hit-testing and the drag/resize gesture machine.

use bitflags::bitflags;

use unios_abi::window::{BORDER_WIDTH, DecorButton, TITLE_BAR_HEIGHT, WindowFlags};
use unios_abi::{MouseButtons, PointerEvent, Rect};
use unios_lib::{klog_debug, klog_warn};

use crate::display::FramebufferProvider;
use crate::manager::WindowManager;
use crate::tree::WindowId;

bitflags! {
    /// Window edges a resize moves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EdgeMask: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    None,
    Client,
    TitleBar,
    Button(DecorButton),
    /// Border or corner; a corner has two bits set.
    Edge(EdgeMask),
}

/// Classify `(x, y)` against a window occupying `rect` on screen.
pub fn hit_test(rect: Rect, x: i32, y: i32) -> HitZone {
    if !rect.contains(x, y) {
        return HitZone::None;
    }

    let mut edges = EdgeMask::empty();
    edges.set(EdgeMask::LEFT, x < rect.x + BORDER_WIDTH);
    edges.set(EdgeMask::RIGHT, x >= rect.right() - BORDER_WIDTH);
    edges.set(EdgeMask::TOP, y < rect.y + BORDER_WIDTH);
    edges.set(EdgeMask::BOTTOM, y >= rect.bottom() - BORDER_WIDTH);
    if !edges.is_empty() {
        return HitZone::Edge(edges);
    }

    if y < rect.y + TITLE_BAR_HEIGHT {
        return match DecorButton::at(rect.w, x - rect.x, y - rect.y) {
            Some(button) => HitZone::Button(button),
            None => HitZone::TitleBar,
        };
    }
    HitZone::Client
}

/// Bounds after dragging `edges` of `start` by `(dx, dy)`. A moved
/// left or top edge leaves the opposite edge in place, even when the size
/// runs into the minimum.
pub fn resize_rect(start: Rect, edges: EdgeMask, dx: i32, dy: i32, min_w: i32, min_h: i32) -> Rect {
    let mut r = start;
    if edges.contains(EdgeMask::LEFT) {
        r.w = (start.w - dx).max(min_w);
        r.x = start.right() - r.w;
    } else if edges.contains(EdgeMask::RIGHT) {
        r.w = (start.w + dx).max(min_w);
    }
    if edges.contains(EdgeMask::TOP) {
        r.h = (start.h - dy).max(min_h);
        r.y = start.bottom() - r.h;
    } else if edges.contains(EdgeMask::BOTTOM) {
        r.h = (start.h + dy).max(min_h);
    }
    r
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    Dragging {
        window: WindowId,
        /// Pointer position relative to the window origin.
        grab_x: i32,
        grab_y: i32,
        start_x: i32,
        start_y: i32,
        /// Past the drag threshold; until then the press is just a click.
        armed: bool,
    },
    Resizing {
        window: WindowId,
        edges: EdgeMask,
        start_rect: Rect,
        start_x: i32,
        start_y: i32,
    },
}

impl Gesture {
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Window the gesture operates on.
    pub fn target(&self) -> Option<WindowId> {
        match *self {
            Self::Idle => None,
            Self::Dragging { window, .. } | Self::Resizing { window, .. } => Some(window),
        }
    }
}

impl<D: FramebufferProvider> WindowManager<D> {
    /// Feed one pointer report: move the cursor and advance the gesture.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let mode = self.mode;
        self.cursor.set_position(event.x, event.y, mode);
        let (x, y) = self.cursor.position();

        let was_down = self.buttons.contains(MouseButtons::LEFT);
        let down = event.buttons.contains(MouseButtons::LEFT);
        self.buttons = event.buttons;

        match (was_down, down) {
            (false, true) => self.pointer_down(x, y),
            (true, false) => self.pointer_up(),
            (true, true) => self.pointer_drag(x, y),
            (false, false) => {}
        }
    }

    fn pointer_down(&mut self, x: i32, y: i32) {
        self.gesture = Gesture::Idle;
        let id = self.from_point(x, y);
        if id == self.root() {
            self.focus(id);
            return;
        }
        let Some(rect) = self.tree.get(id).map(|w| w.rect) else {
            return;
        };
        self.bring_to_front(id);
        self.focus(id);

        match hit_test(rect, x, y) {
            HitZone::None => {}
            HitZone::Button(button) => self.press_button(id, button),
            HitZone::TitleBar | HitZone::Client => {
                self.gesture = Gesture::Dragging {
                    window: id,
                    grab_x: x - rect.x,
                    grab_y: y - rect.y,
                    start_x: x,
                    start_y: y,
                    armed: false,
                };
            }
            HitZone::Edge(edges) => {
                self.gesture = Gesture::Resizing {
                    window: id,
                    edges,
                    start_rect: rect,
                    start_x: x,
                    start_y: y,
                };
            }
        }
    }

    fn press_button(&mut self, id: WindowId, button: DecorButton) {
        let result = match button {
            DecorButton::Close => self.destroy(id),
            DecorButton::Maximize => self.toggle_maximize(id),
            DecorButton::Minimize => self.toggle_minimize(id),
        };
        if let Err(err) = result {
            klog_warn!("wm: {:?} on window {}: {}", button, id.to_handle(), err);
        }
    }

    fn pointer_drag(&mut self, x: i32, y: i32) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging {
                window,
                mut grab_x,
                grab_y,
                start_x,
                start_y,
                mut armed,
            } => {
                if !armed {
                    let threshold = self.config.drag_threshold;
                    if (x - start_x).abs() <= threshold && (y - start_y).abs() <= threshold {
                        return;
                    }
                    armed = true;
                }
                if let Some(full) = self.tree.get(window).filter(|w| w.is_maximized()).map(|w| w.rect) {
                    if let Err(err) = self.toggle_maximize(window) {
                        klog_warn!("wm: restore on drag failed: {}", err);
                    }
                    if let Some(restored) = self.tree.get(window).map(|w| w.rect)
                        && full.w > 0
                    {
                        grab_x = (grab_x as i64 * restored.w as i64 / full.w as i64) as i32;
                    }
                }
                self.gesture = Gesture::Dragging {
                    window,
                    grab_x,
                    grab_y,
                    start_x,
                    start_y,
                    armed,
                };
                if let Err(err) = self.move_to(window, x - grab_x, y - grab_y) {
                    klog_debug!("wm: drag of window {}: {}", window.to_handle(), err);
                }
            }
            Gesture::Resizing {
                window,
                edges,
                start_rect,
                start_x,
                start_y,
            } => {
                let Some((min_w, min_h)) = self.tree.get(window).map(|w| w.min_size()) else {
                    return;
                };
                let rect = resize_rect(start_rect, edges, x - start_x, y - start_y, min_w, min_h);
                // Resizing ends maximization.
                if let Some(w) = self.tree.get_mut(window)
                    && w.is_maximized()
                    && w.rect != rect
                {
                    w.flags.remove(WindowFlags::MAXIMIZED);
                }
                if let Err(err) = self.set_bounds(window, rect) {
                    klog_warn!("wm: resize of window {}: {}", window.to_handle(), err);
                }
            }
        }
    }

    fn pointer_up(&mut self) {
        let gesture = core::mem::replace(&mut self.gesture, Gesture::Idle);
        let window = match gesture {
            Gesture::Dragging {
                window,
                armed: true,
                ..
            }
            | Gesture::Resizing { window, .. } => window,
            _ => return,
        };
        if let Some(w) = self.tree.get_mut(window)
            && !w.flags.intersects(WindowFlags::MAXIMIZED | WindowFlags::MINIMIZED)
        {
            w.normal_bounds = w.rect;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIN: Rect = Rect::new(100, 100, 200, 150);

    #[test]
    fn test_hit_zones() {
        assert_eq!(hit_test(WIN, 99, 150), HitZone::None);
        assert_eq!(hit_test(WIN, 300, 150), HitZone::None);
        assert_eq!(hit_test(WIN, 150, 105), HitZone::TitleBar);
        assert_eq!(hit_test(WIN, 150, 200), HitZone::Client);
        assert_eq!(hit_test(WIN, 101, 200), HitZone::Edge(EdgeMask::LEFT));
        assert_eq!(hit_test(WIN, 299, 200), HitZone::Edge(EdgeMask::RIGHT));
        assert_eq!(hit_test(WIN, 150, 249), HitZone::Edge(EdgeMask::BOTTOM));
        assert_eq!(hit_test(WIN, 150, 100), HitZone::Edge(EdgeMask::TOP));
    }

    #[test]
    fn test_corners_win_over_edges() {
        assert_eq!(
            hit_test(WIN, 100, 100),
            HitZone::Edge(EdgeMask::TOP | EdgeMask::LEFT)
        );
        assert_eq!(
            hit_test(WIN, 299, 249),
            HitZone::Edge(EdgeMask::BOTTOM | EdgeMask::RIGHT)
        );
    }

    #[test]
    fn test_buttons_in_title_band() {
        // Close sits at x = width - 4 - 14, y = 3.
        let close = DecorButton::Close.rect(WIN.w);
        let zone = hit_test(WIN, WIN.x + close.x + 1, WIN.y + close.y + 1);
        assert_eq!(zone, HitZone::Button(DecorButton::Close));
        let min = DecorButton::Minimize.rect(WIN.w);
        let zone = hit_test(WIN, WIN.x + min.x, WIN.y + min.y + 5);
        assert_eq!(zone, HitZone::Button(DecorButton::Minimize));
    }

    #[test]
    fn test_resize_right_bottom() {
        let r = resize_rect(WIN, EdgeMask::RIGHT | EdgeMask::BOTTOM, 30, -20, 80, 60);
        assert_eq!(r, Rect::new(100, 100, 230, 130));
    }

    #[test]
    fn test_resize_left_keeps_right_edge() {
        let r = resize_rect(WIN, EdgeMask::LEFT, 50, 0, 80, 60);
        assert_eq!(r, Rect::new(150, 100, 150, 150));
        // Clamped: right edge stays at 300.
        let r = resize_rect(WIN, EdgeMask::LEFT, 190, 0, 80, 60);
        assert_eq!(r, Rect::new(220, 100, 80, 150));
        let r = resize_rect(WIN, EdgeMask::TOP, 0, 500, 80, 60);
        assert_eq!(r, Rect::new(100, 190, 200, 60));
    }

    #[test]
    fn test_gesture_target() {
        assert_eq!(Gesture::Idle.target(), None);
        assert!(Gesture::Idle.is_idle());
    }
}
