use bitflags::bitflags;

use crate::rect::Rect;

/// Capacity of the live-window handle table.
pub const MAX_WINDOWS: usize = 256;

/// Longest title kept for a window, in bytes.
pub const TITLE_MAX: usize = 31;

// Decoration layout (pixels)

pub const BORDER_WIDTH: i32 = 4;
pub const TITLE_BAR_HEIGHT: i32 = 20;
pub const BUTTON_SIZE: i32 = 14;
pub const BUTTON_PADDING: i32 = 3;

pub const MIN_WINDOW_WIDTH: i32 = 80;
pub const MIN_WINDOW_HEIGHT: i32 = 60;

/// A minimized window collapses to its title bar strip.
pub const MINIMIZED_HEIGHT: i32 = TITLE_BAR_HEIGHT;
pub const MIN_MINIMIZED_WIDTH: i32 = 60;

/// Handle returned to userland for a window. Negative values are errors.
pub type WindowHandle = i32;

pub const INVALID_WINDOW_HANDLE: WindowHandle = -1;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WindowFlags: u32 {
        const VISIBLE     = 1 << 0;
        const FOCUSED     = 1 << 1;
        const DIRTY       = 1 << 2;
        const TRANSPARENT = 1 << 3;
        const MAXIMIZED   = 1 << 4;
        const MINIMIZED   = 1 << 5;
    }
}

impl WindowFlags {
    /// Drawn and eligible for pointer hits.
    #[inline]
    pub fn is_hittable(self) -> bool {
        self.contains(Self::VISIBLE) && !self.contains(Self::MINIMIZED)
    }
}

/// Title bar controls, ordered from the right edge inward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecorButton {
    Close,
    Maximize,
    Minimize,
}

impl DecorButton {
    pub const ALL: [DecorButton; 3] = [Self::Close, Self::Maximize, Self::Minimize];

    #[inline]
    fn slot(self) -> i32 {
        match self {
            Self::Close => 0,
            Self::Maximize => 1,
            Self::Minimize => 2,
        }
    }

    /// Button square in window-local coordinates for a window `width` wide.
    pub fn rect(self, width: i32) -> Rect {
        let step = BUTTON_SIZE + BUTTON_PADDING;
        let x = width - BORDER_WIDTH - BUTTON_SIZE - self.slot() * step;
        let y = (TITLE_BAR_HEIGHT - BUTTON_SIZE) / 2;
        Rect::new(x, y, BUTTON_SIZE, BUTTON_SIZE)
    }

    /// The button under a window-local point, if any.
    pub fn at(width: i32, lx: i32, ly: i32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|button| button.rect(width).contains(lx, ly))
    }
}

/// Window-local span of the title bar left free for title text.
pub fn title_text_area(width: i32) -> Rect {
    let x0 = BORDER_WIDTH + BUTTON_PADDING;
    let x1 = DecorButton::Minimize.rect(width).x - BUTTON_PADDING;
    Rect::new(x0, 0, (x1 - x0).max(0), TITLE_BAR_HEIGHT)
}

/// Geometry reported by the window info syscall.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WindowInfo {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowInfo {
    /// Reported for unknown or stale handles.
    pub const INVALID: Self = Self {
        x: -1,
        y: -1,
        w: -1,
        h: -1,
    };

    #[inline]
    pub const fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Default for WindowInfo {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_fit_inside_title_bar() {
        let width = MIN_MINIMIZED_WIDTH;
        for button in DecorButton::ALL {
            let r = button.rect(width);
            assert!(r.x >= BORDER_WIDTH, "{:?} overlaps left border", button);
            assert!(r.right() <= width - BORDER_WIDTH);
            assert!(r.bottom() <= TITLE_BAR_HEIGHT);
        }
    }

    #[test]
    fn test_button_order_from_right() {
        let close = DecorButton::Close.rect(200);
        let max = DecorButton::Maximize.rect(200);
        let min = DecorButton::Minimize.rect(200);
        assert!(close.x > max.x && max.x > min.x);
        assert!(!close.intersects(&max));
        assert!(!max.intersects(&min));
    }

    #[test]
    fn test_button_at() {
        let close = DecorButton::Close.rect(200);
        assert_eq!(DecorButton::at(200, close.x, close.y), Some(DecorButton::Close));
        assert_eq!(DecorButton::at(200, 10, 10), None);
    }

    #[test]
    fn test_hittable_flags() {
        assert!(WindowFlags::VISIBLE.is_hittable());
        assert!(!(WindowFlags::VISIBLE | WindowFlags::MINIMIZED).is_hittable());
        assert!(!WindowFlags::empty().is_hittable());
    }
}
