//! Damage-driven compositing into the backbuffer.

use alloc::vec::Vec;

use unios_abi::Rect;
use unios_abi::window::WindowFlags;
use unios_gfx::{SurfaceViewMut, blit_clipped, fill_rect_clipped};
use unios_lib::klog_trace;

use crate::display::{Buffers, FramebufferProvider};
use crate::manager::WindowManager;
use crate::tree::WindowTree;

impl<D: FramebufferProvider> WindowManager<D> {
    /// Redraw the pending damage and present it. Returns the region that
    /// was repainted, or `None` if nothing was pending.
    pub fn composite(&mut self) -> Option<Rect> {
        let dirty = self.damage.flush()?;
        {
            let Buffers { mut back, .. } = self.display.buffers();
            fill_rect_clipped(&mut back, dirty, self.config.desktop_color, dirty);
            draw_tree(&mut self.tree, &mut back, dirty);
        }
        self.cursor.present(&mut self.display, &[dirty]);
        klog_trace!(
            "wm: composed {},{} {}x{}",
            dirty.x,
            dirty.y,
            dirty.w,
            dirty.h
        );
        Some(dirty)
    }

    /// Move the cursor sprite on screen if the pointer moved since the last
    /// frame.
    pub fn render_cursor(&mut self) {
        self.cursor.render(&mut self.display);
    }
}

/// Draw shown windows back to front, parents before children. A child is
/// clipped to its parent; a hidden or minimized window hides its subtree.
fn draw_tree(tree: &mut WindowTree, back: &mut SurfaceViewMut<'_>, clip: Rect) {
    let mut stack: Vec<_> = Vec::new();
    stack.push((tree.root(), 0i32, 0i32, clip));
    while let Some((id, px, py, clip)) = stack.pop() {
        let Some(window) = tree.get_mut(id) else {
            continue;
        };
        if !window.is_shown() {
            continue;
        }
        window.flags.remove(WindowFlags::DIRTY);

        let x = px.saturating_add(window.rect.x);
        let y = py.saturating_add(window.rect.y);
        let area = Rect::new(x, y, window.rect.w, window.rect.h).intersect(&clip);
        if area.is_empty() {
            continue;
        }
        blit_clipped(back, x, y, &window.surface, None, area);
        for &child in window.children.iter().rev() {
            stack.push((child, x, y, area));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WmConfig;
    use crate::display::MemoryFramebuffer;
    use unios_abi::Color32;

    fn wm() -> WindowManager<MemoryFramebuffer> {
        let fb = MemoryFramebuffer::new(200, 150).unwrap();
        let config = WmConfig {
            cursor: false,
            ..WmConfig::default()
        };
        WindowManager::new(fb, config).unwrap()
    }

    #[test]
    fn test_first_pass_paints_desktop() {
        let mut wm = wm();
        assert_eq!(wm.composite(), Some(Rect::sized(200, 150)));
        assert!(
            wm.display()
                .front()
                .pixels()
                .iter()
                .all(|&p| p == Color32::DESKTOP.to_u32())
        );
        assert_eq!(wm.composite(), None);
    }

    #[test]
    fn test_only_damage_reaches_front() {
        let mut wm = wm();
        wm.composite();
        let id = wm.create(10, 10, 80, 60, "a", Color32::WHITE).unwrap();
        wm.surface_mut(id).unwrap().clear(Color32::BLACK);
        wm.invalidate(id, Rect::new(40, 30, 4, 4));
        let dirty = wm.composite().unwrap();
        // Creation damaged the whole window; the local rect lies inside it.
        assert_eq!(dirty, Rect::new(10, 10, 80, 60));
        assert_eq!(wm.display().front().pixel(50, 40), Some(Color32::BLACK));
        assert_eq!(wm.display().front().pixel(100, 100), Some(Color32::DESKTOP));
    }

    #[test]
    fn test_child_clipped_to_parent() {
        let mut wm = wm();
        let parent = wm.create(0, 0, 100, 100, "p", Color32::WHITE).unwrap();
        let child = wm
            .create_child(parent, 60, 60, 80, 80, "c", Color32::BLACK)
            .unwrap();
        wm.surface_mut(child).unwrap().clear(Color32::BLACK);
        wm.composite();
        let front = wm.display().front();
        assert_eq!(front.pixel(70, 70), Some(Color32::BLACK));
        assert_eq!(front.pixel(120, 120), Some(Color32::DESKTOP));
    }

    #[test]
    fn test_child_of_far_away_parent() {
        let mut wm = wm();
        let parent = wm.create(0, 0, 100, 100, "p", Color32::WHITE).unwrap();
        wm.create_child(parent, 60, 60, 20, 20, "c", Color32::BLACK)
            .unwrap();
        wm.composite();
        wm.move_to(parent, i32::MAX - 30, 0).unwrap();
        assert_eq!(wm.composite(), Some(Rect::new(0, 0, 100, 100)));
        assert_eq!(wm.display().front().pixel(70, 70), Some(Color32::DESKTOP));
    }

    #[test]
    fn test_minimized_subtree_skipped() {
        let mut wm = wm();
        let id = wm.create(20, 20, 100, 80, "m", Color32::WHITE).unwrap();
        wm.toggle_minimize(id).unwrap();
        wm.composite();
        assert_eq!(wm.display().front().pixel(30, 25), Some(Color32::DESKTOP));
        assert!(wm.window(id).unwrap().flags().contains(WindowFlags::DIRTY));
    }

    #[test]
    fn test_dirty_cleared_after_pass() {
        let mut wm = wm();
        let id = wm.create(20, 20, 100, 80, "d", Color32::WHITE).unwrap();
        assert!(wm.window(id).unwrap().flags().contains(WindowFlags::DIRTY));
        wm.composite();
        assert!(!wm.window(id).unwrap().flags().contains(WindowFlags::DIRTY));
    }
}
