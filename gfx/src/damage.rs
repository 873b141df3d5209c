use unios_abi::Rect;

/// Screen damage accumulated between two compositor passes.
///
/// Damage is kept as one bounding rectangle rather than a list: merging is
/// O(1) and a pass repaints a single region, at the cost of repainting
/// clean pixels between two distant updates.
#[derive(Clone, Debug)]
pub struct DamageTracker {
    screen: Rect,
    pending: Option<Rect>,
}

impl DamageTracker {
    pub const fn new(screen: Rect) -> Self {
        Self {
            screen,
            pending: None,
        }
    }

    #[inline]
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Record `rect` (screen coordinates). Parts outside the screen are
    /// dropped; a rect that clips away entirely is ignored.
    pub fn add(&mut self, rect: Rect) {
        let rect = rect.intersect(&self.screen);
        if rect.is_empty() {
            return;
        }
        self.pending = Some(match self.pending {
            Some(current) => current.union(&rect),
            None => rect,
        });
    }

    /// Record `local`, given relative to a window whose top-left corner is
    /// at `(origin_x, origin_y)` on screen.
    #[inline]
    pub fn add_local(&mut self, origin_x: i32, origin_y: i32, local: Rect) {
        self.add(local.translate(origin_x, origin_y));
    }

    /// Damage the whole screen.
    #[inline]
    pub fn add_screen(&mut self) {
        self.add(self.screen);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn peek(&self) -> Option<Rect> {
        self.pending
    }

    /// Take the accumulated rect, leaving the tracker clean.
    #[inline]
    pub fn flush(&mut self) -> Option<Rect> {
        self.pending.take()
    }
}
