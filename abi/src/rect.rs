/// An axis-aligned rectangle: origin plus extent.
///
/// A rect with a non-positive width or height is empty. Edges are computed
/// with saturating arithmetic so hostile coordinates from userland never wrap.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A rect at the origin, e.g. the full extent of a surface.
    #[inline]
    pub const fn sized(w: i32, h: i32) -> Self {
        Self::new(0, 0, w, h)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    #[inline]
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.w as i64 * self.h as i64
        }
    }

    #[inline]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// True if `other` lies entirely inside `self`. Empty rects are
    /// contained everywhere.
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    #[inline]
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.w, self.h)
    }

    /// Overlap of two rects, or [`Rect::EMPTY`] when they do not overlap.
    pub fn intersect(&self, other: &Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x0 >= x1 || y0 >= y1 {
            return Self::EMPTY;
        }
        Self::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Bounding box of both rects. An empty operand is ignored.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Self::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Clip to `[0, width) x [0, height)`.
    #[inline]
    pub fn clip(&self, width: i32, height: i32) -> Self {
        self.intersect(&Self::sized(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(a.intersect(&b).is_empty());
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_intersect_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, -5, 10, 10);
        assert_eq!(a.intersect(&b), Rect::new(5, 0, 5, 5));
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = Rect::new(3, 4, 5, 6);
        assert_eq!(a.union(&Rect::EMPTY), a);
        assert_eq!(Rect::new(100, 100, 0, 7).union(&a), a);
    }

    #[test]
    fn test_union_is_bounding_box() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(50, 20, 5, 5);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0, 0, 55, 25));
        assert!(u.contains_rect(&a));
        assert!(u.contains_rect(&b));
    }

    #[test]
    fn test_clip_negative_origin() {
        let r = Rect::new(-20, -20, 30, 30);
        assert_eq!(r.clip(100, 100), Rect::new(0, 0, 10, 10));
        assert!(Rect::new(-50, 0, 10, 10).clip(100, 100).is_empty());
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 10));
        assert!(!r.contains(10, 15));
    }

    #[test]
    fn test_edges_saturate() {
        let r = Rect::new(i32::MAX - 1, 0, 100, 1);
        assert_eq!(r.right(), i32::MAX);
        assert_eq!(r.translate(10, 0).x, i32::MAX);
    }
}
