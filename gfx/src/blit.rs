//! Rectangle fill and surface-to-surface copies.
//!
//! Every operation clips against both surfaces and an optional clip rect,
//! then works row by row on slices. Degenerate input is silently ignored.

use unios_abi::{Color32, Rect};

use crate::surface::Surface;

/// A copy already clipped on all sides: source origin, destination origin,
/// extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Span {
    sx: i32,
    sy: i32,
    dx: i32,
    dy: i32,
    w: i32,
    h: i32,
}

fn clip_span(dx: i32, dy: i32, src_bounds: Rect, src_rect: Rect, clip: Rect) -> Option<Span> {
    let src = src_rect.intersect(&src_bounds);
    if src.is_empty() {
        return None;
    }
    // Where the surviving source rect lands.
    let land_x = dx.saturating_add(src.x - src_rect.x);
    let land_y = dy.saturating_add(src.y - src_rect.y);
    let dst = Rect::new(land_x, land_y, src.w, src.h).intersect(&clip);
    if dst.is_empty() {
        return None;
    }
    Some(Span {
        sx: src.x + (dst.x - land_x),
        sy: src.y + (dst.y - land_y),
        dx: dst.x,
        dy: dst.y,
        w: dst.w,
        h: dst.h,
    })
}

pub fn fill_rect<B>(dst: &mut Surface<B>, rect: Rect, color: Color32)
where
    B: AsRef<[u32]> + AsMut<[u32]>,
{
    let clip = dst.bounds();
    fill_rect_clipped(dst, rect, color, clip);
}

/// Fill `rect` restricted to `clip` (and the surface).
pub fn fill_rect_clipped<B>(dst: &mut Surface<B>, rect: Rect, color: Color32, clip: Rect)
where
    B: AsRef<[u32]> + AsMut<[u32]>,
{
    let area = rect.intersect(&clip).intersect(&dst.bounds());
    if area.is_empty() {
        return;
    }
    let raw = color.to_u32();
    for row in area.y..area.bottom() {
        dst.span_mut(area.x as usize, row as usize, area.w as usize)
            .fill(raw);
    }
}

/// Opaque copy of `src_rect` (all of `src` when `None`) to `(dx, dy)`.
pub fn blit<D, S>(dst: &mut Surface<D>, dx: i32, dy: i32, src: &Surface<S>, src_rect: Option<Rect>)
where
    D: AsRef<[u32]> + AsMut<[u32]>,
    S: AsRef<[u32]>,
{
    let clip = dst.bounds();
    blit_clipped(dst, dx, dy, src, src_rect, clip);
}

pub fn blit_clipped<D, S>(
    dst: &mut Surface<D>,
    dx: i32,
    dy: i32,
    src: &Surface<S>,
    src_rect: Option<Rect>,
    clip: Rect,
) where
    D: AsRef<[u32]> + AsMut<[u32]>,
    S: AsRef<[u32]>,
{
    let src_rect = src_rect.unwrap_or(src.bounds());
    let clip = clip.intersect(&dst.bounds());
    let Some(span) = clip_span(dx, dy, src.bounds(), src_rect, clip) else {
        return;
    };
    let w = span.w as usize;
    for row in 0..span.h {
        let from = src.span(span.sx as usize, (span.sy + row) as usize, w);
        dst.span_mut(span.dx as usize, (span.dy + row) as usize, w)
            .copy_from_slice(from);
    }
}

/// Copy all of `src` to `(dx, dy)`, skipping pixels whose alpha byte is
/// zero. Anything else is written as-is.
pub fn blit_alpha<D, S>(dst: &mut Surface<D>, dx: i32, dy: i32, src: &Surface<S>)
where
    D: AsRef<[u32]> + AsMut<[u32]>,
    S: AsRef<[u32]>,
{
    let clip = dst.bounds();
    let Some(span) = clip_span(dx, dy, src.bounds(), src.bounds(), clip) else {
        return;
    };
    let w = span.w as usize;
    for row in 0..span.h {
        let from = src.span(span.sx as usize, (span.sy + row) as usize, w);
        let to = dst.span_mut(span.dx as usize, (span.dy + row) as usize, w);
        for (d, &s) in to.iter_mut().zip(from) {
            if !Color32(s).is_clear() {
                *d = s;
            }
        }
    }
}
