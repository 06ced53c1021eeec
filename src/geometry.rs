//! Screen-space geometry for the overlay.
//!
//! All coordinates are CSS-pixel style: origin at the viewport's top-left,
//! y grows downward.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Same size, new origin.
    pub fn moved_to(&self, origin: Point) -> Rect {
        Rect::new(origin.x, origin.y, self.width, self.height)
    }
}

/// Clamp `pos` so that a span of `len` starting there stays within
/// `[margin, extent - margin]`. When the span cannot fit, it is pinned to
/// the leading margin (or 0 if even that does not fit).
fn clamp_axis(pos: f32, len: f32, extent: f32, margin: f32) -> f32 {
    let lo = margin.min(extent).max(0.0);
    let hi = (extent - len - margin).max(lo);
    pos.clamp(lo, hi)
}

/// Panel size for a viewport: `fraction` of each dimension, but never
/// closer than `margin` to both edges.
pub fn panel_size(viewport: Size, fraction: f32, margin: f32) -> Size {
    let fit = |extent: f32| (extent * fraction).min(extent - 2.0 * margin).max(0.0);
    Size::new(fit(viewport.width), fit(viewport.height))
}

/// Panel rectangle centered on `anchor`'s center, clamped to stay fully
/// inside the viewport with `margin` on every side.
pub fn place_panel(anchor: Rect, viewport: Size, fraction: f32, margin: f32) -> Rect {
    let size = panel_size(viewport, fraction, margin);
    let c = anchor.center();
    let x = clamp_axis(c.x - size.width * 0.5, size.width, viewport.width, margin);
    let y = clamp_axis(c.y - size.height * 0.5, size.height, viewport.height, margin);
    Rect::new(x, y, size.width, size.height)
}

/// Hint position just below the link, flipped above it when it would
/// overflow the bottom edge.
pub fn place_hint(anchor: Rect, hint: Size, viewport: Size, offset: f32, margin: f32) -> Point {
    let below = anchor.bottom() + offset;
    let y = if below + hint.height > viewport.height - margin {
        anchor.y - offset - hint.height
    } else {
        below
    };
    Point::new(
        clamp_axis(anchor.x, hint.width, viewport.width, margin),
        clamp_axis(y, hint.height, viewport.height, margin),
    )
}
