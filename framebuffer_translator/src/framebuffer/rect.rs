/// Integer pixel rectangle
///
/// `width`/`height` may be negative: a rectangle built from corner pairs with
/// `x1 < x0` (or `y1 < y0`) is *reversed* along that axis, which is how blit
/// regions request a flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Clamp a corner computed in `i64` back into `i32`
fn narrow(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole `width` x `height` surface
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, narrow(width as i64), narrow(height as i64))
    }

    /// Rectangle from a corner pair; `x1 < x0` or `y1 < y0` gives a reversed rectangle
    ///
    /// Extents that do not fit an `i32` saturate; use
    /// [`checked_from_corners`](Self::checked_from_corners) to detect that.
    pub const fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Like [`from_corners`](Self::from_corners), `None` when an extent does not fit an `i32`
    pub fn checked_from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Self> {
        let rect = Self::new(x0, y0, x1.checked_sub(x0)?, y1.checked_sub(y0)?);
        rect.is_representable().then_some(rect)
    }

    /// Both corners and both normalized extents fit an `i32`
    pub const fn is_representable(&self) -> bool {
        self.x.checked_add(self.width).is_some()
            && self.y.checked_add(self.height).is_some()
            && self.width != i32::MIN
            && self.height != i32::MIN
    }

    /// End corner on X (exclusive, may be less than `x`, saturating)
    pub const fn x1(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// End corner on Y (exclusive, may be less than `y`, saturating)
    pub const fn y1(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub const fn is_reversed_x(&self) -> bool {
        self.width < 0
    }

    pub const fn is_reversed_y(&self) -> bool {
        self.height < 0
    }

    /// Normalized corners `(x0, y0, x1, y1)`, exact
    fn span(&self) -> (i64, i64, i64, i64) {
        let (x, y) = (self.x as i64, self.y as i64);
        let (x1, y1) = (x + self.width as i64, y + self.height as i64);
        (x.min(x1), y.min(y1), x.max(x1), y.max(y1))
    }

    /// Same area with non-negative extents, clamped to the `i32` range
    pub fn normalized(&self) -> Self {
        let (x0, y0, x1, y1) = self.span();
        let (x, y) = (narrow(x0), narrow(y0));
        Self { x, y, width: narrow(narrow(x1) as i64 - x as i64), height: narrow(narrow(y1) as i64 - y as i64) }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel count of the normalized area
    pub fn area(&self) -> usize {
        (self.width.unsigned_abs() as usize) * (self.height.unsigned_abs() as usize)
    }

    /// Overlap of the two normalized rectangles, `None` when empty
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let (ax0, ay0, ax1, ay1) = self.span();
        let (bx0, by0, bx1, by1) = other.span();
        let (x0, y0) = (ax0.max(bx0), ay0.max(by0));
        let (x1, y1) = (ax1.min(bx1), ay1.min(by1));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let rect = Rect::from_corners(narrow(x0), narrow(y0), narrow(x1), narrow(y1));
        (!rect.is_empty()).then_some(rect)
    }

    /// Whether `other` (normalized) lies entirely inside `self` (normalized)
    pub fn contains(&self, other: &Rect) -> bool {
        let (ax0, ay0, ax1, ay1) = self.span();
        let (bx0, by0, bx1, by1) = other.span();
        bx0 >= ax0 && by0 >= ay0 && bx1 <= ax1 && by1 <= ay1
    }
}

#[cfg(test)]
#[path = "rect_tests.rs"]
mod tests;
