use std::fmt;

/// An axis-aligned rectangle with floating-point coordinates.
///
/// Used for regions of interest that are not aligned to the pixel grid.
#[derive(Clone, Copy, PartialEq)]
pub struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Rect {
    /// Creates a rectangle extending right and down from `(x, y)`.
    pub fn from_top_left(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            w: width,
            h: height,
        }
    }

    /// Creates a rectangle centered on `(x, y)`.
    pub fn from_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_top_left(x - width / 2.0, y - height / 2.0, width, height)
    }

    /// Computes the smallest rectangle containing all `points`.
    ///
    /// Returns [`None`] if `points` is empty.
    pub fn bounding<I: IntoIterator<Item = [f32; 2]>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let [x, y] = iter.next()?;
        let (mut min, mut max) = ([x, y], [x, y]);
        for [x, y] in iter {
            min = [min[0].min(x), min[1].min(y)];
            max = [max[0].max(x), max[1].max(y)];
        }
        Some(Self::from_top_left(
            min[0],
            min[1],
            max[0] - min[0],
            max[1] - min[1],
        ))
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.w
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.h
    }

    #[inline]
    pub fn center(&self) -> [f32; 2] {
        [self.x + self.w / 2.0, self.y + self.h / 2.0]
    }

    /// Grows the rectangle's width and height by a factor, keeping its center in place.
    ///
    /// A `factor` of 0.5 grows each side by 50%.
    pub fn grow_rel(&self, factor: f32) -> Self {
        let [cx, cy] = self.center();
        Self::from_center(
            cx,
            cy,
            self.w * (1.0 + factor),
            self.h * (1.0 + factor),
        )
    }

    /// Extends the shorter side of the rectangle so that it becomes a square with the same
    /// center.
    pub fn grow_to_square(&self) -> Self {
        let [cx, cy] = self.center();
        let side = self.w.max(self.h);
        Self::from_center(cx, cy, side, side)
    }

    /// Maps a point given relative to this rectangle (`[0, 1]` on both axes) to absolute
    /// coordinates.
    #[inline]
    pub fn transform_out(&self, u: f32, v: f32) -> [f32; 2] {
        [self.x + u * self.w, self.y + v * self.h]
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect @ ({}, {}) {}x{}",
            self.x, self.y, self.w, self.h
        )
    }
}
