//! Bounded point sequences.

use std::{iter, slice};

use crate::image::Point;

/// Number of points retained by each stroke.
pub const STROKE_CAPACITY: usize = 512;

/// A fixed-capacity sequence of pixel positions.
///
/// Once [`StrokeRing::capacity`] points have been pushed, every further push evicts the oldest
/// point.
#[derive(Debug, Clone)]
pub struct StrokeRing {
    buf: Vec<Point>,
    /// Index of the oldest point, once `buf` is full.
    head: usize,
    capacity: usize,
}

impl Default for StrokeRing {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeRing {
    /// Creates an empty ring holding up to [`STROKE_CAPACITY`] points.
    pub fn new() -> Self {
        Self::with_capacity(STROKE_CAPACITY)
    }

    /// Creates an empty ring holding up to `capacity` points.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "stroke capacity must be non-zero");
        Self {
            buf: Vec::new(),
            head: 0,
            capacity,
        }
    }

    /// Appends a point, dropping the oldest one if the ring is full.
    pub fn push(&mut self, point: Point) {
        if self.buf.len() < self.capacity {
            self.buf.push(point);
        } else {
            self.buf[self.head] = point;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the most recently pushed point.
    pub fn last(&self) -> Option<Point> {
        if self.buf.is_empty() {
            return None;
        }
        let idx = (self.head + self.buf.len() - 1) % self.buf.len();
        Some(self.buf[idx])
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.head = 0;
    }

    /// Iterates over the retained points, oldest first.
    pub fn iter(&self) -> Iter<'_> {
        let (newer, older) = self.buf.split_at(self.head);
        Iter(older.iter().chain(newer.iter()))
    }
}

impl<'a> IntoIterator for &'a StrokeRing {
    type Item = Point;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the points of a [`StrokeRing`].
pub struct Iter<'a>(iter::Chain<slice::Iter<'a, Point>, slice::Iter<'a, Point>>);

impl Iterator for Iter<'_> {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        self.0.next().copied()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}
