//! Accumulated strokes, per brush color.

use crate::{image::Point, palette::BrushColor, stroke::StrokeRing};

/// All strokes drawn so far, grouped by color.
///
/// Each color owns an ordered list of strokes, oldest first. A freshly created or cleared canvas
/// has no strokes at all.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    strokes: [Vec<StrokeRing>; 4],
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `point` to the active (most recent) stroke of `color`, starting one if `color` has
    /// no strokes yet.
    pub fn push_point(&mut self, color: BrushColor, point: Point) {
        let strokes = &mut self.strokes[color.index()];
        match strokes.last_mut() {
            Some(stroke) => stroke.push(point),
            None => {
                let mut stroke = StrokeRing::new();
                stroke.push(point);
                strokes.push(stroke);
            }
        }
    }

    /// Closes the active stroke of `color`, so that the next point starts a new stroke.
    ///
    /// Does nothing if `color` has no strokes or its active stroke is still empty.
    pub fn end_stroke(&mut self, color: BrushColor) {
        let strokes = &mut self.strokes[color.index()];
        if strokes.last().map_or(false, |s| !s.is_empty()) {
            strokes.push(StrokeRing::new());
        }
    }

    /// Removes every stroke of every color.
    pub fn clear(&mut self) {
        self.strokes.iter_mut().for_each(Vec::clear);
    }

    /// Returns the strokes of `color`, oldest first.
    ///
    /// The last stroke may be empty if it was closed and no point was added since.
    pub fn strokes(&self, color: BrushColor) -> &[StrokeRing] {
        &self.strokes[color.index()]
    }

    /// Iterates over all colors together with their strokes.
    pub fn iter(&self) -> impl Iterator<Item = (BrushColor, &[StrokeRing])> + '_ {
        BrushColor::ALL
            .into_iter()
            .map(|color| (color, self.strokes(color)))
    }

    /// Returns whether no point has been drawn in any color.
    pub fn is_empty(&self) -> bool {
        self.strokes.iter().flatten().all(StrokeRing::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(canvas: &Canvas, color: BrushColor) -> Vec<Vec<(i32, i32)>> {
        canvas
            .strokes(color)
            .iter()
            .map(|s| s.iter().map(|p| (p.x, p.y)).collect())
            .collect()
    }

    #[test]
    fn first_point_starts_stroke() {
        let mut canvas = Canvas::new();
        assert!(canvas.is_empty());
        canvas.push_point(BrushColor::Red, Point::new(1, 2));
        canvas.push_point(BrushColor::Red, Point::new(3, 4));
        assert_eq!(collect(&canvas, BrushColor::Red), [vec![(1, 2), (3, 4)]]);
        assert!(canvas.strokes(BrushColor::Blue).is_empty());
        assert!(!canvas.is_empty());
    }

    #[test]
    fn end_stroke_separates() {
        let mut canvas = Canvas::new();
        canvas.push_point(BrushColor::Green, Point::new(1, 1));
        canvas.end_stroke(BrushColor::Green);
        canvas.end_stroke(BrushColor::Green);
        canvas.push_point(BrushColor::Green, Point::new(2, 2));
        assert_eq!(
            collect(&canvas, BrushColor::Green),
            [vec![(1, 1)], vec![(2, 2)]]
        );
    }

    #[test]
    fn end_stroke_without_strokes() {
        let mut canvas = Canvas::new();
        canvas.end_stroke(BrushColor::Yellow);
        assert!(canvas.strokes(BrushColor::Yellow).is_empty());
    }

    #[test]
    fn clear_removes_all_strokes() {
        let mut canvas = Canvas::new();
        for color in BrushColor::ALL {
            canvas.push_point(color, Point::new(5, 5));
            canvas.end_stroke(color);
        }
        canvas.clear();
        for (_, strokes) in canvas.iter() {
            assert!(strokes.is_empty());
        }
        assert!(canvas.is_empty());
    }
}
