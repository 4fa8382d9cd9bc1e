//! Brush colors and the button row at the top of the frame.

use std::fmt;

use crate::image::{Color, Point, Rect};

/// One of the colors strokes can be drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BrushColor {
    #[default]
    Blue,
    Green,
    Red,
    Yellow,
}

impl BrushColor {
    /// All brush colors, in button order.
    pub const ALL: [Self; 4] = [Self::Blue, Self::Green, Self::Red, Self::Yellow];

    pub fn rgb(&self) -> Color {
        match self {
            Self::Blue => Color::BLUE,
            Self::Green => Color::GREEN,
            Self::Red => Color::RED,
            Self::Yellow => Color::YELLOW,
        }
    }

    /// The upper-case display name of this color.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blue => "BLUE",
            Self::Green => "GREEN",
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
        }
    }

    /// Position of this color in [`BrushColor::ALL`].
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for BrushColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happens when the select cursor hovers over a [`Button`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteAction {
    /// Removes all strokes of all colors.
    Clear,
    /// Makes a color the current brush color.
    SetColor(BrushColor),
}

/// Fill color of the clear button.
pub const CLEAR_BUTTON_COLOR: Color = Color::from_rgb8(122, 122, 122);

/// The lowest row (inclusive) covered by the buttons.
pub const BUTTON_ROW_BOTTOM: i32 = 65;

/// A screen rectangle that triggers a [`PaletteAction`].
///
/// Bounds are inclusive on all sides. `top` only affects drawing: any position at or above
/// `bottom` within the horizontal range hits the button, including positions above the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub action: PaletteAction,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    /// Anchor of the button's label, on the text baseline.
    pub label_pos: Point,
}

impl Button {
    const fn new(action: PaletteAction, left: i32, right: i32, label_pos: Point) -> Self {
        Self {
            action,
            left,
            top: 1,
            right,
            bottom: BUTTON_ROW_BOTTOM,
            label_pos,
        }
    }

    /// Returns whether a select cursor at `p` triggers this button.
    #[inline]
    pub fn is_hit(&self, p: Point) -> bool {
        (self.left..=self.right).contains(&p.x) && p.y <= self.bottom
    }

    /// Returns the color the button is filled with.
    pub fn fill(&self) -> Color {
        match self.action {
            PaletteAction::Clear => CLEAR_BUTTON_COLOR,
            PaletteAction::SetColor(color) => color.rgb(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self.action {
            PaletteAction::Clear => "CLEAR",
            PaletteAction::SetColor(color) => color.name(),
        }
    }

    /// Returns the pixel area covered by the button.
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(
            self.left as f32,
            self.top as f32,
            (self.right - self.left + 1) as f32,
            (self.bottom - self.top + 1) as f32,
        )
    }
}

/// The button row, laid out for a 640x480 frame.
pub const BUTTONS: [Button; 5] = [
    Button::new(PaletteAction::Clear, 40, 140, Point::new(49, 33)),
    Button::new(
        PaletteAction::SetColor(BrushColor::Blue),
        160,
        255,
        Point::new(185, 33),
    ),
    Button::new(
        PaletteAction::SetColor(BrushColor::Green),
        275,
        370,
        Point::new(298, 33),
    ),
    Button::new(
        PaletteAction::SetColor(BrushColor::Red),
        390,
        485,
        Point::new(420, 33),
    ),
    Button::new(
        PaletteAction::SetColor(BrushColor::Yellow),
        505,
        600,
        Point::new(520, 33),
    ),
];

/// Returns the action of the button under `p`, if any.
///
/// Positions below the button row, or in the gaps between buttons, hit nothing.
pub fn hit_test(p: Point) -> Option<PaletteAction> {
    BUTTONS.iter().find(|b| b.is_hit(p)).map(|b| b.action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_hits() {
        assert_eq!(hit_test(Point::new(100, 20)), Some(PaletteAction::Clear));
        assert_eq!(
            hit_test(Point::new(200, 20)),
            Some(PaletteAction::SetColor(BrushColor::Blue))
        );
        assert_eq!(
            hit_test(Point::new(300, 20)),
            Some(PaletteAction::SetColor(BrushColor::Green))
        );
        assert_eq!(
            hit_test(Point::new(430, 20)),
            Some(PaletteAction::SetColor(BrushColor::Red))
        );
        assert_eq!(
            hit_test(Point::new(550, 20)),
            Some(PaletteAction::SetColor(BrushColor::Yellow))
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(hit_test(Point::new(40, 1)), Some(PaletteAction::Clear));
        assert_eq!(hit_test(Point::new(140, 65)), Some(PaletteAction::Clear));
        assert_eq!(hit_test(Point::new(39, 20)), None);
        assert_eq!(hit_test(Point::new(141, 20)), None);
        assert_eq!(hit_test(Point::new(100, 66)), None);
    }

    #[test]
    fn top_edge_and_above_hit() {
        assert_eq!(hit_test(Point::new(100, 0)), Some(PaletteAction::Clear));
        assert_eq!(
            hit_test(Point::new(430, -12)),
            Some(PaletteAction::SetColor(BrushColor::Red))
        );
        assert_eq!(hit_test(Point::new(150, 0)), None);
    }

    #[test]
    fn misses() {
        // below the row
        assert_eq!(hit_test(Point::new(300, 400)), None);
        // gaps
        for x in [0, 150, 265, 380, 495, 620] {
            assert_eq!(hit_test(Point::new(x, 20)), None, "x={x}");
        }
        assert_eq!(hit_test(Point::new(-5, -5)), None);
    }

    #[test]
    fn colors() {
        assert_eq!(BrushColor::default(), BrushColor::Blue);
        assert_eq!(BrushColor::Yellow.rgb(), Color::from_rgb8(255, 255, 0));
        assert_eq!(BrushColor::Red.to_string(), "RED");
        for (i, color) in BrushColor::ALL.iter().enumerate() {
            assert_eq!(color.index(), i);
        }
        assert_eq!(BUTTONS[0].fill(), CLEAR_BUTTON_COLOR);
        assert_eq!(BUTTONS[4].label(), "YELLOW");
        assert_eq!(BUTTONS[1].rect().width(), 96.0);
    }
}
