//! Per-frame gesture interpretation.

use crate::{
    canvas::Canvas,
    gesture::{self, Gesture},
    hand::HandLandmarks,
    image::Resolution,
    palette::{self, BrushColor, PaletteAction},
};

/// Gesture tracking state carried from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Drawing,
    Selecting,
}

impl GestureState {
    fn of(gesture: Gesture) -> Self {
        match gesture {
            Gesture::None => Self::Idle,
            Gesture::Draw(_) => Self::Drawing,
            Gesture::Select(_) => Self::Selecting,
        }
    }
}

/// All state of a drawing session: the canvas, the current brush color, and the gesture state.
///
/// A session is created once at startup and updated with every processed frame.
#[derive(Debug, Default)]
pub struct Session {
    canvas: Canvas,
    color: BrushColor,
    state: GestureState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    #[inline]
    pub fn current_color(&self) -> BrushColor {
        self.color
    }

    #[inline]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Classifies the hands found in a frame and applies the resulting gestures.
    ///
    /// Landmark sets with non-finite coordinates are skipped. A frame without any usable hand
    /// counts as [`Gesture::None`]. Returns the gestures that were applied, in `hands` order.
    pub fn process_frame(&mut self, hands: &[HandLandmarks], res: Resolution) -> Vec<Gesture> {
        let mut gestures = Vec::with_capacity(hands.len());
        for hand in hands {
            if !hand.is_finite() {
                log::warn!("skipping hand with non-finite landmark coordinates");
                continue;
            }
            let gesture = gesture::classify(hand, res);
            self.apply(gesture);
            gestures.push(gesture);
        }
        if gestures.is_empty() {
            self.apply(Gesture::None);
        }
        gestures
    }

    /// Applies a sequence of gestures, one per frame.
    pub fn apply_all<I: IntoIterator<Item = Gesture>>(&mut self, gestures: I) {
        for gesture in gestures {
            self.apply(gesture);
        }
    }

    /// Applies a single classified gesture.
    pub fn apply(&mut self, gesture: Gesture) {
        let next = GestureState::of(gesture);
        if self.state != next {
            log::debug!("{:?} -> {:?}", self.state, next);
            if self.state == GestureState::Drawing {
                self.canvas.end_stroke(self.color);
            }
            self.state = next;
        }

        match gesture {
            Gesture::None => {}
            Gesture::Draw(p) => self.canvas.push_point(self.color, p),
            Gesture::Select(p) => match palette::hit_test(p) {
                Some(PaletteAction::Clear) => {
                    if !self.canvas.is_empty() {
                        log::debug!("clearing canvas");
                    }
                    self.canvas.clear();
                }
                Some(PaletteAction::SetColor(color)) => {
                    if color != self.color {
                        log::debug!("brush color: {color}");
                        self.color = color;
                    }
                }
                None => {}
            },
        }
    }
}
