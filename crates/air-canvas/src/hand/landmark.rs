//! Hand landmark sets.

use crate::image::{draw, Color, Image, Point, Resolution};

/// Number of landmarks in a [`HandLandmarks`] set.
pub const NUM_LANDMARKS: usize = 21;

/// The 21 landmarks of a detected hand.
///
/// Positions are normalized to the frame they were detected in: `x` and `y` are in `[0, 1]`, with
/// the origin in the top-left corner and Y pointing down. `z` is the relative depth and is not
/// used for classification.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    positions: [[f32; 3]; NUM_LANDMARKS],
    presence: f32,
}

impl HandLandmarks {
    pub fn new(positions: [[f32; 3]; NUM_LANDMARKS]) -> Self {
        Self {
            positions,
            presence: 1.0,
        }
    }

    /// Creates a landmark set from a slice of positions.
    ///
    /// Returns [`None`] if `positions` does not contain exactly [`NUM_LANDMARKS`] entries.
    pub fn from_positions(positions: &[[f32; 3]]) -> Option<Self> {
        let positions = <[[f32; 3]; NUM_LANDMARKS]>::try_from(positions).ok()?;
        Some(Self::new(positions))
    }

    pub fn with_presence(mut self, presence: f32) -> Self {
        self.presence = presence;
        self
    }

    /// Returns the confidence that the landmarks belong to a hand.
    #[inline]
    pub fn presence(&self) -> f32 {
        self.presence
    }

    #[inline]
    pub fn positions(&self) -> &[[f32; 3]; NUM_LANDMARKS] {
        &self.positions
    }

    #[inline]
    pub fn position(&self, idx: LandmarkIdx) -> [f32; 3] {
        self.positions[idx as usize]
    }

    /// Returns whether every `x` and `y` coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.positions
            .iter()
            .all(|[x, y, _]| x.is_finite() && y.is_finite())
    }

    /// Scales the position of a landmark to pixel coordinates in an image of size `res`.
    ///
    /// Fractional pixel coordinates are truncated towards zero. Returns [`None`] if the landmark
    /// position is not finite.
    pub fn to_pixels(&self, idx: LandmarkIdx, res: Resolution) -> Option<Point> {
        let [x, y, _] = self.position(idx);
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Point::new(
            (x * res.width() as f32) as i32,
            (y * res.height() as f32) as i32,
        ))
    }

    /// Draws the hand skeleton onto `image`.
    pub fn draw(&self, image: &mut Image) {
        let res = image.resolution();
        for &(a, b) in CONNECTIVITY {
            if let (Some(a), Some(b)) = (self.to_pixels(a, res), self.to_pixels(b, res)) {
                draw::line(image, a.x, a.y, b.x, b.y)
                    .color(CONNECTION_COLOR)
                    .stroke_width(2);
            }
        }
        for idx in LandmarkIdx::ALL {
            if let Some(p) = self.to_pixels(idx, res) {
                draw::marker(image, p.x, p.y);
            }
        }
    }
}

const CONNECTION_COLOR: Color = Color::from_rgb8(224, 224, 224);

/// Names for the hand pose landmarks.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **IP**: Interphalangeal joint of the thumb.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkIdx {
    /// All landmarks, in model output order.
    pub const ALL: [Self; NUM_LANDMARKS] = {
        use LandmarkIdx::*;
        [
            Wrist,
            ThumbCmc,
            ThumbMcp,
            ThumbIp,
            ThumbTip,
            IndexFingerMcp,
            IndexFingerPip,
            IndexFingerDip,
            IndexFingerTip,
            MiddleFingerMcp,
            MiddleFingerPip,
            MiddleFingerDip,
            MiddleFingerTip,
            RingFingerMcp,
            RingFingerPip,
            RingFingerDip,
            RingFingerTip,
            PinkyMcp,
            PinkyPip,
            PinkyDip,
            PinkyTip,
        ]
    };
}

const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Palm:
        (Wrist, ThumbCmc),
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (PinkyMcp, Wrist),
        // Thumb:
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index:
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle:
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring:
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky:
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_indices() {
        assert_eq!(LandmarkIdx::ThumbIp as usize, 3);
        assert_eq!(LandmarkIdx::ThumbTip as usize, 4);
        assert_eq!(LandmarkIdx::IndexFingerPip as usize, 6);
        assert_eq!(LandmarkIdx::IndexFingerTip as usize, 8);
        assert_eq!(LandmarkIdx::MiddleFingerPip as usize, 10);
        assert_eq!(LandmarkIdx::MiddleFingerTip as usize, 12);
        assert_eq!(LandmarkIdx::RingFingerPip as usize, 14);
        assert_eq!(LandmarkIdx::RingFingerTip as usize, 16);
        assert_eq!(LandmarkIdx::PinkyPip as usize, 18);
        assert_eq!(LandmarkIdx::PinkyTip as usize, 20);
        for (i, idx) in LandmarkIdx::ALL.iter().enumerate() {
            assert_eq!(*idx as usize, i);
        }
    }

    #[test]
    fn wrong_landmark_count() {
        assert!(HandLandmarks::from_positions(&[[0.5; 3]; 20]).is_none());
        assert!(HandLandmarks::from_positions(&[[0.5; 3]; 22]).is_none());
        assert!(HandLandmarks::from_positions(&[[0.5; 3]; 21]).is_some());
    }

    #[test]
    fn pixel_scaling() {
        let mut positions = [[0.0; 3]; NUM_LANDMARKS];
        positions[8] = [0.5, 0.25, 0.0];
        positions[4] = [0.999, 0.999, 0.0];
        let hand = HandLandmarks::new(positions);
        let res = Resolution::RES_VGA;
        assert_eq!(
            hand.to_pixels(LandmarkIdx::IndexFingerTip, res),
            Some(Point::new(320, 120))
        );
        assert_eq!(
            hand.to_pixels(LandmarkIdx::ThumbTip, res),
            Some(Point::new(639, 479))
        );
    }

    #[test]
    fn non_finite() {
        let mut positions = [[0.5; 3]; NUM_LANDMARKS];
        positions[8][1] = f32::NAN;
        let hand = HandLandmarks::new(positions);
        assert!(!hand.is_finite());
        assert_eq!(
            hand.to_pixels(LandmarkIdx::IndexFingerTip, Resolution::RES_VGA),
            None
        );

        // only x and y matter
        let mut positions = [[0.5; 3]; NUM_LANDMARKS];
        positions[0][2] = f32::INFINITY;
        assert!(HandLandmarks::new(positions).is_finite());
    }

    #[test]
    fn draw_skeleton() {
        let mut positions = [[0.5; 3]; NUM_LANDMARKS];
        positions[0] = [0.1, 0.9, 0.0];
        let mut image = Image::new(100, 100);
        HandLandmarks::new(positions).draw(&mut image);
        assert_eq!(image.get(50, 50), Color::RED);
        assert_ne!(image.get(30, 70), Color::NULL);
    }
}
