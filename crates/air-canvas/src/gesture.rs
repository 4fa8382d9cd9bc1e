//! Gesture classification.

use crate::{
    hand::{HandLandmarks, LandmarkIdx},
    image::{Point, Resolution},
};

/// A classified hand pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    /// No recognized pose, or no hand in view.
    #[default]
    None,
    /// Only the index finger is raised. Contains the index fingertip position in pixels.
    Draw(Point),
    /// Index and middle finger are raised. Contains the index fingertip position in pixels.
    Select(Point),
}

impl Gesture {
    /// Returns the cursor position of a [`Gesture::Draw`] or [`Gesture::Select`].
    pub fn position(&self) -> Option<Point> {
        match *self {
            Gesture::None => None,
            Gesture::Draw(p) | Gesture::Select(p) => Some(p),
        }
    }
}

/// Which fingers of a hand are raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fingers {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl Fingers {
    /// Determines the raised fingers of `hand`.
    ///
    /// A finger is up when its tip is higher in the image (has a smaller `y` coordinate) than the
    /// joint below it. Comparisons involving non-finite coordinates count as "down".
    pub fn of(hand: &HandLandmarks) -> Self {
        use LandmarkIdx::*;

        let up =
            |tip: LandmarkIdx, joint: LandmarkIdx| hand.position(tip)[1] < hand.position(joint)[1];
        Self {
            thumb: up(ThumbTip, ThumbIp),
            index: up(IndexFingerTip, IndexFingerPip),
            middle: up(MiddleFingerTip, MiddleFingerPip),
            ring: up(RingFingerTip, RingFingerPip),
            pinky: up(PinkyTip, PinkyPip),
        }
    }
}

/// Classifies the pose of `hand` in a frame of size `res`.
///
/// The thumb is not taken into account.
pub fn classify(hand: &HandLandmarks, res: Resolution) -> Gesture {
    let fingers = Fingers::of(hand);
    let Some(anchor) = hand.to_pixels(LandmarkIdx::IndexFingerTip, res) else {
        return Gesture::None;
    };

    match fingers {
        Fingers {
            index: true,
            middle: false,
            ring: false,
            pinky: false,
            ..
        } => Gesture::Draw(anchor),
        Fingers {
            index: true,
            middle: true,
            ring: false,
            pinky: false,
            ..
        } => Gesture::Select(anchor),
        _ => Gesture::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::HandBuilder;

    #[test]
    fn fingers() {
        let hand = HandBuilder::new().raise(LandmarkIdx::IndexFingerTip).build();
        assert_eq!(
            Fingers::of(&hand),
            Fingers {
                index: true,
                ..Fingers::default()
            }
        );

        let hand = HandBuilder::new()
            .raise(LandmarkIdx::ThumbTip)
            .raise(LandmarkIdx::PinkyTip)
            .build();
        assert_eq!(
            Fingers::of(&hand),
            Fingers {
                thumb: true,
                pinky: true,
                ..Fingers::default()
            }
        );
    }

    #[test]
    fn draw_and_select() {
        let builder = HandBuilder::new()
            .anchor(Point::new(320, 240))
            .raise(LandmarkIdx::IndexFingerTip);
        assert_eq!(
            classify(&builder.clone().build(), Resolution::RES_VGA),
            Gesture::Draw(Point::new(320, 240))
        );
        assert_eq!(
            classify(
                &builder.raise(LandmarkIdx::MiddleFingerTip).build(),
                Resolution::RES_VGA
            ),
            Gesture::Select(Point::new(320, 240))
        );
    }

    #[test]
    fn other_poses() {
        use LandmarkIdx::*;

        let poses: &[&[LandmarkIdx]] = &[
            &[],
            &[MiddleFingerTip],
            &[IndexFingerTip, RingFingerTip],
            &[IndexFingerTip, MiddleFingerTip, RingFingerTip],
            &[IndexFingerTip, MiddleFingerTip, RingFingerTip, PinkyTip],
            &[IndexFingerTip, PinkyTip],
        ];
        for raised in poses {
            let hand = raised
                .iter()
                .fold(HandBuilder::new(), |b, &tip| b.raise(tip))
                .build();
            assert_eq!(classify(&hand, Resolution::RES_VGA), Gesture::None, "{raised:?}");
        }
    }

    #[test]
    fn thumb_is_ignored() {
        let hand = HandBuilder::new()
            .raise(LandmarkIdx::ThumbTip)
            .raise(LandmarkIdx::IndexFingerTip)
            .build();
        assert!(matches!(
            classify(&hand, Resolution::RES_VGA),
            Gesture::Draw(_)
        ));
    }

    #[test]
    fn level_tip_is_down() {
        // tip and joint at the same height
        let hand = HandBuilder::new().raise(LandmarkIdx::IndexFingerTip).build();
        let mut positions = *hand.positions();
        positions[LandmarkIdx::IndexFingerPip as usize][1] =
            positions[LandmarkIdx::IndexFingerTip as usize][1];
        let hand = HandLandmarks::new(positions);
        assert_eq!(classify(&hand, Resolution::RES_VGA), Gesture::None);
    }

    #[test]
    fn nan_finger_is_down() {
        let hand = HandBuilder::new()
            .raise(LandmarkIdx::IndexFingerTip)
            .raise(LandmarkIdx::MiddleFingerTip)
            .set_y(LandmarkIdx::MiddleFingerTip, f32::NAN)
            .build();
        assert!(matches!(
            classify(&hand, Resolution::RES_VGA),
            Gesture::Draw(_)
        ));

        let hand = HandBuilder::new()
            .raise(LandmarkIdx::IndexFingerTip)
            .set_y(LandmarkIdx::IndexFingerTip, f32::NAN)
            .build();
        assert_eq!(classify(&hand, Resolution::RES_VGA), Gesture::None);
    }

    #[test]
    fn gesture_position() {
        assert_eq!(Gesture::None.position(), None);
        assert_eq!(
            Gesture::Select(Point::new(1, 2)).position(),
            Some(Point::new(1, 2))
        );
    }
}
