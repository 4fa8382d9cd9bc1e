//! Drives whole sessions with synthetic hands instead of a camera and a model.

use std::collections::VecDeque;

use air_canvas::{
    app::process_frame,
    config::FRAME_RESOLUTION,
    gesture::{classify, Gesture},
    hand::{HandLandmarks, LandmarkIdx, LandmarkSource, NUM_LANDMARKS},
    image::{Color, Image, Point},
    palette::BrushColor,
    session::{GestureState, Session},
    stroke::STROKE_CAPACITY,
};
use approx::assert_abs_diff_eq;

/// Fingertip and the joint whose height decides whether the finger is raised.
const FINGERS: [(LandmarkIdx, LandmarkIdx); 5] = [
    (LandmarkIdx::ThumbTip, LandmarkIdx::ThumbIp),
    (LandmarkIdx::IndexFingerTip, LandmarkIdx::IndexFingerPip),
    (LandmarkIdx::MiddleFingerTip, LandmarkIdx::MiddleFingerPip),
    (LandmarkIdx::RingFingerTip, LandmarkIdx::RingFingerPip),
    (LandmarkIdx::PinkyTip, LandmarkIdx::PinkyPip),
];

const THUMB: usize = 0;
const INDEX: usize = 1;
const MIDDLE: usize = 2;

/// Builds a hand with the index fingertip at pixel `anchor` and the given fingers raised.
fn hand(anchor: Point, raised: [bool; 5]) -> HandLandmarks {
    let (w, h) = (
        FRAME_RESOLUTION.width() as f32,
        FRAME_RESOLUTION.height() as f32,
    );
    let mut positions = [[0.5, 0.6, 0.0]; NUM_LANDMARKS];
    for (i, &(tip, joint)) in FINGERS.iter().enumerate() {
        let (x, y) = if i == INDEX {
            ((anchor.x as f32 + 0.5) / w, (anchor.y as f32 + 0.5) / h)
        } else {
            (0.2 + 0.15 * i as f32, 0.5)
        };
        let dy = if raised[i] { 0.04 } else { -0.04 };
        positions[tip as usize] = [x, y, 0.0];
        positions[joint as usize] = [x, y + dy, 0.0];
    }
    HandLandmarks::from_positions(&positions).unwrap()
}

fn draw_hand(x: i32, y: i32) -> HandLandmarks {
    hand(Point::new(x, y), [false, true, false, false, false])
}

fn select_hand(x: i32, y: i32) -> HandLandmarks {
    hand(Point::new(x, y), [false, true, true, false, false])
}

fn fist() -> HandLandmarks {
    hand(Point::new(320, 240), [false; 5])
}

/// Replays a fixed sequence of detections, one entry per frame.
struct Scripted(VecDeque<Vec<HandLandmarks>>);

impl Scripted {
    fn new<I: IntoIterator<Item = Option<HandLandmarks>>>(frames: I) -> Self {
        Self(
            frames
                .into_iter()
                .map(|hand| hand.into_iter().collect())
                .collect(),
        )
    }
}

impl LandmarkSource for Scripted {
    fn detect(&mut self, _image: &Image) -> anyhow::Result<Vec<HandLandmarks>> {
        Ok(self.0.pop_front().unwrap_or_default())
    }
}

fn blank_frame() -> Image {
    let mut image = Image::new(FRAME_RESOLUTION.width(), FRAME_RESOLUTION.height());
    image.clear(Color::BLACK);
    image
}

/// Runs every scripted frame through the full per-frame pipeline and returns the last frame.
fn run(session: &mut Session, source: &mut Scripted) -> Image {
    let mut frame = blank_frame();
    while !source.0.is_empty() {
        frame = blank_frame();
        process_frame(&mut frame, source, session).unwrap();
    }
    frame
}

fn strokes(session: &Session, color: BrushColor) -> Vec<Vec<Point>> {
    session
        .canvas()
        .strokes(color)
        .iter()
        .filter(|stroke| !stroke.is_empty())
        .map(|stroke| stroke.iter().collect())
        .collect()
}

#[test]
fn fixture_places_fingertip_at_pixel_center() {
    let hand = draw_hand(100, 300);
    let [x, y, _] = hand.position(LandmarkIdx::IndexFingerTip);
    assert_abs_diff_eq!(x * 640.0, 100.5, epsilon = 1e-3);
    assert_abs_diff_eq!(y * 480.0, 300.5, epsilon = 1e-3);
    assert_eq!(
        hand.to_pixels(LandmarkIdx::IndexFingerTip, FRAME_RESOLUTION),
        Some(Point::new(100, 300))
    );
}

#[test]
fn classification_ignores_the_thumb() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let anchor = Point::new(250, 200);
    for _ in 0..200 {
        let mut raised = [false; 5];
        for up in &mut raised {
            *up = rng.bool();
        }

        let expected = match raised {
            [_, true, false, false, false] => Gesture::Draw(anchor),
            [_, true, true, false, false] => Gesture::Select(anchor),
            _ => Gesture::None,
        };
        assert_eq!(
            classify(&hand(anchor, raised), FRAME_RESOLUTION),
            expected,
            "{raised:?}"
        );

        raised[THUMB] = !raised[THUMB];
        assert_eq!(
            classify(&hand(anchor, raised), FRAME_RESOLUTION),
            expected,
            "{raised:?}"
        );
    }
}

#[test]
fn middle_finger_alone_is_not_select() {
    let mut raised = [false; 5];
    raised[MIDDLE] = true;
    assert_eq!(
        classify(&hand(Point::new(10, 10), raised), FRAME_RESOLUTION),
        Gesture::None
    );
}

#[test]
fn uninterrupted_drawing_is_one_stroke() {
    let points = [(100, 300), (110, 305), (125, 310), (140, 320), (160, 330)];
    let mut source = Scripted::new(points.iter().map(|&(x, y)| Some(draw_hand(x, y))));
    let mut session = Session::new();
    run(&mut session, &mut source);

    assert_eq!(session.state(), GestureState::Drawing);
    assert_eq!(
        strokes(&session, BrushColor::Blue),
        [points.iter().map(|&p| Point::from(p)).collect::<Vec<_>>()]
    );
}

#[test]
fn long_strokes_keep_the_newest_points() {
    let n = STROKE_CAPACITY as i32 + 40;
    let mut session = Session::new();
    session.apply_all((0..n).map(|i| Gesture::Draw(Point::new(i % 640, i / 640))));

    let stroke = &strokes(&session, BrushColor::Blue)[0];
    assert_eq!(stroke.len(), STROKE_CAPACITY);
    assert_eq!(stroke[0], Point::new(40, 0));
    assert_eq!(stroke.last(), Some(&Point::new((n - 1) % 640, (n - 1) / 640)));
}

#[test]
fn losing_the_hand_splits_the_stroke() {
    let mut source = Scripted::new([
        Some(draw_hand(100, 300)),
        Some(draw_hand(120, 300)),
        None,
        Some(draw_hand(400, 350)),
    ]);
    let mut session = Session::new();
    let frame = run(&mut session, &mut source);

    assert_eq!(
        strokes(&session, BrushColor::Blue),
        [
            vec![Point::new(100, 300), Point::new(120, 300)],
            vec![Point::new(400, 350)],
        ]
    );
    // no line bridges the gap
    assert_eq!(frame.get(250, 325), Color::BLACK);
}

#[test]
fn fist_splits_the_stroke() {
    let mut session = Session::new();
    let mut source = Scripted::new([
        Some(draw_hand(100, 300)),
        Some(fist()),
        Some(draw_hand(200, 300)),
    ]);
    run(&mut session, &mut source);
    assert_eq!(strokes(&session, BrushColor::Blue).len(), 2);
}

#[test]
fn clear_button_empties_every_color() {
    let mut source = Scripted::new([
        Some(draw_hand(100, 300)),
        Some(draw_hand(150, 300)),
        Some(select_hand(300, 30)),
        Some(draw_hand(200, 200)),
        Some(draw_hand(220, 220)),
        Some(select_hand(100, 20)),
    ]);
    let mut session = Session::new();
    let frame = run(&mut session, &mut source);

    assert!(session.canvas().is_empty());
    for color in BrushColor::ALL {
        assert!(session.canvas().strokes(color).is_empty(), "{color}");
    }
    assert_eq!(frame.get(125, 300), Color::BLACK);
    assert_eq!(frame.get(210, 210), Color::BLACK);
}

#[test]
fn color_buttons_keep_existing_strokes() {
    let mut source = Scripted::new([
        Some(select_hand(200, 20)),
        Some(draw_hand(100, 300)),
        Some(draw_hand(200, 300)),
        Some(select_hand(430, 20)),
    ]);
    let mut session = Session::new();
    let frame = run(&mut session, &mut source);

    assert_eq!(session.current_color(), BrushColor::Red);
    assert_eq!(
        strokes(&session, BrushColor::Blue),
        [vec![Point::new(100, 300), Point::new(200, 300)]]
    );
    assert!(strokes(&session, BrushColor::Red).is_empty());
    assert_eq!(frame.get(150, 300), Color::BLUE);
}

#[test]
fn selecting_below_the_buttons_does_nothing() {
    let mut source = Scripted::new([
        Some(draw_hand(100, 300)),
        Some(draw_hand(110, 300)),
        Some(select_hand(300, 400)),
        Some(select_hand(450, 66)),
    ]);
    let mut session = Session::new();
    run(&mut session, &mut source);

    assert_eq!(session.current_color(), BrushColor::Blue);
    assert_eq!(
        strokes(&session, BrushColor::Blue),
        [vec![Point::new(100, 300), Point::new(110, 300)]]
    );
}

#[test]
fn malformed_hands_are_skipped() {
    let mut broken = draw_hand(300, 300).positions().to_vec();
    broken[LandmarkIdx::Wrist as usize] = [f32::NAN, 0.5, 0.0];
    let broken = HandLandmarks::from_positions(&broken).unwrap();
    assert!(HandLandmarks::from_positions(&[[0.5; 3]; 20]).is_none());

    let mut source = Scripted::new([
        Some(draw_hand(100, 300)),
        Some(broken),
        Some(draw_hand(200, 300)),
    ]);
    let mut session = Session::new();
    let frame = run(&mut session, &mut source);

    // a frame without a usable hand ends the stroke, and rendering still happens
    assert_eq!(
        strokes(&session, BrushColor::Blue),
        [vec![Point::new(100, 300)], vec![Point::new(200, 300)]]
    );
    assert_eq!(frame.get(250, 60), Color::BLUE);
}
