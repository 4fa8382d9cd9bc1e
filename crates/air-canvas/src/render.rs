//! Draws the UI, the hand, and the canvas onto camera frames.

use itertools::Itertools;

use crate::{
    canvas::Canvas,
    config::BRUSH_THICKNESS,
    gesture::Gesture,
    hand::HandLandmarks,
    image::{draw, Color, Image, Point},
    palette::{BrushColor, BUTTONS},
    session::Session,
};

const SELECT_CURSOR_RADIUS: u32 = 15;
const SELECT_CURSOR_STROKE: u32 = 2;

/// Baseline position of the current color label.
const LABEL_POS: Point = Point::new(10, 450);

/// Draws the button row.
pub fn draw_ui(frame: &mut Image) {
    for button in &BUTTONS {
        draw::rect(frame, button.rect()).color(button.fill()).filled();
        draw::text(frame, button.label_pos.x, button.label_pos.y, button.label())
            .color(Color::WHITE)
            .bold()
            .align_left()
            .align_baseline();
    }
}

/// Draws everything that depends on the session and the current frame's hands.
///
/// In order: the hand skeletons, all strokes, the cursor of each hand's gesture, and the name of
/// the current brush color.
pub fn draw_overlay(
    frame: &mut Image,
    session: &Session,
    hands: &[HandLandmarks],
    gestures: &[Gesture],
) {
    for hand in hands {
        hand.draw(frame);
    }
    draw_strokes(frame, session.canvas());
    for gesture in gestures {
        draw_cursor(frame, *gesture, session.current_color());
    }

    let color = session.current_color();
    draw::text(
        frame,
        LABEL_POS.x,
        LABEL_POS.y,
        &format!("Current: {}", color.name()),
    )
    .color(color.rgb())
    .large()
    .align_left()
    .align_baseline();
}

/// Connects the consecutive points of every stroke.
pub fn draw_strokes(frame: &mut Image, canvas: &Canvas) {
    for (color, strokes) in canvas.iter() {
        for stroke in strokes {
            for (a, b) in stroke.iter().tuple_windows() {
                draw::line(frame, a.x, a.y, b.x, b.y)
                    .color(color.rgb())
                    .stroke_width(BRUSH_THICKNESS);
            }
        }
    }
}

fn draw_cursor(frame: &mut Image, gesture: Gesture, color: BrushColor) {
    match gesture {
        Gesture::None => {}
        Gesture::Draw(p) => {
            draw::circle(frame, p.x, p.y, BRUSH_THICKNESS * 2 + 1)
                .color(color.rgb())
                .filled();
        }
        Gesture::Select(p) => {
            draw::circle(frame, p.x, p.y, SELECT_CURSOR_RADIUS * 2 + 1)
                .color(Color::GREEN)
                .stroke_width(SELECT_CURSOR_STROKE);
        }
    }
}
