//! The capture, interpret, render loop.

use std::path::Path;

use anyhow::Context;

use crate::{
    config::{Config, DEFAULT_HAND_MODEL, FRAME_RESOLUTION},
    gesture::Gesture,
    gui::{self, InputEvent, Key},
    hand::{HandLandmarker, LandmarkSource},
    image::Image,
    render,
    session::Session,
    timer::{FpsCounter, Timer},
    video::webcam::{Webcam, WebcamOptions},
};

/// Title of the output window.
pub const WINDOW_TITLE: &str = "Air Canvas";

const USAGE: &str = "\
raise only your index finger to draw, raise index and middle finger to select; \
hover the fingertip over a button at the top to clear the canvas or change the color; \
press 'q' to quit";

/// Describes the devices and files the application needs, to be attached to startup errors.
///
/// Without a `config` (when reading it failed), the default model path is named.
pub fn requirements_hint(config: Option<&Config>) -> String {
    let model = config.map_or(Path::new(DEFAULT_HAND_MODEL), |c| c.hand_model.as_path());
    format!(
        "air canvas needs a V4L2 webcam delivering JPEG frames (set `AIR_CANVAS_WEBCAM_NAME` to \
         pick one) and the hand landmark model at '{}' (set `AIR_CANVAS_HAND_MODEL` to override)",
        model.display()
    )
}

/// Processes a single mirrored camera frame in place.
///
/// Hands are detected on the unmodified frame. The button row, the hand skeletons, all strokes,
/// the cursors and the current color label are then drawn on top of it. Returns the gestures
/// that were applied to `session`.
pub fn process_frame<S: LandmarkSource + ?Sized>(
    frame: &mut Image,
    source: &mut S,
    session: &mut Session,
) -> anyhow::Result<Vec<Gesture>> {
    let hands = source.detect(frame)?;

    render::draw_ui(frame);
    let gestures = session.process_frame(&hands, frame.resolution());
    render::draw_overlay(frame, session, &hands, &gestures);

    Ok(gestures)
}

fn quit_requested(events: &[InputEvent]) -> bool {
    events
        .iter()
        .any(|ev| matches!(ev, InputEvent::KeyPressed(Key::Q) | InputEvent::Closed))
}

/// Runs the drawing session until the user quits or the camera stops delivering frames.
///
/// Must be called from within `#[air_canvas::main]`, since the output window is driven by the
/// GUI event loop set up there.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let mut landmarker = HandLandmarker::load(&config.hand_model)?;

    let mut options = WebcamOptions::default()
        .resolution(FRAME_RESOLUTION)
        .fps(30)
        .jpeg_backend(config.jpeg_backend);
    if let Some(name) = &config.webcam_name {
        options = options.name(name.clone());
    }
    let mut webcam = Webcam::open(options).context("failed to open webcam")?;
    if webcam.resolution() != FRAME_RESOLUTION {
        log::info!(
            "webcam delivers {} frames, resizing to {}",
            webcam.resolution(),
            FRAME_RESOLUTION
        );
    }

    log::info!("{USAGE}");

    let mut session = Session::new();
    let mut fps = FpsCounter::new("air canvas");
    let t_process = Timer::new("process");
    loop {
        let mut frame = match webcam.read() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("failed to capture frame: {e:#}");
                break;
            }
        };
        if frame.resolution() != FRAME_RESOLUTION {
            frame = frame.resized(FRAME_RESOLUTION);
        }
        frame.flip_horizontal_in_place();

        t_process.time(|| process_frame(&mut frame, &mut landmarker, &mut session))?;

        gui::show_image(WINDOW_TITLE, &frame)?;

        if quit_requested(&gui::poll_input()) {
            log::info!("quitting");
            break;
        }

        fps.tick_with(
            webcam
                .timers()
                .chain(landmarker.timers())
                .chain([&t_process]),
        );
    }

    Ok(())
}
