//! Gesture-controlled drawing on top of a live webcam feed.
//!
//! Every camera frame is mirrored, searched for a hand, and the hand's pose is classified into a
//! [`gesture::Gesture`]:
//!
//! * Only the index finger raised: **draw** with the index fingertip.
//! * Index and middle finger raised: **select**. Hovering the fingertip over one of the buttons at
//!   the top of the frame clears the canvas or switches the brush color.
//!
//! The strokes collected so far are then drawn over the frame and the result is displayed in a
//! window. Pressing `q` (or closing the window) exits.
//!
//! # Coordinates
//!
//! Landmark positions are normalized to `[0, 1]` with the origin in the top-left corner of the
//! image and Y pointing *down*. Pixel positions use the same orientation.
//!
//! # Environment Variables
//!
//! * `AIR_CANVAS_WEBCAM_NAME`: Forces the webcam device to open. If unset, the first device that
//!   supports a compatible image format will be used.
//! * `AIR_CANVAS_HAND_MODEL`: Path to the hand landmark ONNX model. Defaults to
//!   [`config::DEFAULT_HAND_MODEL`].
//! * `AIR_CANVAS_JPEG_BACKEND`: JPEG decoder to use for webcam frames. Allowed values are
//!   `jpeg-decoder` (the default) and `zune-jpeg`.
//! * `RUST_LOG`: Overrides the default log filter.

pub mod app;
pub mod canvas;
pub mod config;
pub mod gesture;
pub mod gui;
pub mod hand;
pub mod image;
pub mod iter;
pub mod nn;
pub mod palette;
pub mod render;
pub mod session;
pub mod stroke;
pub mod termination;
pub mod timer;
pub mod video;


use log::LevelFilter;

pub use air_canvas_macros::main;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(module_path!()), log_level)
        .filter(Some("wgpu"), LevelFilter::Warn)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and `air_canvas` will log at *debug* level, `wgpu` will always log at *warn*
/// level. `RUST_LOG` can override both.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn run<F, R>(cb: F) -> !
where
    F: FnOnce() -> R + Send + 'static,
    R: termination::Termination + Send,
{
    gui::run(cb)
}
