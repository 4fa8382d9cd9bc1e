//! Hand landmark detection.

mod landmark;
mod network;

pub use landmark::{HandLandmarks, LandmarkIdx, NUM_LANDMARKS};
pub use network::HandLandmarker;

use crate::image::Image;

/// Something that finds hands in images.
pub trait LandmarkSource {
    /// Finds the hands in `image`.
    ///
    /// The returned landmark positions are normalized to the dimensions of `image`.
    fn detect(&mut self, image: &Image) -> anyhow::Result<Vec<HandLandmarks>>;
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for &mut S {
    fn detect(&mut self, image: &Image) -> anyhow::Result<Vec<HandLandmarks>> {
        (**self).detect(image)
    }
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn detect(&mut self, image: &Image) -> anyhow::Result<Vec<HandLandmarks>> {
        (**self).detect(image)
    }
}
