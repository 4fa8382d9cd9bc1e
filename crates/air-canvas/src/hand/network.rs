use std::path::Path;

use anyhow::{bail, Context};

use crate::{
    config::{DETECTION_CONFIDENCE, TRACKING_CONFIDENCE},
    image::{Image, Rect, Resolution},
    iter::zip_exact,
    nn::{Cnn, NeuralNetwork, Outputs},
    timer::Timer,
};

use super::{HandLandmarks, LandmarkSource, NUM_LANDMARKS};

/// Relative amount by which the landmark bounding box is grown to obtain the next frame's region
/// of interest.
const ROI_GROWTH: f32 = 1.0;

/// Tracks a single hand using a MediaPipe-style hand landmark network.
///
/// While no hand is tracked, the network is run on the whole frame, letterboxed into a square, and
/// a hand is only accepted if its presence score reaches [`DETECTION_CONFIDENCE`]. Once a hand is
/// found, the next frame is evaluated around its last known position, and tracking continues as
/// long as the presence score stays at or above [`TRACKING_CONFIDENCE`].
pub struct HandLandmarker {
    cnn: Cnn,
    roi: Option<Rect>,
    t_infer: Timer,
}

impl HandLandmarker {
    /// Loads the landmark network from an ONNX file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let nn = NeuralNetwork::from_path(path)
            .with_context(|| format!("failed to load hand landmark model '{}'", path.display()))?;
        let cnn = Cnn::new(nn)?;
        log::info!(
            "loaded hand landmark model '{}' ({} input)",
            path.display(),
            cnn.input_resolution()
        );
        Ok(Self {
            cnn,
            roi: None,
            t_infer: Timer::new("infer"),
        })
    }

    pub fn timers(&self) -> impl IntoIterator<Item = &Timer> + '_ {
        [&self.t_infer]
    }
}

impl LandmarkSource for HandLandmarker {
    fn detect(&mut self, image: &Image) -> anyhow::Result<Vec<HandLandmarks>> {
        let res = image.resolution();
        let (roi, _) = search_area(self.roi, res);
        let outputs = self.t_infer.time(|| self.cnn.estimate(image, roi))?;
        let (raw, presence) = extract(&outputs)?;

        let (hand, next) = track(self.roi, &raw, presence, self.cnn.input_resolution(), res);
        match (self.roi.is_some(), next.is_some()) {
            (false, true) => log::debug!("found hand (presence {presence:.2})"),
            (true, false) => log::debug!("lost hand (presence {presence:.2})"),
            _ => {}
        }
        self.roi = next;

        Ok(hand.into_iter().collect())
    }
}

/// Returns the area the network has to be run on, and the presence score a hand found there
/// needs to reach.
fn search_area(tracked: Option<Rect>, res: Resolution) -> (Rect, f32) {
    match tracked {
        Some(roi) => (roi, TRACKING_CONFIDENCE),
        None => (res.letterbox_square(), DETECTION_CONFIDENCE),
    }
}

/// Interprets one network evaluation.
///
/// `raw` holds the landmarks in pixels of the network input (of size `input_res`), which covered
/// the [`search_area`] for `tracked`. Returns the hand, normalized to a frame of size `frame_res`,
/// and the area to search in the next frame. A non-finite hand is returned, but ends tracking.
fn track(
    tracked: Option<Rect>,
    raw: &[[f32; 3]; NUM_LANDMARKS],
    presence: f32,
    input_res: Resolution,
    frame_res: Resolution,
) -> (Option<HandLandmarks>, Option<Rect>) {
    let (roi, threshold) = search_area(tracked, frame_res);
    if presence.is_nan() || presence < threshold {
        return (None, None);
    }

    let (input_w, input_h) = (input_res.width() as f32, input_res.height() as f32);
    let (w, h) = (frame_res.width() as f32, frame_res.height() as f32);
    let mut pixels = [[0.0; 2]; NUM_LANDMARKS];
    let mut positions = [[0.0; 3]; NUM_LANDMARKS];
    for ((&[x, y, z], px), out) in raw.iter().zip(&mut pixels).zip(&mut positions) {
        *px = roi.transform_out(x / input_w, y / input_h);
        *out = [px[0] / w, px[1] / h, z / input_w];
    }
    let hand = HandLandmarks::new(positions).with_presence(presence);

    let next = if hand.is_finite() {
        Rect::bounding(pixels).map(|r| r.grow_to_square().grow_rel(ROI_GROWTH))
    } else {
        None
    };
    (Some(hand), next)
}

/// Reads the landmark positions (in network input pixels) and the hand presence score.
fn extract(outputs: &Outputs) -> anyhow::Result<([[f32; 3]; NUM_LANDMARKS], f32)> {
    if outputs.len() < 2 {
        bail!(
            "hand landmark network has {} outputs, expected at least 2",
            outputs.len()
        );
    }
    let landmarks = outputs[0].as_slice();
    let presence = outputs[1].as_slice();
    if landmarks.len() != NUM_LANDMARKS * 3 || presence.len() != 1 {
        bail!(
            "unexpected hand landmark network output shapes {:?} and {:?}",
            outputs[0].shape(),
            outputs[1].shape(),
        );
    }

    let mut raw = [[0.0; 3]; NUM_LANDMARKS];
    for (out, chunk) in zip_exact(raw.iter_mut(), landmarks.chunks_exact(3)) {
        out.copy_from_slice(chunk);
    }
    Ok((raw, presence[0]))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::nn::Tensor;

    use super::*;

    const INPUT: Resolution = Resolution::new(224, 224);
    const FRAME: Resolution = Resolution::RES_VGA;

    /// A 5x5 grid of landmarks (the last row has a single entry) in network input pixels.
    fn grid(center: [f32; 2], spacing: f32) -> [[f32; 3]; NUM_LANDMARKS] {
        let mut raw = [[0.0; 3]; NUM_LANDMARKS];
        for (i, pos) in raw.iter_mut().enumerate() {
            let (col, row) = ((i % 5) as f32 - 2.0, (i / 5) as f32 - 2.0);
            *pos = [center[0] + col * spacing, center[1] + row * spacing, 0.0];
        }
        raw
    }

    #[test]
    fn acquires_over_whole_frame() {
        let (hand, next) = track(None, &grid([112.0, 112.0], 10.0), 0.8, INPUT, FRAME);
        let hand = hand.unwrap();
        assert_eq!(hand.presence(), 0.8);

        // the letterboxed frame maps the input center to the frame center
        let [x, y, _] = hand.positions()[12];
        assert_abs_diff_eq!(x, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(y, 0.5, epsilon = 1e-5);

        // input pixels are 640/224 frame pixels wide, and the 40 pixel box doubles in size
        let next = next.unwrap();
        let side = 40.0 * 640.0 / 224.0 * 2.0;
        assert_abs_diff_eq!(next.width(), side, epsilon = 1e-3);
        assert_abs_diff_eq!(next.height(), side, epsilon = 1e-3);
        assert_abs_diff_eq!(next.center()[0], 320.0, epsilon = 1e-3);
        assert_abs_diff_eq!(next.center()[1], 240.0, epsilon = 1e-3);
    }

    #[test]
    fn acquiring_reaches_frame_edges() {
        let (hand, _) = track(None, &grid([15.0, 112.0], 2.0), 0.9, INPUT, FRAME);
        let [x, _, _] = hand.unwrap().positions()[12];
        assert!(x < 0.1, "{x}");
    }

    #[test]
    fn detection_needs_higher_confidence() {
        let raw = grid([112.0, 112.0], 10.0);
        assert_eq!(track(None, &raw, 0.6, INPUT, FRAME), (None, None));

        let roi = Rect::from_top_left(100.0, 100.0, 224.0, 224.0);
        let (hand, next) = track(Some(roi), &raw, 0.6, INPUT, FRAME);
        assert!(hand.is_some());
        assert!(next.is_some());
    }

    #[test]
    fn tracking_follows_the_roi() {
        let roi = Rect::from_top_left(100.0, 100.0, 224.0, 224.0);
        let (hand, next) = track(Some(roi), &grid([112.0, 112.0], 10.0), 0.9, INPUT, FRAME);
        let [x, y, _] = hand.unwrap().positions()[12];
        assert_abs_diff_eq!(x * 640.0, 212.0, epsilon = 1e-3);
        assert_abs_diff_eq!(y * 480.0, 212.0, epsilon = 1e-3);
        assert_abs_diff_eq!(next.unwrap().width(), 80.0, epsilon = 1e-3);
    }

    #[test]
    fn losing_the_hand_resets() {
        let roi = Rect::from_top_left(100.0, 100.0, 224.0, 224.0);
        let raw = grid([112.0, 112.0], 10.0);
        assert_eq!(track(Some(roi), &raw, 0.4, INPUT, FRAME), (None, None));
        assert_eq!(track(Some(roi), &raw, f32::NAN, INPUT, FRAME), (None, None));
        assert_eq!(search_area(None, FRAME), (FRAME.letterbox_square(), DETECTION_CONFIDENCE));
    }

    #[test]
    fn non_finite_output_resets() {
        let roi = Rect::from_top_left(100.0, 100.0, 224.0, 224.0);
        let mut raw = grid([112.0, 112.0], 10.0);
        raw[3][0] = f32::NAN;
        let (hand, next) = track(Some(roi), &raw, 0.9, INPUT, FRAME);
        assert!(!hand.unwrap().is_finite());
        assert_eq!(next, None);
    }

    #[test]
    fn extract_outputs() {
        let landmarks = Tensor::from_iter(&[1, 63], (0..63).map(|i| i as f32));
        let presence = Tensor::from_iter(&[1, 1], [0.9]);
        let (raw, presence) = extract(&Outputs::from(vec![landmarks, presence])).unwrap();
        assert_eq!(raw[0], [0.0, 1.0, 2.0]);
        assert_eq!(raw[20], [60.0, 61.0, 62.0]);
        assert_eq!(presence, 0.9);
    }

    #[test]
    fn extract_rejects_bad_shapes() {
        let landmarks = Tensor::from_iter(&[1, 42], (0..42).map(|i| i as f32));
        let presence = Tensor::from_iter(&[1, 1], [0.9]);
        assert!(extract(&Outputs::from(vec![landmarks.clone(), presence])).is_err());
        assert!(extract(&Outputs::from(vec![landmarks])).is_err());
    }
}
