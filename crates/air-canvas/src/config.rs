//! Runtime configuration and fixed layout constants.

use std::{
    env::{self, VarError},
    ffi::OsString,
    path::PathBuf,
};

use anyhow::{bail, Context};

use crate::image::{JpegBackend, Resolution};

/// Resolution every frame is processed at. The button layout is designed for this size.
pub const FRAME_RESOLUTION: Resolution = Resolution::RES_VGA;

/// Line thickness of strokes, and the radius of the draw cursor.
pub const BRUSH_THICKNESS: u32 = 10;

/// Reserved for an eraser brush. No gesture selects it.
pub const ERASER_THICKNESS: u32 = 50;

/// Minimum hand presence score to start tracking a hand.
pub const DETECTION_CONFIDENCE: f32 = 0.7;

/// Minimum hand presence score to keep tracking a hand.
pub const TRACKING_CONFIDENCE: f32 = 0.5;

/// Hand landmark model used when `AIR_CANVAS_HAND_MODEL` is not set.
pub const DEFAULT_HAND_MODEL: &str = "3rdparty/onnx/hand_landmark_full.onnx";

const VAR_WEBCAM_NAME: &str = "AIR_CANVAS_WEBCAM_NAME";
const VAR_HAND_MODEL: &str = "AIR_CANVAS_HAND_MODEL";
const VAR_JPEG_BACKEND: &str = "AIR_CANVAS_JPEG_BACKEND";

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the webcam to open. [`None`] selects the first usable device.
    pub webcam_name: Option<String>,
    pub hand_model: PathBuf,
    pub jpeg_backend: JpegBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webcam_name: None,
            hand_model: PathBuf::from(DEFAULT_HAND_MODEL),
            jpeg_backend: JpegBackend::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|name| env::var_os(name))
    }

    /// Reads the configuration through a variable lookup function.
    pub fn from_vars<F>(mut lookup: F) -> anyhow::Result<Self>
    where
        F: FnMut(&str) -> Option<OsString>,
    {
        let mut var = |name: &'static str| -> anyhow::Result<Option<String>> {
            match lookup(name).map(OsString::into_string) {
                None => Ok(None),
                Some(Ok(value)) => Ok(Some(value)),
                Some(Err(raw)) => Err(VarError::NotUnicode(raw))
                    .with_context(|| format!("invalid value set for `{name}`")),
            }
        };

        let mut config = Self::default();
        if let Some(name) = var(VAR_WEBCAM_NAME)? {
            if name.is_empty() {
                bail!("`{VAR_WEBCAM_NAME}` is set but empty");
            }
            config.webcam_name = Some(name);
        }
        if let Some(path) = var(VAR_HAND_MODEL)? {
            if path.is_empty() {
                bail!("`{VAR_HAND_MODEL}` is set but empty");
            }
            config.hand_model = PathBuf::from(path);
        }
        if let Some(backend) = var(VAR_JPEG_BACKEND)? {
            config.jpeg_backend = backend
                .parse()
                .with_context(|| format!("invalid value set for `{VAR_JPEG_BACKEND}`"))?;
        }

        log::debug!("{config:?}");
        Ok(config)
    }
}
