use std::{fmt, str::FromStr};

use anyhow::{bail, Context};
use image::ImageBuffer;

use super::Image;

/// The JPEG decoder used for webcam frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JpegBackend {
    /// Uses the `jpeg-decoder` crate (through `image`), a robust but slow pure-Rust JPEG decoder.
    #[default]
    JpegDecoder,
    /// Uses the `zune-jpeg` crate, a pure-Rust JPEG decoder somewhat faster than `jpeg-decoder`.
    ZuneJpeg,
}

impl JpegBackend {
    fn name(&self) -> &'static str {
        match self {
            Self::JpegDecoder => "jpeg-decoder",
            Self::ZuneJpeg => "zune-jpeg",
        }
    }
}

impl FromStr for JpegBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpeg-decoder" => Ok(Self::JpegDecoder),
            "zune-jpeg" => Ok(Self::ZuneJpeg),
            _ => bail!("unknown JPEG backend '{s}' (expected `jpeg-decoder` or `zune-jpeg`)"),
        }
    }
}

impl fmt::Display for JpegBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(super) fn decode_jpeg(data: &[u8], backend: JpegBackend) -> anyhow::Result<Image> {
    let buf = match backend {
        JpegBackend::JpegDecoder => {
            image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)?.to_rgba8()
        }
        JpegBackend::ZuneJpeg => {
            use zune_jpeg::zune_core::colorspace::ColorSpace;
            use zune_jpeg::zune_core::options::DecoderOptions;

            let mut decomp = zune_jpeg::JpegDecoder::new_with_options(
                DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGBA),
                data,
            );
            decomp.decode_headers()?;
            let colorspace = decomp
                .get_output_colorspace()
                .context("JPEG headers declare no colorspace")?;
            if colorspace != ColorSpace::RGBA {
                bail!("unsupported colorspace {colorspace:?} (expected RGBA)");
            }

            let size = decomp
                .output_buffer_size()
                .context("JPEG headers declare no image size")?;
            let mut buf = vec![0; size];
            decomp.decode_into(&mut buf)?;
            let (width, height) = decomp
                .dimensions()
                .context("JPEG headers declare no image size")?;
            ImageBuffer::from_raw(width.into(), height.into(), buf)
                .context("decoded JPEG data does not match image size")?
        }
    };

    Ok(Image { buf })
}
