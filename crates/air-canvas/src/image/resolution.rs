//! Types for representing image resolutions.

use std::fmt;

use super::Rect;

/// Resolution (`width x height`) of an image, window, or camera.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// VGA resolution: `640x480`
    pub const RES_VGA: Self = Self {
        width: 640,
        height: 480,
    };

    /// Creates a new [`Resolution`] of `width x height`.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the width of this [`Resolution`].
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of this [`Resolution`].
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn num_pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Computes the centered, smallest square [`Rect`] that contains all of `self`.
    ///
    /// For non-square resolutions, the square extends past two edges of the image.
    pub fn letterbox_square(&self) -> Rect {
        let side = self.width.max(self.height) as f32;
        Rect::from_center(
            self.width as f32 / 2.0,
            self.height as f32 / 2.0,
            side,
            side,
        )
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterbox_square() {
        assert_eq!(
            Resolution::RES_VGA.letterbox_square(),
            Rect::from_top_left(0.0, -80.0, 640.0, 640.0)
        );
        assert_eq!(
            Resolution::new(100, 200).letterbox_square(),
            Rect::from_top_left(-50.0, 0.0, 200.0, 200.0)
        );
    }

    #[test]
    fn display() {
        assert_eq!(Resolution::RES_VGA.to_string(), "640x480");
        assert_eq!(Resolution::RES_VGA.num_pixels(), 307_200);
    }
}
