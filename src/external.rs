use crate::foundation::core::{Point, Size};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::region::mark::{Mark, MarkKind};

/// Background removal service: takes encoded image bytes, returns encoded bytes with a real
/// alpha channel.
pub trait BackgroundMatter: Send + Sync {
    /// Remove the background from `encoded`.
    fn matte(&self, encoded: &[u8]) -> OverlayerResult<Vec<u8>>;
}

/// A matter that is never available.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMatting;

impl BackgroundMatter for NoMatting {
    fn matte(&self, _encoded: &[u8]) -> OverlayerResult<Vec<u8>> {
        Err(OverlayerError::matting("no matting service configured"))
    }
}

/// Where and how large the content of a hotspot will appear. Passed to content generators.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementHint {
    /// Kind of the target hotspot.
    pub kind: MarkKind,
    /// Normalized center of the hotspot.
    pub center: Point,
    /// Normalized size of the hotspot.
    pub size: Size,
}

impl PlacementHint {
    /// Hint describing `mark`.
    pub fn from_mark(mark: &Mark) -> Self {
        Self {
            kind: mark.kind,
            center: mark.center(),
            size: Size::new(mark.width, mark.height),
        }
    }

    /// Pixel size of the hotspot on a `base_width x base_height` image, at least 1x1.
    pub fn pixel_size(&self, base_width: u32, base_height: u32) -> (u32, u32) {
        let w = (self.size.width * f64::from(base_width)).round().max(1.0) as u32;
        let h = (self.size.height * f64::from(base_height)).round().max(1.0) as u32;
        (w, h)
    }
}

/// Image generation service turning a description into encoded image bytes.
pub trait ContentGenerator: Send + Sync {
    /// Generate an image for `description`, sized approximately to `size_hint` pixels.
    fn generate(
        &self,
        description: &str,
        hint: &PlacementHint,
        size_hint: (u32, u32),
    ) -> OverlayerResult<Vec<u8>>;
}

#[cfg(test)]
#[path = "../tests/unit/external.rs"]
mod tests;
