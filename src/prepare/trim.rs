use crate::foundation::core::Raster;
use crate::foundation::error::OverlayerResult;

/// Inclusive-exclusive pixel bounds `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    /// Left edge.
    pub x0: u32,
    /// Top edge.
    pub y0: u32,
    /// Right edge, exclusive.
    pub x1: u32,
    /// Bottom edge, exclusive.
    pub y1: u32,
}

impl PixelBounds {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// Bounding box of the pixels whose alpha is strictly above `threshold`.
pub fn alpha_bounds(raster: &Raster, threshold: u8) -> Option<PixelBounds> {
    let mut bounds: Option<PixelBounds> = None;
    for y in 0..raster.height {
        for x in 0..raster.width {
            if raster.pixel(x, y)[3] <= threshold {
                continue;
            }
            bounds = Some(match bounds {
                None => PixelBounds {
                    x0: x,
                    y0: y,
                    x1: x + 1,
                    y1: y + 1,
                },
                Some(b) => PixelBounds {
                    x0: b.x0.min(x),
                    y0: b.y0.min(y),
                    x1: b.x1.max(x + 1),
                    y1: b.y1.max(y + 1),
                },
            });
        }
    }
    bounds
}

/// Outcome of an alpha trim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrimOutcome {
    /// The raster was cropped to the given bounds.
    Cropped(PixelBounds),
    /// Content already fills the raster.
    Unchanged,
    /// No pixel is above the threshold; the raster was left as-is.
    EmptyBounds,
}

/// Crop `raster` to its alpha bounds when they are strictly smaller than the raster.
pub fn trim_to_alpha(raster: &mut Raster, threshold: u8) -> OverlayerResult<TrimOutcome> {
    let Some(b) = alpha_bounds(raster, threshold) else {
        return Ok(TrimOutcome::EmptyBounds);
    };
    if b.width() == raster.width && b.height() == raster.height {
        return Ok(TrimOutcome::Unchanged);
    }
    *raster = raster.crop(b.x0, b.y0, b.width(), b.height())?;
    Ok(TrimOutcome::Cropped(b))
}

#[cfg(test)]
#[path = "../../tests/unit/prepare/trim.rs"]
mod tests;
