use crate::foundation::error::{OverlayerError, OverlayerResult};

pub use kurbo::{Point, Rect, Size, Vec2};

/// Straight (non-premultiplied) RGBA8 raster, row-major, tightly packed.
///
/// This is the canonical pixel format flowing between the preparer, the placement engine and the
/// compositor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl Raster {
    /// Fully transparent raster of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Raster filled with a single straight RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            data: rgba.repeat((width as usize) * (height as usize)),
        }
    }

    /// Wrap an existing pixel buffer, checking its length.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> OverlayerResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| OverlayerError::validation("raster size overflow"))?;
        if data.len() != expected {
            return Err(OverlayerError::validation(format!(
                "raster buffer is {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Raw pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Whether the raster has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Read one pixel. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Write one pixel. Panics when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Fill an axis-aligned pixel rectangle, clipped to the raster.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, w: u32, h: u32, rgba: [u8; 4]) {
        let x1 = x0.saturating_add(w).min(self.width);
        let y1 = y0.saturating_add(h).min(self.height);
        for y in y0.min(self.height)..y1 {
            for x in x0.min(self.width)..x1 {
                self.set_pixel(x, y, rgba);
            }
        }
    }

    /// Width divided by height; 1.0 for degenerate rasters.
    pub fn aspect_ratio(&self) -> f64 {
        if self.is_empty() {
            return 1.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }

    /// Whether any pixel has alpha strictly below `opaque_threshold`.
    pub fn has_translucency(&self, opaque_threshold: u8) -> bool {
        self.data.chunks_exact(4).any(|px| px[3] < opaque_threshold)
    }

    /// Copy out a sub-rectangle. The rectangle must lie inside the raster.
    pub fn crop(&self, x0: u32, y0: u32, w: u32, h: u32) -> OverlayerResult<Self> {
        if x0.saturating_add(w) > self.width || y0.saturating_add(h) > self.height {
            return Err(OverlayerError::validation(format!(
                "crop {w}x{h}+{x0}+{y0} exceeds raster {}x{}",
                self.width, self.height
            )));
        }
        let mut data = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for y in y0..y0 + h {
            let start = self.index(x0, y);
            data.extend_from_slice(&self.data[start..start + (w as usize) * 4]);
        }
        Ok(Self {
            width: w,
            height: h,
            data,
        })
    }

    /// Convert into an `image` buffer without copying.
    pub fn into_image(self) -> OverlayerResult<image::RgbaImage> {
        let (w, h) = (self.width, self.height);
        image::RgbaImage::from_raw(w, h, self.data)
            .ok_or_else(|| OverlayerError::validation(format!("raster {w}x{h} has a bad length")))
    }

    /// Wrap an `image` buffer without copying.
    pub fn from_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
