use std::io::Cursor;

use anyhow::Context as _;

use crate::compose::composite::blend_at;
use crate::foundation::core::{Raster, Rect};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// Pixel-buffer capability used by the preparer and the compositor.
///
/// Implementations must be stateless or internally synchronized: one surface is shared by
/// concurrent preparations, and every call works on caller-owned rasters only.
pub trait RasterSurface: Send + Sync {
    /// Decode encoded image bytes into a straight RGBA8 raster.
    fn decode(&self, bytes: &[u8]) -> OverlayerResult<Raster>;

    /// Encode a raster in the canonical lossless format (PNG).
    fn encode(&self, raster: &Raster) -> OverlayerResult<Vec<u8>>;

    /// Resample a raster to `width x height`.
    fn resample(&self, src: &Raster, width: u32, height: u32) -> OverlayerResult<Raster>;

    /// Read back the pixels of a raster.
    fn get_pixels<'a>(&self, raster: &'a Raster) -> &'a [u8] {
        raster.pixels()
    }

    /// Alpha-blend `src`, scaled to `dest`'s rounded size, onto `dst` at `dest`'s rounded origin.
    fn draw(&self, dst: &mut Raster, src: &Raster, dest: Rect) -> OverlayerResult<()> {
        let w = dest.width().round();
        let h = dest.height().round();
        if w <= 0.0 || h <= 0.0 || src.is_empty() {
            return Ok(());
        }
        let (w, h) = (w as u32, h as u32);
        let x = dest.x0.round() as i64;
        let y = dest.y0.round() as i64;

        if (w, h) == (src.width, src.height) {
            blend_at(dst, src, x, y);
        } else {
            let scaled = self.resample(src, w, h)?;
            blend_at(dst, &scaled, x, y);
        }
        Ok(())
    }
}

/// [`RasterSurface`] backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageSurface;

impl RasterSurface for ImageSurface {
    fn decode(&self, bytes: &[u8]) -> OverlayerResult<Raster> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| OverlayerError::decode(format!("decode image from memory: {e}")))?;
        let raster = Raster::from_image(img.to_rgba8());
        if raster.is_empty() {
            return Err(OverlayerError::decode("decoded image has no pixels"));
        }
        Ok(raster)
    }

    fn encode(&self, raster: &Raster) -> OverlayerResult<Vec<u8>> {
        let mut buf = Vec::new();
        image::write_buffer_with_format(
            &mut Cursor::new(&mut buf),
            raster.pixels(),
            raster.width,
            raster.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .context("encode png")?;
        Ok(buf)
    }

    fn resample(&self, src: &Raster, width: u32, height: u32) -> OverlayerResult<Raster> {
        if width == 0 || height == 0 {
            return Err(OverlayerError::validation(format!(
                "cannot resample to {width}x{height}"
            )));
        }
        // Filter in premultiplied space so transparent pixels do not bleed their color.
        let mut data = src.data.clone();
        premultiply_rgba8_in_place(&mut data);
        let img = Raster::from_raw(src.width, src.height, data)?.into_image()?;
        let resized = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        let mut out = Raster::from_image(resized);
        unpremultiply_rgba8_in_place(&mut out.data);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/prepare/surface.rs"]
mod tests;
