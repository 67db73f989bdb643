use crate::foundation::core::{Point, Raster, Rect, Size, Vec2};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::foundation::math::{
    clamp_unit, mul_div255_u8, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place,
};
use crate::prepare::surface::RasterSurface;

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Source-over for straight (non-premultiplied) pixels.
pub fn over_straight(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }
    let mut d = dst;
    let mut s = src;
    premultiply_rgba8_in_place(&mut d);
    premultiply_rgba8_in_place(&mut s);
    let mut out = over(d, s, 1.0);
    unpremultiply_rgba8_in_place(&mut out);
    out
}

/// Blend `src` onto `dst` with its top-left at `(x, y)`, clipped to `dst`.
pub(crate) fn blend_at(dst: &mut Raster, src: &Raster, x: i64, y: i64) {
    let dw = i64::from(dst.width);
    let dh = i64::from(dst.height);
    for sy in 0..i64::from(src.height) {
        let ty = y + sy;
        if ty < 0 || ty >= dh {
            continue;
        }
        for sx in 0..i64::from(src.width) {
            let tx = x + sx;
            if tx < 0 || tx >= dw {
                continue;
            }
            let s = src.pixel(sx as u32, sy as u32);
            if s[3] == 0 {
                continue;
            }
            let d = dst.pixel(tx as u32, ty as u32);
            dst.set_pixel(tx as u32, ty as u32, over_straight(d, s));
        }
    }
}

/// Pixel rectangle of an overlay on a `canvas`-sized raster.
///
/// The center is clamped to the unit square; the size is the percentage of the canvas
/// width/height.
pub fn overlay_pixel_rect(
    center: Point,
    width_percent: f64,
    height_percent: f64,
    canvas: Size,
) -> Rect {
    let center_px = Point::new(
        clamp_unit(center.x) * canvas.width,
        clamp_unit(center.y) * canvas.height,
    );
    let size_px = Vec2::new(
        width_percent / 100.0 * canvas.width,
        height_percent / 100.0 * canvas.height,
    );
    let top_left = center_px - size_px * 0.5;
    Rect::from_origin_size(top_left, (size_px.x, size_px.y))
}

/// One positioned overlay to paint.
#[derive(Clone, Copy, Debug)]
pub struct CompositeLayer<'a> {
    /// Trimmed overlay sprite.
    pub sprite: &'a Raster,
    /// Normalized center on the base image.
    pub center: Point,
    /// Displayed width as a percentage of the base width.
    pub width_percent: f64,
    /// Displayed height as a percentage of the base height.
    pub height_percent: f64,
}

/// Flatten `layers` onto a copy of `base`, in slice order.
///
/// Later layers paint over earlier ones. Layers whose rounded pixel width or height is not
/// positive are skipped. The output always has the base dimensions.
#[tracing::instrument(skip_all, fields(width = base.width, height = base.height, layers = layers.len()))]
pub fn render_composite(
    surface: &dyn RasterSurface,
    base: &Raster,
    layers: &[CompositeLayer<'_>],
) -> OverlayerResult<Raster> {
    if base.is_empty() {
        return Err(OverlayerError::validation("base image has no pixels"));
    }

    let mut canvas = Raster::new(base.width, base.height);
    surface.draw(
        &mut canvas,
        base,
        Rect::new(0.0, 0.0, f64::from(base.width), f64::from(base.height)),
    )?;

    let size = Size::new(f64::from(base.width), f64::from(base.height));
    for (i, layer) in layers.iter().enumerate() {
        let rect = overlay_pixel_rect(layer.center, layer.width_percent, layer.height_percent, size);
        if rect.width().round() <= 0.0 || rect.height().round() <= 0.0 || layer.sprite.is_empty() {
            tracing::debug!(layer = i, "skipping overlay with empty pixel size");
            continue;
        }
        surface.draw(&mut canvas, layer.sprite, rect)?;
    }

    Ok(canvas)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composite.rs"]
mod tests;
