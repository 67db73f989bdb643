use std::collections::BTreeMap;

use crate::foundation::core::Raster;
use crate::foundation::math::rgb_distance;

/// Dominant solid color found along the image border.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderBackground {
    /// Mean color of the samples in the winning histogram bucket.
    pub color: [u8; 3],
    /// Fraction of border samples that fell into the winning bucket.
    pub share: f64,
}

/// Parameters for border sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderSampling {
    /// Approximate number of samples per edge.
    pub samples_per_edge: u32,
    /// Histogram bucket width per channel.
    pub quantize_step: u8,
    /// Minimum share of samples the winning bucket must hold.
    pub dominance_ratio: f64,
}

#[derive(Default)]
struct Bucket {
    count: u32,
    sum: [u64; 3],
}

/// Sample the border at a fixed stride and return the dominant color, if any.
///
/// Returns `None` when the most populated bucket holds less than `dominance_ratio` of the
/// samples. Ties go to the bucket with the smallest quantized key.
pub fn detect_border_background(
    raster: &Raster,
    sampling: &BorderSampling,
) -> Option<BorderBackground> {
    if raster.is_empty() {
        return None;
    }
    let per_edge = sampling.samples_per_edge.max(1);
    let step = u32::from(sampling.quantize_step.max(1));
    let stride_x = (raster.width / per_edge).max(1);
    let stride_y = (raster.height / per_edge).max(1);

    let mut buckets: BTreeMap<[u8; 3], Bucket> = BTreeMap::new();
    let mut total = 0u32;
    let mut sample = |x: u32, y: u32| {
        let px = raster.pixel(x, y);
        let key = [
            (u32::from(px[0]) / step) as u8,
            (u32::from(px[1]) / step) as u8,
            (u32::from(px[2]) / step) as u8,
        ];
        let b = buckets.entry(key).or_default();
        b.count += 1;
        for i in 0..3 {
            b.sum[i] += u64::from(px[i]);
        }
        total += 1;
    };

    let bottom = raster.height - 1;
    let right = raster.width - 1;
    for x in (0..raster.width).step_by(stride_x as usize) {
        sample(x, 0);
        sample(x, bottom);
    }
    for y in (0..raster.height).step_by(stride_y as usize) {
        sample(0, y);
        sample(right, y);
    }

    let (_, best) = buckets
        .iter()
        .fold(None::<(&[u8; 3], &Bucket)>, |acc, (k, b)| match acc {
            Some((_, cur)) if cur.count >= b.count => acc,
            _ => Some((k, b)),
        })?;

    let share = f64::from(best.count) / f64::from(total);
    if share < sampling.dominance_ratio {
        tracing::debug!(share, "no dominant border color");
        return None;
    }

    let n = u64::from(best.count);
    let color = [
        ((best.sum[0] + n / 2) / n) as u8,
        ((best.sum[1] + n / 2) / n) as u8,
        ((best.sum[2] + n / 2) / n) as u8,
    ];
    Some(BorderBackground { color, share })
}

/// Zero the alpha of every pixel within `tolerance` (Euclidean RGB) of `color`.
///
/// Returns the number of pixels cleared.
pub fn strip_background(raster: &mut Raster, color: [u8; 3], tolerance: f64) -> usize {
    let mut cleared = 0;
    for px in raster.data.chunks_exact_mut(4) {
        if px[3] != 0 && rgb_distance([px[0], px[1], px[2]], color) <= tolerance {
            px[3] = 0;
            cleared += 1;
        }
    }
    cleared
}

#[cfg(test)]
#[path = "../../tests/unit/prepare/background.rs"]
mod tests;
