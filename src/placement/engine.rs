use crate::compose::composite::CompositeLayer;
use crate::foundation::core::{Point, Raster, Rect, Size, Vec2};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::foundation::math::{clamp_or_mid, clamp_unit};
use crate::prepare::pipeline::PreparedOverlay;
use crate::region::mark::{Mark, MarkId, MarkKind};
use crate::signature::cache::Signature;

/// Sizing and clamping rules for overlay placements.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct PlacementOpts {
    /// Damping applied to text overlays.
    pub text_damping: f64,
    /// Damping applied to generated image overlays.
    pub generated_damping: f64,
    /// Damping applied to uploaded image overlays.
    pub upload_damping: f64,
    /// Bounds of the base width derived from the hotspot, in percent.
    pub base_width_range: (f64, f64),
    /// Base width used when the hotspot has no meaningful size, before damping.
    pub default_width: f64,
    /// Bounds of the damped default width, in percent.
    pub default_width_range: (f64, f64),
    /// Bounds of the displayed width, in percent.
    pub width_range: (f64, f64),
    /// Bounds of the scale factor.
    pub scale_range: (f64, f64),
    /// Bounds of the scale slider, in percent.
    pub slider_range: (f64, f64),
    /// Hotspot width below which the default width is used.
    pub min_mark_width: f64,
}

impl Default for PlacementOpts {
    fn default() -> Self {
        Self {
            text_damping: 0.75,
            generated_damping: 0.85,
            upload_damping: 0.95,
            base_width_range: (5.0, 100.0),
            default_width: 30.0,
            default_width_range: (5.0, 80.0),
            width_range: (2.0, 400.0),
            scale_range: (0.4, 2.0),
            slider_range: (40.0, 160.0),
            min_mark_width: 0.01,
        }
    }
}

impl PlacementOpts {
    /// Damping factor for a content kind and origin.
    pub fn damping(&self, kind: MarkKind, origin: OverlayOrigin) -> f64 {
        match (kind, origin) {
            (MarkKind::Text, _) => self.text_damping,
            (MarkKind::Image, OverlayOrigin::AiGenerated) => self.generated_damping,
            (MarkKind::Image, OverlayOrigin::UserUpload) => self.upload_damping,
        }
    }

    /// Base width in percent for a fresh placement on `mark`.
    pub fn initial_base_width(&self, mark: &Mark, origin: OverlayOrigin) -> f64 {
        let damping = self.damping(mark.kind, origin);
        if !(mark.width >= self.min_mark_width) {
            let (lo, hi) = self.default_width_range;
            return (self.default_width * damping).clamp(lo, hi);
        }
        let (lo, hi) = self.base_width_range;
        (mark.width * 100.0 * damping).clamp(lo, hi)
    }

    /// Map a slider position in percent to a scale factor.
    pub fn slider_to_scale(&self, slider: f64) -> f64 {
        let (lo, hi) = self.slider_range;
        clamp_or_mid(slider, lo, hi) / 100.0
    }
}

/// How the overlay content was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayOrigin {
    /// Produced by the content generator.
    AiGenerated,
    /// Uploaded by the user.
    UserUpload,
}

/// Position and size of one overlay, aspect-locked to its sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Normalized center on the base image.
    pub center: Point,
    /// User scale factor.
    pub scale: f64,
    /// Width at scale 1, in percent of the base width.
    pub base_width_percent: f64,
    /// Sprite width over height.
    pub aspect_ratio: f64,
}

impl Placement {
    /// Displayed width in percent of the base width.
    pub fn width_percent(&self, opts: &PlacementOpts) -> f64 {
        let (lo, hi) = opts.width_range;
        (self.base_width_percent * self.scale).clamp(lo, hi)
    }

    /// Displayed height in percent of the base height, for a base of `container_aspect`
    /// (width over height).
    pub fn height_percent(&self, opts: &PlacementOpts, container_aspect: f64) -> f64 {
        self.width_percent(opts) / self.aspect_ratio * container_aspect
    }

    /// Half extents of the bounding box in normalized units.
    pub fn half_extents(&self, opts: &PlacementOpts, container_aspect: f64) -> Vec2 {
        Vec2::new(
            self.width_percent(opts) / 200.0,
            self.height_percent(opts, container_aspect) / 200.0,
        )
    }
}

/// A prepared overlay bound to a hotspot, with its placement.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayAsset {
    /// Owning hotspot; also the asset id.
    pub mark_id: MarkId,
    /// Kind of the owning hotspot.
    pub kind: MarkKind,
    /// Trimmed sprite.
    pub raster: Raster,
    /// Always true for accepted assets.
    pub has_alpha: bool,
    /// Sprite width over height.
    pub aspect_ratio: f64,
    /// Current placement.
    pub placement: Placement,
    /// Signature of the content the sprite was prepared from.
    pub signature: Signature,
    /// How the content was produced.
    pub origin: OverlayOrigin,
}

/// Active overlay drag.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayDrag {
    asset_id: MarkId,
    start_pointer: Point,
    start_center: Point,
    container: Rect,
}

impl OverlayDrag {
    /// Asset being dragged.
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }
}

/// Keeps one placement per hotspot, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct PlacementEngine {
    opts: PlacementOpts,
    assets: Vec<OverlayAsset>,
    drag: Option<OverlayDrag>,
}

impl PlacementEngine {
    /// Empty engine.
    pub fn new(opts: PlacementOpts) -> Self {
        Self {
            opts,
            assets: Vec::new(),
            drag: None,
        }
    }

    /// Options in effect.
    pub fn opts(&self) -> &PlacementOpts {
        &self.opts
    }

    /// Assets in paint order.
    pub fn assets(&self) -> &[OverlayAsset] {
        &self.assets
    }

    /// Asset owned by `asset_id`.
    pub fn get(&self, asset_id: &str) -> Option<&OverlayAsset> {
        self.assets.iter().find(|a| a.mark_id == asset_id)
    }

    fn get_mut(&mut self, asset_id: &str) -> OverlayerResult<&mut OverlayAsset> {
        self.assets
            .iter_mut()
            .find(|a| a.mark_id == asset_id)
            .ok_or_else(|| OverlayerError::unknown_mark(asset_id))
    }

    /// Place `prepared` on `mark`. Replacing an existing overlay keeps its paint position.
    pub fn create(
        &mut self,
        mark: &Mark,
        prepared: PreparedOverlay,
        signature: Signature,
        origin: OverlayOrigin,
    ) -> OverlayerResult<&OverlayAsset> {
        if !prepared.has_alpha {
            return Err(OverlayerError::transparency(
                "overlay has no usable transparency",
            ));
        }
        let aspect_ratio = prepared.aspect_ratio();
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            return Err(OverlayerError::validation("overlay has no pixels"));
        }

        let asset = OverlayAsset {
            mark_id: mark.id.clone(),
            kind: mark.kind,
            raster: prepared.raster,
            has_alpha: true,
            aspect_ratio,
            placement: Placement {
                center: clamp_center(mark.center()),
                scale: 1.0,
                base_width_percent: self.opts.initial_base_width(mark, origin),
                aspect_ratio,
            },
            signature,
            origin,
        };

        let idx = match self.assets.iter().position(|a| a.mark_id == mark.id) {
            Some(idx) => {
                self.assets[idx] = asset;
                idx
            }
            None => {
                self.assets.push(asset);
                self.assets.len() - 1
            }
        };
        Ok(&self.assets[idx])
    }

    /// Start dragging `asset_id`. `container` is the on-screen pixel rect of the base image.
    pub fn begin_drag(&mut self, asset_id: &str, pointer: Point, container: Rect) -> OverlayerResult<()> {
        if self.drag.is_some() {
            return Err(OverlayerError::gesture("an overlay drag is already active"));
        }
        if !(container.width() > 0.0 && container.height() > 0.0) {
            return Err(OverlayerError::validation("drag container has no area"));
        }
        let start_center = self
            .get(asset_id)
            .ok_or_else(|| OverlayerError::unknown_mark(asset_id))?
            .placement
            .center;
        self.drag = Some(OverlayDrag {
            asset_id: asset_id.to_string(),
            start_pointer: pointer,
            start_center,
            container,
        });
        Ok(())
    }

    /// Move the dragged asset so it follows `pointer`. Returns the new center.
    ///
    /// The center is clamped so the bounding box stays inside the unit square.
    pub fn update_drag(&mut self, pointer: Point) -> OverlayerResult<Point> {
        let Some(drag) = self.drag.clone() else {
            return Err(OverlayerError::gesture("no overlay drag is active"));
        };
        let delta = pointer - drag.start_pointer;
        let size = drag.container.size();
        let requested = drag.start_center
            + Vec2::new(delta.x / size.width, delta.y / size.height);
        let container_aspect = size.width / size.height;

        self.set_center(&drag.asset_id, requested, container_aspect)
    }

    /// Move `asset_id` to `center`, clamped so its bounding box stays inside the unit square.
    pub fn set_center(
        &mut self,
        asset_id: &str,
        center: Point,
        container_aspect: f64,
    ) -> OverlayerResult<Point> {
        if !(center.x.is_finite() && center.y.is_finite()) {
            return Err(OverlayerError::validation("overlay center must be finite"));
        }
        let opts = self.opts.clone();
        let asset = self.get_mut(asset_id)?;
        let half = asset.placement.half_extents(&opts, container_aspect);
        let center = Point::new(
            clamp_or_mid(center.x, half.x, 1.0 - half.x),
            clamp_or_mid(center.y, half.y, 1.0 - half.y),
        );
        asset.placement.center = center;
        Ok(center)
    }

    /// Finish the active drag, if any.
    pub fn end_drag(&mut self) -> Option<OverlayDrag> {
        self.drag.take()
    }

    /// Active drag, if any.
    pub fn active_drag(&self) -> Option<&OverlayDrag> {
        self.drag.as_ref()
    }

    /// Set the scale of `asset_id`, clamped to the allowed range.
    pub fn set_scale(&mut self, asset_id: &str, scale: f64) -> OverlayerResult<f64> {
        if !scale.is_finite() {
            return Err(OverlayerError::validation("scale must be finite"));
        }
        let (lo, hi) = self.opts.scale_range;
        let asset = self.get_mut(asset_id)?;
        asset.placement.scale = scale.clamp(lo, hi);
        Ok(asset.placement.scale)
    }

    /// Set the scale of `asset_id` from a slider position in percent.
    pub fn set_scale_from_slider(&mut self, asset_id: &str, slider: f64) -> OverlayerResult<f64> {
        let scale = self.opts.slider_to_scale(slider);
        self.set_scale(asset_id, scale)
    }

    /// Restore the placement of `asset_id` from `mark`'s geometry with scale 1.
    pub fn reset(&mut self, asset_id: &str, mark: &Mark) -> OverlayerResult<()> {
        let base_width = {
            let asset = self.get(asset_id).ok_or_else(|| OverlayerError::unknown_mark(asset_id))?;
            self.opts.initial_base_width(mark, asset.origin)
        };
        let asset = self.get_mut(asset_id)?;
        asset.placement.center = clamp_center(mark.center());
        asset.placement.scale = 1.0;
        asset.placement.base_width_percent = base_width;
        Ok(())
    }

    /// Remove the overlay of `asset_id`, cancelling its drag.
    pub fn remove(&mut self, asset_id: &str) -> Option<OverlayAsset> {
        if self.drag.as_ref().is_some_and(|d| d.asset_id == asset_id) {
            self.drag = None;
        }
        let idx = self.assets.iter().position(|a| a.mark_id == asset_id)?;
        Some(self.assets.remove(idx))
    }

    /// Remove every overlay.
    pub fn clear(&mut self) {
        self.assets.clear();
        self.drag = None;
    }

    /// Composite layers for a base image of `canvas` pixels, in paint order.
    pub fn layers(&self, canvas: Size) -> Vec<CompositeLayer<'_>> {
        let container_aspect = canvas.width / canvas.height;
        self.assets
            .iter()
            .map(|a| CompositeLayer {
                sprite: &a.raster,
                center: a.placement.center,
                width_percent: a.placement.width_percent(&self.opts),
                height_percent: a.placement.height_percent(&self.opts, container_aspect),
            })
            .collect()
    }
}

fn clamp_center(p: Point) -> Point {
    Point::new(clamp_unit(p.x), clamp_unit(p.y))
}

#[cfg(test)]
#[path = "../../tests/unit/placement/engine.rs"]
mod tests;
