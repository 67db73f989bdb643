use std::sync::Arc;

use crate::external::{BackgroundMatter, ContentGenerator, PlacementHint};
use crate::foundation::core::Raster;
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::prepare::background::{BorderSampling, detect_border_background, strip_background};
use crate::prepare::surface::{ImageSurface, RasterSurface};
use crate::prepare::trim::{TrimOutcome, trim_to_alpha};

/// Thresholds used by the overlay preparation pipeline.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct PrepareOpts {
    /// Any pixel with alpha strictly below this counts as transparency.
    pub opaque_alpha: u8,
    /// Pixels with alpha strictly above this are kept by the trim.
    pub trim_alpha: u8,
    /// Approximate border samples per edge.
    pub samples_per_edge: u32,
    /// Per-channel histogram bucket width.
    pub quantize_step: u8,
    /// Minimum share of border samples the dominant color must hold.
    pub dominance_ratio: f64,
    /// Strip tolerance when no matting service is configured.
    pub border_tolerance: f64,
    /// Strip tolerance after a configured matting service failed.
    pub fallback_tolerance: f64,
}

impl Default for PrepareOpts {
    fn default() -> Self {
        Self {
            opaque_alpha: 250,
            trim_alpha: 4,
            samples_per_edge: 25,
            quantize_step: 16,
            dominance_ratio: 0.55,
            border_tolerance: 20.0,
            fallback_tolerance: 22.0,
        }
    }
}

impl PrepareOpts {
    /// Reject option sets the pipeline cannot run with.
    pub fn validate(&self) -> OverlayerResult<()> {
        if self.samples_per_edge == 0 {
            return Err(OverlayerError::validation("samples_per_edge must be >= 1"));
        }
        if self.quantize_step == 0 {
            return Err(OverlayerError::validation("quantize_step must be >= 1"));
        }
        if !(self.dominance_ratio > 0.0 && self.dominance_ratio <= 1.0) {
            return Err(OverlayerError::validation(
                "dominance_ratio must be in (0, 1]",
            ));
        }
        if !(self.border_tolerance >= 0.0 && self.fallback_tolerance >= 0.0) {
            return Err(OverlayerError::validation("tolerances must be >= 0"));
        }
        Ok(())
    }

    /// Border sampling parameters.
    pub fn border_sampling(&self) -> BorderSampling {
        BorderSampling {
            samples_per_edge: self.samples_per_edge,
            quantize_step: self.quantize_step,
            dominance_ratio: self.dominance_ratio,
        }
    }
}

/// Where the alpha channel of a prepared overlay came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaSource {
    /// The input already carried transparency.
    Existing,
    /// Produced by the external matting service.
    Matting,
    /// Produced by stripping a dominant border color.
    BorderStrip,
    /// No alpha was produced; only returned when transparency was not enforced.
    None,
}

/// Output of the preparation pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedOverlay {
    /// Straight RGBA pixels, cropped to the alpha bounds.
    pub raster: Raster,
    /// Whether the raster carries usable transparency.
    pub has_alpha: bool,
    /// Origin of the alpha channel.
    pub source: AlphaSource,
    /// Whether the trim cropped the raster.
    pub trimmed: bool,
}

impl PreparedOverlay {
    /// Width over height of the prepared raster.
    pub fn aspect_ratio(&self) -> f64 {
        self.raster.aspect_ratio()
    }
}

/// Turns arbitrary generated or uploaded images into trimmed, alpha-correct sprites.
///
/// Every call works on its own owned raster, so one preparer can serve concurrent
/// preparations for different hotspots.
#[derive(Clone)]
pub struct OverlayPreparer {
    opts: PrepareOpts,
    surface: Arc<dyn RasterSurface>,
    matter: Option<Arc<dyn BackgroundMatter>>,
}

impl std::fmt::Debug for OverlayPreparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayPreparer")
            .field("opts", &self.opts)
            .field("matting", &self.matter.is_some())
            .finish()
    }
}

impl OverlayPreparer {
    /// Preparer backed by [`ImageSurface`] and no matting service.
    pub fn new(opts: PrepareOpts) -> OverlayerResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            surface: Arc::new(ImageSurface),
            matter: None,
        })
    }

    /// Use `matter` for step 3 before falling back to border stripping.
    pub fn with_matter(mut self, matter: Arc<dyn BackgroundMatter>) -> Self {
        self.matter = Some(matter);
        self
    }

    /// Replace the raster surface.
    pub fn with_surface(mut self, surface: Arc<dyn RasterSurface>) -> Self {
        self.surface = surface;
        self
    }

    /// Raster surface used for decode, encode and resampling.
    pub fn surface(&self) -> &Arc<dyn RasterSurface> {
        &self.surface
    }

    /// Options in effect.
    pub fn opts(&self) -> &PrepareOpts {
        &self.opts
    }

    /// Decode `bytes` and run the pipeline.
    ///
    /// Bytes carry no record of an earlier preparation. A sprite that was trimmed down to fully
    /// opaque pixels looks like a flat image again, and with `enforce_transparency` it fails with
    /// [`OverlayerError::TransparencyUnattainable`]. Use [`OverlayPreparer::refresh`] to re-run
    /// the pipeline on a [`PreparedOverlay`].
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn prepare(&self, bytes: &[u8], enforce_transparency: bool) -> OverlayerResult<PreparedOverlay> {
        let raster = self.surface.decode(bytes)?;
        self.run(raster, Some(bytes), enforce_transparency)
    }

    /// Run the pipeline on an already decoded raster.
    #[tracing::instrument(skip(self, raster), fields(w = raster.width, h = raster.height))]
    pub fn prepare_raster(
        &self,
        raster: Raster,
        enforce_transparency: bool,
    ) -> OverlayerResult<PreparedOverlay> {
        if raster.is_empty() {
            return Err(OverlayerError::decode("raster has no pixels"));
        }
        self.run(raster, None, enforce_transparency)
    }

    /// Re-run the trim on an overlay this preparer already produced.
    ///
    /// An established alpha channel is trusted as-is: a sprite that was trimmed down to fully
    /// opaque pixels is not stripped a second time. This is the idempotent path; feeding the
    /// encoded sprite back into [`OverlayPreparer::prepare`] is not.
    pub fn refresh(&self, prepared: &PreparedOverlay) -> OverlayerResult<PreparedOverlay> {
        if !prepared.has_alpha {
            return self.prepare_raster(prepared.raster.clone(), false);
        }
        let mut raster = prepared.raster.clone();
        let trimmed = self.trim(&mut raster)?;
        Ok(PreparedOverlay {
            raster,
            has_alpha: true,
            source: prepared.source,
            trimmed: prepared.trimmed || trimmed,
        })
    }

    /// Ask `generator` for an image and prepare it with transparency enforced.
    #[tracing::instrument(skip(self, generator, hint))]
    pub fn prepare_generated(
        &self,
        generator: &dyn ContentGenerator,
        description: &str,
        hint: &PlacementHint,
        size_hint: (u32, u32),
    ) -> OverlayerResult<PreparedOverlay> {
        let bytes = generator.generate(description, hint, size_hint)?;
        self.prepare(&bytes, true)
    }

    fn run(
        &self,
        mut raster: Raster,
        encoded: Option<&[u8]>,
        enforce_transparency: bool,
    ) -> OverlayerResult<PreparedOverlay> {
        let opts = &self.opts;

        let source = if raster.has_translucency(opts.opaque_alpha) {
            AlphaSource::Existing
        } else if !enforce_transparency {
            return Ok(PreparedOverlay {
                raster,
                has_alpha: false,
                source: AlphaSource::None,
                trimmed: false,
            });
        } else {
            match self.matte(&raster, encoded) {
                Ok(matted) => {
                    let mut out = self.run(matted, None, false)?;
                    if !out.has_alpha {
                        return Err(OverlayerError::transparency(
                            "unable to produce a transparent overlay",
                        ));
                    }
                    out.source = AlphaSource::Matting;
                    return Ok(out);
                }
                Err(err) => {
                    let tolerance = if self.matter.is_some() {
                        tracing::debug!(error = %err, "matting failed, stripping border color");
                        opts.fallback_tolerance
                    } else {
                        opts.border_tolerance
                    };
                    self.strip_border(&mut raster, tolerance);
                    AlphaSource::BorderStrip
                }
            }
        };

        let has_alpha = raster.has_translucency(opts.opaque_alpha);
        let trimmed = self.trim(&mut raster)?;
        if !has_alpha {
            return Err(OverlayerError::transparency(
                "unable to produce a transparent overlay",
            ));
        }

        Ok(PreparedOverlay {
            raster,
            has_alpha,
            source,
            trimmed,
        })
    }

    fn matte(&self, raster: &Raster, encoded: Option<&[u8]>) -> OverlayerResult<Raster> {
        let Some(matter) = &self.matter else {
            return Err(OverlayerError::matting("no matting service configured"));
        };
        let owned;
        let bytes = match encoded {
            Some(b) => b,
            None => {
                owned = self.surface.encode(raster)?;
                &owned
            }
        };
        let matted = matter.matte(bytes)?;
        self.surface
            .decode(&matted)
            .map_err(|e| OverlayerError::matting(format!("matting returned undecodable data: {e}")))
    }

    fn strip_border(&self, raster: &mut Raster, tolerance: f64) {
        match detect_border_background(raster, &self.opts.border_sampling()) {
            Some(bg) => {
                let cleared = strip_background(raster, bg.color, tolerance);
                tracing::debug!(color = ?bg.color, share = bg.share, cleared, "stripped border color");
            }
            None => tracing::debug!("no dominant border color, skipping strip"),
        }
    }

    fn trim(&self, raster: &mut Raster) -> OverlayerResult<bool> {
        match trim_to_alpha(raster, self.opts.trim_alpha)? {
            TrimOutcome::Cropped(_) => Ok(true),
            TrimOutcome::Unchanged => Ok(false),
            TrimOutcome::EmptyBounds => Err(OverlayerError::transparency(
                "overlay is fully transparent after background removal",
            )),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/prepare/pipeline.rs"]
mod tests;
