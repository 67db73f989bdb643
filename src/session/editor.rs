use crate::compose::composite::render_composite;
use crate::external::PlacementHint;
use crate::foundation::core::{Point, Raster, Size, Vec2};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::placement::engine::{OverlayOrigin, PlacementEngine, PlacementOpts};
use crate::prepare::pipeline::PreparedOverlay;
use crate::prepare::surface::RasterSurface;
use crate::region::mark::{Mark, MarkId, MarkKind, ResizeHandle};
use crate::region::model::{RegionModel, RegionOpts};
use crate::session::gesture::{Gesture, GestureEnd, Modifiers, PointerButton, PointerInput};
use crate::signature::cache::{CacheDecision, ContentInput, PreparationTicket, SignatureCache};
use crate::viewport::transform::{ViewportFrame, ViewportOpts, ViewportState};

/// Options for every component of an editing session.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct EditorOpts {
    /// Hotspot rules.
    pub region: RegionOpts,
    /// Zoom limits.
    pub viewport: ViewportOpts,
    /// Overlay sizing rules.
    pub placement: PlacementOpts,
}

/// Whether a finished preparation was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The overlay was placed.
    Applied,
    /// The hotspot was deleted or its content changed meanwhile; the result was dropped.
    Stale,
}

/// Content needed for one enabled hotspot.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentRequest {
    /// Target hotspot.
    pub mark_id: MarkId,
    /// User label of the hotspot.
    pub label: String,
    /// Geometry hint for content generators.
    pub hint: PlacementHint,
}

/// One template editing session: hotspots, viewport, overlays and content signatures, driven by
/// discrete pointer events. At most one gesture is active at a time.
#[derive(Clone, Debug)]
pub struct EditorSession {
    viewport_opts: ViewportOpts,
    frame: ViewportFrame,
    viewport: ViewportState,
    regions: RegionModel,
    placements: PlacementEngine,
    signatures: SignatureCache,
    gesture: Gesture,
    tool: MarkKind,
}

impl EditorSession {
    /// New session for an image laid out as `frame`.
    pub fn new(opts: EditorOpts, frame: ViewportFrame) -> Self {
        Self {
            viewport_opts: opts.viewport,
            frame,
            viewport: ViewportState::default(),
            regions: RegionModel::new(opts.region),
            placements: PlacementEngine::new(opts.placement),
            signatures: SignatureCache::new(),
            gesture: Gesture::Idle,
            tool: MarkKind::Text,
        }
    }

    /// Hotspots.
    pub fn regions(&self) -> &RegionModel {
        &self.regions
    }

    /// Mutable hotspots, for label and enablement edits.
    pub fn regions_mut(&mut self) -> &mut RegionModel {
        &mut self.regions
    }

    /// Overlays.
    pub fn placements(&self) -> &PlacementEngine {
        &self.placements
    }

    /// Content signatures.
    pub fn signatures(&self) -> &SignatureCache {
        &self.signatures
    }

    /// Pan and zoom.
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Screen layout.
    pub fn frame(&self) -> &ViewportFrame {
        &self.frame
    }

    /// Update the screen layout, e.g. after a window resize.
    pub fn set_frame(&mut self, frame: ViewportFrame) {
        self.frame = frame;
    }

    /// Active gesture.
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Kind of hotspot created by the next draw.
    pub fn set_tool(&mut self, kind: MarkKind) {
        self.tool = kind;
    }

    fn ensure_idle(&self, wanted: &str) -> OverlayerResult<()> {
        if self.gesture.is_idle() {
            return Ok(());
        }
        Err(OverlayerError::gesture(format!(
            "cannot start {wanted} while a {} gesture is active",
            self.gesture.name()
        )))
    }

    /// Start a pan, a hotspot move or a hotspot draw, depending on the input.
    ///
    /// A primary press outside the image starts nothing.
    pub fn pointer_down(&mut self, input: PointerInput) -> OverlayerResult<()> {
        self.ensure_idle("a pointer gesture")?;

        if input.button == PointerButton::Middle || input.modifiers.pans() {
            self.gesture = Gesture::Panning(self.viewport.begin_pan(input.position));
            return Ok(());
        }
        if input.button != PointerButton::Primary {
            return Ok(());
        }

        let Some(p) = self.viewport.screen_to_normalized(&self.frame, input.position) else {
            return Ok(());
        };
        self.gesture = match self.regions.hit_test(p).map(|m| m.id.clone()) {
            Some(id) => Gesture::MovingMark {
                gesture: self.regions.begin_move(&id)?,
                start_pointer: input.position,
            },
            None => Gesture::Drawing(self.regions.begin_draw(self.tool, p)),
        };
        Ok(())
    }

    /// Start resizing `mark_id` by `handle`.
    pub fn begin_resize(&mut self, mark_id: &str, handle: ResizeHandle) -> OverlayerResult<()> {
        self.ensure_idle("a resize")?;
        self.gesture = Gesture::Resizing(self.regions.begin_resize(mark_id, handle)?);
        Ok(())
    }

    /// Start dragging the overlay of `mark_id` from screen position `pointer`.
    pub fn begin_overlay_drag(&mut self, mark_id: &str, pointer: Point) -> OverlayerResult<()> {
        self.ensure_idle("an overlay drag")?;
        let container = self.viewport.rendered_image_rect(&self.frame);
        self.placements.begin_drag(mark_id, pointer, container)?;
        self.gesture = Gesture::DraggingOverlay;
        Ok(())
    }

    /// Feed a pointer position to the active gesture.
    pub fn pointer_move(&mut self, position: Point) -> OverlayerResult<()> {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing(g) => {
                if let Some(p) = self.viewport.screen_to_image(&self.frame, position) {
                    self.regions.update_draw(g, p);
                }
            }
            Gesture::MovingMark {
                gesture,
                start_pointer,
            } => {
                let delta = self
                    .viewport
                    .screen_delta_to_normalized(&self.frame, position - *start_pointer);
                self.regions.move_mark(gesture, delta)?;
            }
            Gesture::Resizing(g) => {
                if let Some(p) = self.viewport.screen_to_image(&self.frame, position) {
                    self.regions.resize(g, p)?;
                }
            }
            Gesture::Panning(g) => self.viewport.update_pan(g, position),
            Gesture::DraggingOverlay => {
                self.placements.update_drag(position)?;
            }
        }
        Ok(())
    }

    /// Apply the final pointer position and finish the active gesture.
    pub fn pointer_up(&mut self, position: Point) -> OverlayerResult<GestureEnd> {
        self.pointer_move(position)?;
        let end = match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureEnd::None,
            Gesture::Drawing(g) => match self.regions.commit_draw(g) {
                Some(id) => GestureEnd::MarkCreated(id),
                None => GestureEnd::DraftDiscarded,
            },
            Gesture::MovingMark { gesture, .. } => {
                GestureEnd::MarkMoved(gesture.mark_id().to_string())
            }
            Gesture::Resizing(g) => GestureEnd::MarkResized(g.mark_id().to_string()),
            Gesture::Panning(_) => GestureEnd::Panned,
            Gesture::DraggingOverlay => match self.placements.end_drag() {
                Some(drag) => GestureEnd::OverlayMoved(drag.asset_id().to_string()),
                None => GestureEnd::None,
            },
        };
        Ok(end)
    }

    /// Drop the active gesture. A draft is discarded and a moved hotspot returns to its start.
    pub fn cancel_gesture(&mut self) -> OverlayerResult<()> {
        match std::mem::take(&mut self.gesture) {
            Gesture::MovingMark { gesture, .. } => {
                self.regions.move_mark(&gesture, Vec2::ZERO)?;
            }
            Gesture::DraggingOverlay => {
                self.placements.end_drag();
            }
            _ => {}
        }
        Ok(())
    }

    /// Zoom around `pointer` when a zoom modifier is held. Returns whether the scale changed.
    pub fn wheel(
        &mut self,
        pointer: Point,
        delta_y: f64,
        modifiers: Modifiers,
    ) -> bool {
        if !modifiers.zooms() {
            return false;
        }
        self.viewport
            .zoom_at(&self.viewport_opts, &self.frame, pointer, delta_y)
    }

    /// Reset pan and zoom.
    pub fn double_click(&mut self) {
        self.viewport.reset();
    }

    /// Record new content for `mark_id`.
    ///
    /// Returns a ticket when the content differs from what the current overlay was built from;
    /// the outdated overlay is removed. Identical content returns `None`.
    pub fn set_content(
        &mut self,
        mark_id: &str,
        input: &ContentInput,
    ) -> OverlayerResult<Option<PreparationTicket>> {
        if self.regions.get(mark_id).is_none() {
            return Err(OverlayerError::unknown_mark(mark_id));
        }
        let (signature, decision) = self.signatures.update(mark_id, input);
        match decision {
            CacheDecision::Keep => Ok(None),
            CacheDecision::Invalidate => {
                if self
                    .placements
                    .get(mark_id)
                    .is_some_and(|a| a.signature != signature)
                {
                    self.placements.remove(mark_id);
                }
                Ok(Some(PreparationTicket {
                    mark_id: mark_id.to_string(),
                    signature,
                }))
            }
        }
    }

    /// Apply a finished preparation, unless its hotspot was deleted or re-edited meanwhile.
    ///
    /// Errors of a current preparation are returned to the caller and clear the hotspot's
    /// signature, so submitting the same content again issues a fresh ticket. Stale results are
    /// dropped regardless of success.
    pub fn commit_prepared(
        &mut self,
        ticket: &PreparationTicket,
        result: OverlayerResult<PreparedOverlay>,
        origin: OverlayOrigin,
    ) -> OverlayerResult<CommitOutcome> {
        let mark = match self.regions.get(&ticket.mark_id) {
            Some(m) if self.signatures.is_current(ticket) => m.clone(),
            _ => {
                tracing::debug!(mark = %ticket.mark_id, "discarding stale preparation result");
                return Ok(CommitOutcome::Stale);
            }
        };
        let created = result.and_then(|prepared| {
            self.placements
                .create(&mark, prepared, ticket.signature.clone(), origin)
                .map(|_| ())
        });
        if let Err(err) = created {
            // No overlay backs the signature, so the same content must be retryable.
            self.signatures.forget(&ticket.mark_id);
            return Err(err);
        }
        Ok(CommitOutcome::Applied)
    }

    /// Change the scale of an overlay, clamped to the allowed range.
    pub fn set_overlay_scale(&mut self, mark_id: &str, scale: f64) -> OverlayerResult<f64> {
        self.placements.set_scale(mark_id, scale)
    }

    /// Change the scale of an overlay from a slider position in percent.
    pub fn set_overlay_slider(&mut self, mark_id: &str, slider: f64) -> OverlayerResult<f64> {
        self.placements.set_scale_from_slider(mark_id, slider)
    }

    /// Move an overlay to a normalized center, keeping it inside the image.
    pub fn set_overlay_center(&mut self, mark_id: &str, center: Point) -> OverlayerResult<Point> {
        let size = self.frame.image_size;
        let aspect = if size.height > 0.0 {
            size.width / size.height
        } else {
            1.0
        };
        self.placements.set_center(mark_id, center, aspect)
    }

    /// Put an overlay back onto its hotspot at scale 1.
    pub fn reset_overlay(&mut self, mark_id: &str) -> OverlayerResult<()> {
        let mark = self
            .regions
            .get(mark_id)
            .ok_or_else(|| OverlayerError::unknown_mark(mark_id))?;
        self.placements.reset(mark_id, mark)
    }

    /// Delete a hotspot together with its overlay and signature.
    pub fn delete_mark(&mut self, mark_id: &str) -> OverlayerResult<Mark> {
        let mark = self.regions.delete(mark_id)?;
        if self.gesture.mark_id() == Some(mark_id) {
            self.gesture = Gesture::Idle;
        }
        if self
            .placements
            .active_drag()
            .is_some_and(|d| d.asset_id() == mark_id)
        {
            self.gesture = Gesture::Idle;
        }
        self.placements.remove(mark_id);
        self.signatures.forget(mark_id);
        Ok(mark)
    }

    /// Swap in a new set of hotspots, dropping every overlay and signature.
    ///
    /// In-flight preparations for the old hotspots become stale.
    pub fn replace_template(&mut self, marks: Vec<Mark>) -> OverlayerResult<()> {
        let removed = self.regions.replace_template(marks)?;
        tracing::debug!(removed = removed.len(), "replaced template");
        self.gesture = Gesture::Idle;
        self.placements.clear();
        self.signatures.clear();
        Ok(())
    }

    /// One content request per enabled hotspot, in hotspot order.
    pub fn content_requests(&self) -> Vec<ContentRequest> {
        self.regions
            .enabled_marks()
            .map(|m| ContentRequest {
                mark_id: m.id.clone(),
                label: m.label.clone(),
                hint: PlacementHint::from_mark(m),
            })
            .collect()
    }

    /// Flatten the overlays of enabled hotspots onto `base`.
    pub fn composite(&self, surface: &dyn RasterSurface, base: &Raster) -> OverlayerResult<Raster> {
        let canvas = Size::new(f64::from(base.width), f64::from(base.height));
        let layers: Vec<_> = self
            .placements
            .layers(canvas)
            .into_iter()
            .zip(self.placements.assets())
            .filter(|(_, asset)| self.regions.is_enabled(&asset.mark_id))
            .map(|(layer, _)| layer)
            .collect();
        render_composite(surface, base, &layers)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
