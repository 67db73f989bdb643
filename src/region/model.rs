use std::collections::BTreeSet;

use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::foundation::math::clamp_unit;
use crate::region::mark::{Mark, MarkId, MarkKind, ResizeHandle};

/// Tunables for hotspot geometry.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct RegionOpts {
    /// Minimum normalized width/height of a committed or resized hotspot.
    pub min_size: f64,
}

impl Default for RegionOpts {
    fn default() -> Self {
        Self { min_size: 0.01 }
    }
}

/// In-progress draw gesture. Both corners are clamped to the unit square.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawGesture {
    kind: MarkKind,
    start: Point,
    current: Point,
}

impl DrawGesture {
    /// Content kind of the hotspot being drawn.
    pub fn kind(&self) -> MarkKind {
        self.kind
    }

    /// Current draft rectangle (may be zero-sized).
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}

/// In-progress move gesture: the center captured at gesture start.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveGesture {
    mark_id: MarkId,
    start_center: Point,
}

impl MoveGesture {
    /// Hotspot being moved.
    pub fn mark_id(&self) -> &str {
        &self.mark_id
    }
}

/// In-progress resize gesture: the active handle and the fixed opposite corner.
#[derive(Clone, Debug, PartialEq)]
pub struct ResizeGesture {
    mark_id: MarkId,
    handle: ResizeHandle,
    anchor: Point,
}

impl ResizeGesture {
    /// Hotspot being resized.
    pub fn mark_id(&self) -> &str {
        &self.mark_id
    }

    /// The corner held fixed for the duration of the gesture.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Active handle.
    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }
}

/// Owns the hotspots of the current template.
///
/// Marks are kept in creation order; hit-testing prefers the most recently added mark, which is
/// the one painted on top.
#[derive(Clone, Debug, Default)]
pub struct RegionModel {
    opts: RegionOpts,
    marks: Vec<Mark>,
    disabled: BTreeSet<MarkId>,
    next_id: u64,
}

impl RegionModel {
    /// Empty model.
    pub fn new(opts: RegionOpts) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    /// Active options.
    pub fn opts(&self) -> RegionOpts {
        self.opts
    }

    /// All marks in creation order.
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Look up a mark by id.
    pub fn get(&self, id: &str) -> Option<&Mark> {
        self.marks.iter().find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: &str) -> OverlayerResult<&mut Mark> {
        self.marks
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| OverlayerError::unknown_mark(id))
    }

    /// Add a mark loaded from a template. Ids must be unique.
    pub fn insert(&mut self, mark: Mark) -> OverlayerResult<()> {
        if self.get(&mark.id).is_some() {
            return Err(OverlayerError::validation(format!(
                "duplicate mark id '{}'",
                mark.id
            )));
        }
        self.marks.push(mark);
        Ok(())
    }

    /// Drop every mark and load `marks` in their place. Returns the ids that were removed.
    pub fn replace_template(&mut self, marks: Vec<Mark>) -> OverlayerResult<Vec<MarkId>> {
        let mut seen = BTreeSet::new();
        for m in &marks {
            if !seen.insert(m.id.as_str()) {
                return Err(OverlayerError::validation(format!(
                    "duplicate mark id '{}'",
                    m.id
                )));
            }
        }
        let removed = self.marks.drain(..).map(|m| m.id).collect();
        self.disabled.clear();
        self.marks = marks;
        Ok(removed)
    }

    /// Topmost mark containing the normalized point.
    pub fn hit_test(&self, p: Point) -> Option<&Mark> {
        self.marks.iter().rev().find(|m| m.contains(p))
    }

    /// Start drawing a new hotspot at `start`.
    pub fn begin_draw(&self, kind: MarkKind, start: Point) -> DrawGesture {
        let start = clamp_point(start);
        DrawGesture {
            kind,
            start,
            current: start,
        }
    }

    /// Move the free corner of a draw gesture.
    pub fn update_draw(&self, gesture: &mut DrawGesture, current: Point) {
        gesture.current = clamp_point(current);
    }

    /// Finish a draw gesture. Drafts smaller than the minimum size are discarded and yield `None`.
    pub fn commit_draw(&mut self, gesture: DrawGesture) -> Option<MarkId> {
        let rect = gesture.rect();
        if rect.width() < self.opts.min_size || rect.height() < self.opts.min_size {
            tracing::debug!(
                width = rect.width(),
                height = rect.height(),
                "discarding undersized hotspot draft"
            );
            return None;
        }

        let id = self.allocate_id();
        let mut mark = Mark::from_rect(id.clone(), gesture.kind, rect);
        mark.is_new = true;
        self.marks.push(mark);
        Some(id)
    }

    fn allocate_id(&mut self) -> MarkId {
        loop {
            self.next_id += 1;
            let id = format!("mark-{}", self.next_id);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Capture the current center of `id` for a move gesture.
    pub fn begin_move(&self, id: &str) -> OverlayerResult<MoveGesture> {
        let mark = self.get(id).ok_or_else(|| OverlayerError::unknown_mark(id))?;
        Ok(MoveGesture {
            mark_id: mark.id.clone(),
            start_center: mark.center(),
        })
    }

    /// Place the mark at its gesture-start center plus `delta` (normalized, total since start).
    ///
    /// No clamping is applied; a hotspot may extend past the template while dragged.
    pub fn move_mark(&mut self, gesture: &MoveGesture, delta: Vec2) -> OverlayerResult<()> {
        let mark = self.get_mut(&gesture.mark_id)?;
        let c = gesture.start_center + delta;
        mark.center_x = c.x;
        mark.center_y = c.y;
        Ok(())
    }

    /// Capture the corner opposite to `handle` for a resize gesture.
    pub fn begin_resize(&self, id: &str, handle: ResizeHandle) -> OverlayerResult<ResizeGesture> {
        let mark = self.get(id).ok_or_else(|| OverlayerError::unknown_mark(id))?;
        Ok(ResizeGesture {
            mark_id: mark.id.clone(),
            handle,
            anchor: mark.corner(handle.opposite()),
        })
    }

    /// Move the active corner to `new_point`, keeping the anchor fixed.
    ///
    /// Each axis is clamped only so the anchor is never crossed and the resulting size is at least
    /// the minimum size. The free corner is not clamped to the image, so a hotspot that was moved
    /// past the edge does not jump when the resize starts.
    pub fn resize(&mut self, gesture: &ResizeGesture, new_point: Point) -> OverlayerResult<()> {
        let min = self.opts.min_size;
        let anchor = gesture.anchor;
        let handle = gesture.handle;

        let width = if handle.is_left() {
            (anchor.x - new_point.x).max(min)
        } else {
            (new_point.x - anchor.x).max(min)
        };
        let height = if handle.is_top() {
            (anchor.y - new_point.y).max(min)
        } else {
            (new_point.y - anchor.y).max(min)
        };

        let center_x = if handle.is_left() {
            anchor.x - width * 0.5
        } else {
            anchor.x + width * 0.5
        };
        let center_y = if handle.is_top() {
            anchor.y - height * 0.5
        } else {
            anchor.y + height * 0.5
        };

        let mark = self.get_mut(&gesture.mark_id)?;
        mark.center_x = center_x;
        mark.center_y = center_y;
        mark.width = width;
        mark.height = height;
        Ok(())
    }

    /// Replace the label of a mark.
    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> OverlayerResult<()> {
        self.get_mut(id)?.label = label.into();
        Ok(())
    }

    /// Remove a mark, returning it.
    pub fn delete(&mut self, id: &str) -> OverlayerResult<Mark> {
        let idx = self
            .marks
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| OverlayerError::unknown_mark(id))?;
        self.disabled.remove(id);
        Ok(self.marks.remove(idx))
    }

    /// Enable or disable content generation for a mark.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> OverlayerResult<()> {
        if self.get(id).is_none() {
            return Err(OverlayerError::unknown_mark(id));
        }
        if enabled {
            self.disabled.remove(id);
        } else {
            self.disabled.insert(id.to_string());
        }
        Ok(())
    }

    /// Whether a mark exists and is enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.get(id).is_some() && !self.disabled.contains(id)
    }

    /// Enabled marks in creation order.
    pub fn enabled_marks(&self) -> impl Iterator<Item = &Mark> {
        self.marks
            .iter()
            .filter(|m| !self.disabled.contains(&m.id))
    }
}

fn clamp_point(p: Point) -> Point {
    Point::new(clamp_unit(p.x), clamp_unit(p.y))
}

#[cfg(test)]
#[path = "../../tests/unit/region/model.rs"]
mod tests;
