use crate::foundation::core::{Point, Rect, Size, Vec2};

/// Zoom limits and wheel step.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ViewportOpts {
    /// Smallest allowed scale.
    pub min_scale: f64,
    /// Largest allowed scale.
    pub max_scale: f64,
    /// Multiplicative factor applied per wheel notch.
    pub zoom_step: f64,
}

impl Default for ViewportOpts {
    fn default() -> Self {
        Self {
            min_scale: 0.25,
            max_scale: 4.0,
            zoom_step: 1.05,
        }
    }
}

/// Screen-space layout of the editing surface at scale 1.
///
/// The template image is drawn centered on `center` with its untransformed pixel size
/// `image_size`; pan and zoom are applied around that center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportFrame {
    /// Screen position of the viewport center.
    pub center: Point,
    /// Rendered image size in screen pixels before zoom.
    pub image_size: Size,
}

impl ViewportFrame {
    /// Construct a frame.
    pub fn new(center: Point, image_size: Size) -> Self {
        Self { center, image_size }
    }
}

/// Pan gesture state captured at pointer down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanGesture {
    start_pointer: Point,
    start_offset: Vec2,
}

/// Pan + zoom state of the editing surface. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// Uniform zoom factor.
    pub scale: f64,
    /// Translation in screen pixels, relative to the viewport center.
    pub offset: Vec2,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ViewportState {
    /// Restore `scale = 1`, `offset = (0,0)`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Capture the pointer and offset at the start of a pan.
    pub fn begin_pan(&self, pointer: Point) -> PanGesture {
        PanGesture {
            start_pointer: pointer,
            start_offset: self.offset,
        }
    }

    /// Set the offset to its gesture-start value plus the total pointer delta.
    pub fn update_pan(&mut self, gesture: &PanGesture, pointer: Point) {
        self.offset = gesture.start_offset + (pointer - gesture.start_pointer);
    }

    /// Zoom around the pointer by one wheel step.
    ///
    /// Negative `wheel_delta_y` zooms in. The content point under the pointer stays under the
    /// pointer. Returns whether the scale changed.
    pub fn zoom_at(
        &mut self,
        opts: &ViewportOpts,
        frame: &ViewportFrame,
        pointer: Point,
        wheel_delta_y: f64,
    ) -> bool {
        if wheel_delta_y == 0.0 || !wheel_delta_y.is_finite() {
            return false;
        }
        let rel = pointer - frame.center;
        let old_scale = self.scale;
        let content = (rel - self.offset) / old_scale;

        let factor = if wheel_delta_y < 0.0 {
            opts.zoom_step
        } else {
            1.0 / opts.zoom_step
        };
        let new_scale = (old_scale * factor).clamp(opts.min_scale, opts.max_scale);
        if new_scale == old_scale {
            return false;
        }

        self.scale = new_scale;
        self.offset = rel - content * new_scale;
        true
    }

    /// Undo pan/zoom: screen point to content space (pixels relative to the image center).
    pub fn to_content(&self, frame: &ViewportFrame, pointer: Point) -> Vec2 {
        (pointer - frame.center - self.offset) / self.scale
    }

    /// Apply pan/zoom: content-space vector to screen point.
    pub fn to_screen(&self, frame: &ViewportFrame, content: Vec2) -> Point {
        frame.center + self.offset + content * self.scale
    }

    /// Screen point to normalized image coordinates, or `None` outside the image.
    pub fn screen_to_normalized(&self, frame: &ViewportFrame, pointer: Point) -> Option<Point> {
        let p = self.screen_to_image(frame, pointer)?;
        if !(0.0..=1.0).contains(&p.x) || !(0.0..=1.0).contains(&p.y) {
            return None;
        }
        Some(p)
    }

    /// Screen point to normalized image coordinates, without rejecting points outside the image.
    ///
    /// Used while a gesture that started on the image keeps tracking the pointer.
    pub fn screen_to_image(&self, frame: &ViewportFrame, pointer: Point) -> Option<Point> {
        let size = frame.image_size;
        if size.width <= 0.0 || size.height <= 0.0 {
            return None;
        }
        let c = self.to_content(frame, pointer);
        Some(Point::new(
            (c.x + size.width * 0.5) / size.width,
            (c.y + size.height * 0.5) / size.height,
        ))
    }

    /// Normalized image coordinates to a screen point.
    pub fn normalized_to_screen(&self, frame: &ViewportFrame, p: Point) -> Point {
        let size = frame.image_size;
        let content = Vec2::new(
            (p.x - 0.5) * size.width,
            (p.y - 0.5) * size.height,
        );
        self.to_screen(frame, content)
    }

    /// Screen-pixel delta to a normalized-space delta.
    pub fn screen_delta_to_normalized(&self, frame: &ViewportFrame, delta: Vec2) -> Vec2 {
        let size = frame.image_size;
        if size.width <= 0.0 || size.height <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            delta.x / (self.scale * size.width),
            delta.y / (self.scale * size.height),
        )
    }

    /// On-screen rectangle currently covered by the image.
    pub fn rendered_image_rect(&self, frame: &ViewportFrame) -> Rect {
        let half = Vec2::new(frame.image_size.width * 0.5, frame.image_size.height * 0.5);
        Rect::from_points(self.to_screen(frame, -half), self.to_screen(frame, half))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/transform.rs"]
mod tests;
