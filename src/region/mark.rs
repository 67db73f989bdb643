use crate::foundation::core::{Point, Rect};

/// Stable hotspot identifier.
pub type MarkId = String;

/// What kind of content a hotspot carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    /// Rendered text.
    Text,
    /// A picture, generated or uploaded.
    Image,
}

/// Typographic role of a text hotspot, used as a hint by the content generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypographyRole {
    /// Primary title.
    Headline,
    /// Secondary title.
    Subheadline,
    /// Running text.
    Body,
    /// Small print or captions.
    Caption,
    /// Call to action.
    CallToAction,
}

/// One of the four resize handles of a hotspot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

impl ResizeHandle {
    /// The diagonally opposite handle.
    pub fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }

    pub(crate) fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    pub(crate) fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// A normalized rectangular region on a template.
///
/// All four geometric fields are fractions of the template's width/height. The serialized form is
/// the persisted hotspot schema: `id, kind, center_x, center_y, width, height, label` and an
/// optional `typography_role`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mark {
    /// Stable identifier.
    pub id: MarkId,
    /// Content kind.
    pub kind: MarkKind,
    /// Normalized center x.
    pub center_x: f64,
    /// Normalized center y.
    pub center_y: f64,
    /// Normalized width.
    pub width: f64,
    /// Normalized height.
    pub height: f64,
    /// Free-form label shown to the user.
    #[serde(default)]
    pub label: String,
    /// Set for hotspots drawn in the current session; never persisted.
    #[serde(skip)]
    pub is_new: bool,
    /// Optional typographic role for text hotspots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography_role: Option<TypographyRole>,
}

impl Mark {
    /// Build a mark covering `rect` (normalized coordinates).
    pub fn from_rect(id: impl Into<MarkId>, kind: MarkKind, rect: Rect) -> Self {
        let center = rect.center();
        Self {
            id: id.into(),
            kind,
            center_x: center.x,
            center_y: center.y,
            width: rect.width(),
            height: rect.height(),
            label: String::new(),
            is_new: false,
            typography_role: None,
        }
    }

    /// Normalized center point.
    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// Normalized bounding rectangle `center ± size/2`.
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.center(), (self.width, self.height))
    }

    /// Point-in-rectangle test in normalized space, edges inclusive.
    pub fn contains(&self, p: Point) -> bool {
        let half_w = self.width * 0.5;
        let half_h = self.height * 0.5;
        p.x >= self.center_x - half_w
            && p.x <= self.center_x + half_w
            && p.y >= self.center_y - half_h
            && p.y <= self.center_y + half_h
    }

    /// Position of a given corner handle.
    pub fn corner(&self, handle: ResizeHandle) -> Point {
        let half_w = self.width * 0.5;
        let half_h = self.height * 0.5;
        let x = if handle.is_left() {
            self.center_x - half_w
        } else {
            self.center_x + half_w
        };
        let y = if handle.is_top() {
            self.center_y - half_h
        } else {
            self.center_y + half_h
        };
        Point::new(x, y)
    }
}
