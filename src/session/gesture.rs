use crate::foundation::core::Point;
use crate::region::model::{DrawGesture, MoveGesture, ResizeGesture};
use crate::viewport::transform::PanGesture;

/// Modifier keys held during a pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key.
    pub shift: bool,
    /// Control key.
    pub ctrl: bool,
    /// Meta / command key.
    pub meta: bool,
    /// Alt / option key.
    pub alt: bool,
}

impl Modifiers {
    /// Whether a drag should pan the viewport.
    pub fn pans(self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Whether a wheel event should zoom.
    pub fn zooms(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer button that started a gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button or primary touch.
    #[default]
    Primary,
    /// Middle button.
    Middle,
    /// Right button.
    Secondary,
}

/// A pointer press in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    /// Screen position.
    pub position: Point,
    /// Pressed button.
    pub button: PointerButton,
    /// Held modifiers.
    pub modifiers: Modifiers,
}

impl PointerInput {
    /// Primary-button press without modifiers.
    pub fn primary(position: Point) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
        }
    }
}

/// The single active gesture of an editing session.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Drawing a new hotspot.
    Drawing(DrawGesture),
    /// Moving an existing hotspot.
    MovingMark {
        /// Region model state.
        gesture: MoveGesture,
        /// Screen position at pointer down.
        start_pointer: Point,
    },
    /// Resizing a hotspot by one corner.
    Resizing(ResizeGesture),
    /// Panning the viewport.
    Panning(PanGesture),
    /// Dragging an overlay; state lives in the placement engine.
    DraggingOverlay,
}

impl Gesture {
    /// Whether no gesture is active.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Drawing(_) => "draw",
            Self::MovingMark { .. } => "move",
            Self::Resizing(_) => "resize",
            Self::Panning(_) => "pan",
            Self::DraggingOverlay => "overlay drag",
        }
    }

    /// Hotspot the gesture operates on, if any.
    pub fn mark_id(&self) -> Option<&str> {
        match self {
            Self::MovingMark { gesture, .. } => Some(gesture.mark_id()),
            Self::Resizing(g) => Some(g.mark_id()),
            _ => None,
        }
    }
}

/// What a finished gesture did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureEnd {
    /// No gesture was active.
    None,
    /// A hotspot was created.
    MarkCreated(String),
    /// The draft was too small and was dropped.
    DraftDiscarded,
    /// A hotspot was moved.
    MarkMoved(String),
    /// A hotspot was resized.
    MarkResized(String),
    /// The viewport was panned.
    Panned,
    /// An overlay was moved.
    OverlayMoved(String),
}
