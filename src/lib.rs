//! Overlayer turns template images into composites.
//!
//! A template carries normalized rectangular hotspots. Each hotspot receives generated or
//! uploaded content, which is prepared into a trimmed sprite with a real alpha channel, placed
//! and scaled independently of the hotspot, and finally baked onto the base image:
//!
//! - Edit hotspots with [`RegionModel`] (or the event-driven [`EditorSession`])
//! - Prepare sprites with [`OverlayPreparer`]
//! - Place them with [`PlacementEngine`]
//! - Flatten with [`render_composite`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod compose;
pub(crate) mod external;
pub(crate) mod placement;
pub(crate) mod prepare;
pub(crate) mod project;
pub(crate) mod region;
pub(crate) mod session;
pub(crate) mod signature;
pub(crate) mod viewport;

pub use crate::foundation::core::{Point, Raster, Rect, Size, Vec2};
pub use crate::foundation::error::{OverlayerError, OverlayerResult};

pub use crate::compose::composite::{
    CompositeLayer, PremulRgba8, over, over_straight, overlay_pixel_rect, render_composite,
};
pub use crate::external::{BackgroundMatter, ContentGenerator, NoMatting, PlacementHint};
pub use crate::placement::engine::{
    OverlayAsset, OverlayDrag, OverlayOrigin, Placement, PlacementEngine, PlacementOpts,
};
pub use crate::prepare::background::{
    BorderBackground, BorderSampling, detect_border_background, strip_background,
};
pub use crate::prepare::batch::{
    BatchOpts, PrepareInput, PrepareOutcome, PrepareRequest, prepare_batch,
};
pub use crate::prepare::pipeline::{AlphaSource, OverlayPreparer, PrepareOpts, PreparedOverlay};
pub use crate::prepare::surface::{ImageSurface, RasterSurface};
pub use crate::prepare::trim::{PixelBounds, TrimOutcome, alpha_bounds, trim_to_alpha};
pub use crate::project::{Project, ProjectOverlay, compose_project, encode_png};
pub use crate::region::mark::{Mark, MarkId, MarkKind, ResizeHandle, TypographyRole};
pub use crate::region::model::{
    DrawGesture, MoveGesture, RegionModel, RegionOpts, ResizeGesture,
};
pub use crate::region::template::Template;
pub use crate::session::editor::{CommitOutcome, ContentRequest, EditorOpts, EditorSession};
pub use crate::session::gesture::{
    Gesture, GestureEnd, Modifiers, PointerButton, PointerInput,
};
pub use crate::signature::cache::{
    CacheDecision, ContentInput, LineMode, PreparationTicket, Signature, SignatureCache,
    reconcile, signature_of,
};
pub use crate::viewport::transform::{PanGesture, ViewportFrame, ViewportOpts, ViewportState};
