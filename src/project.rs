use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{Point, Raster, Size};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::placement::engine::OverlayOrigin;
use crate::prepare::batch::{BatchOpts, PrepareInput, PrepareRequest, prepare_batch};
use crate::prepare::pipeline::{OverlayPreparer, PrepareOpts};
use crate::region::mark::{Mark, MarkId};
use crate::region::template::Template;
use crate::session::editor::{CommitOutcome, EditorOpts, EditorSession};
use crate::signature::cache::ContentInput;
use crate::viewport::transform::ViewportFrame;

/// One overlay of a [`Project`]: an image file bound to a hotspot.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectOverlay {
    /// Target hotspot.
    pub mark_id: MarkId,
    /// Image file, relative to the project file.
    pub source: PathBuf,
    /// How the image was produced; affects the initial size.
    #[serde(default = "default_origin")]
    pub origin: OverlayOrigin,
    /// Require a transparent result.
    #[serde(default = "default_true")]
    pub enforce_transparency: bool,
    /// Normalized center overriding the hotspot center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    /// Scale overriding 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

fn default_origin() -> OverlayOrigin {
    OverlayOrigin::UserUpload
}

fn default_true() -> bool {
    true
}

/// Everything needed to bake one composite from files on disk.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Project {
    /// Base template image, relative to the project file.
    pub base: PathBuf,
    /// Hotspots.
    pub marks: Vec<Mark>,
    /// Overlays in paint order.
    pub overlays: Vec<ProjectOverlay>,
    /// Preparation thresholds.
    pub prepare: PrepareOpts,
    /// Hotspot, viewport and placement rules.
    pub editor: EditorOpts,
    /// Parallel preparation.
    pub batch: BatchOpts,
}

impl Project {
    /// Parse a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> OverlayerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| OverlayerError::serde(format!("parse project JSON: {e}")))
    }

    /// Parse a project from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> OverlayerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            OverlayerError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the hotspots and that every overlay names an existing hotspot at most once.
    pub fn validate(&self) -> OverlayerResult<()> {
        Template {
            marks: self.marks.clone(),
        }
        .validate()?;
        let mut seen = std::collections::BTreeSet::new();
        for o in &self.overlays {
            if !self.marks.iter().any(|m| m.id == o.mark_id) {
                return Err(OverlayerError::unknown_mark(o.mark_id.clone()));
            }
            if !seen.insert(o.mark_id.as_str()) {
                return Err(OverlayerError::validation(format!(
                    "mark '{}' has more than one overlay",
                    o.mark_id
                )));
            }
        }
        Ok(())
    }
}

/// Prepare every overlay of `project` and composite them onto its base image.
///
/// Relative paths resolve against `root`.
#[tracing::instrument(skip(project, preparer), fields(overlays = project.overlays.len()))]
pub fn compose_project(
    project: &Project,
    root: &Path,
    preparer: &OverlayPreparer,
) -> OverlayerResult<Raster> {
    project.validate()?;

    let base_bytes = read_file(&root.join(&project.base))?;
    let base = preparer.surface().decode(&base_bytes)?;
    let frame = ViewportFrame::new(
        Point::ZERO,
        Size::new(f64::from(base.width), f64::from(base.height)),
    );

    let mut session = EditorSession::new(project.editor.clone(), frame);
    session.replace_template(project.marks.clone())?;

    let mut requests = Vec::with_capacity(project.overlays.len());
    for o in &project.overlays {
        let bytes = read_file(&root.join(&o.source))?;
        let input = ContentInput::Upload {
            bytes: bytes.clone(),
        };
        if let Some(ticket) = session.set_content(&o.mark_id, &input)? {
            requests.push(PrepareRequest {
                ticket,
                input: PrepareInput::Bytes(bytes),
                enforce_transparency: o.enforce_transparency,
            });
        }
    }

    for outcome in prepare_batch(preparer, requests, &project.batch)? {
        let Some(o) = project
            .overlays
            .iter()
            .find(|o| o.mark_id == outcome.ticket.mark_id)
        else {
            continue;
        };
        if let Err(e) = &outcome.result {
            tracing::warn!(source = %o.source.display(), error = %e, "overlay preparation failed");
        }
        let committed = session.commit_prepared(&outcome.ticket, outcome.result, o.origin)?;
        if committed == CommitOutcome::Stale {
            continue;
        }
        if let Some(scale) = o.scale {
            session.set_overlay_scale(&o.mark_id, scale)?;
        }
        if let Some([x, y]) = o.center {
            session.set_overlay_center(&o.mark_id, Point::new(x, y))?;
        }
    }

    session.composite(preparer.surface().as_ref(), &base)
}

/// Encode a raster as PNG bytes.
pub fn encode_png(preparer: &OverlayPreparer, raster: &Raster) -> OverlayerResult<Vec<u8>> {
    preparer.surface().encode(raster)
}

fn read_file(path: &Path) -> OverlayerResult<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("read '{}'", path.display()))
        .map_err(OverlayerError::from)
}

#[cfg(test)]
#[path = "../tests/unit/project.rs"]
mod tests;
