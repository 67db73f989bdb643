use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::region::mark::Mark;

/// Persisted set of hotspots for one template image.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    /// Hotspots in paint order.
    pub marks: Vec<Mark>,
}

impl Template {
    /// Parse a template from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> OverlayerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| OverlayerError::serde(format!("parse template JSON: {e}")))
    }

    /// Parse a template from a JSON string.
    pub fn from_json(s: &str) -> OverlayerResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a template from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> OverlayerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            OverlayerError::validation(format!("open template JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> OverlayerResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| OverlayerError::serde(format!("serialize template: {e}")))
    }

    /// Check ids are unique and geometry is normalized with a positive size.
    pub fn validate(&self) -> OverlayerResult<()> {
        let mut ids = BTreeSet::new();
        for m in &self.marks {
            if m.id.trim().is_empty() {
                return Err(OverlayerError::validation("mark id must be non-empty"));
            }
            if !ids.insert(m.id.as_str()) {
                return Err(OverlayerError::validation(format!(
                    "duplicate mark id '{}'",
                    m.id
                )));
            }
            let fields = [
                ("center_x", m.center_x),
                ("center_y", m.center_y),
                ("width", m.width),
                ("height", m.height),
            ];
            for (name, v) in fields {
                if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                    return Err(OverlayerError::validation(format!(
                        "mark '{}' {name} must be within [0,1], got {v}",
                        m.id
                    )));
                }
            }
            if m.width <= 0.0 || m.height <= 0.0 {
                return Err(OverlayerError::validation(format!(
                    "mark '{}' must have a positive size",
                    m.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/region/template.rs"]
mod tests;
