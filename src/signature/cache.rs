use std::collections::BTreeMap;
use std::fmt;

use xxhash_rust::xxh3::xxh3_128_with_seed;

use crate::region::mark::MarkId;

const XXH3_SEED: u64 = 0x6f76_6572_6c61_7972;

/// Line-break mode of a text hotspot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineMode {
    /// Let the renderer wrap as it sees fit.
    Auto,
    /// Force a single line.
    Single,
    /// Keep explicit line breaks only.
    Manual,
}

impl LineMode {
    /// Stable textual form used inside signatures.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Single => "single",
            Self::Manual => "manual",
        }
    }
}

/// Everything that determines the content of one overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentInput {
    /// Rendered text.
    Text {
        /// Line-break mode.
        line_mode: LineMode,
        /// Exact text, not trimmed.
        text: String,
    },
    /// User-uploaded image bytes.
    Upload {
        /// Encoded image bytes as uploaded.
        bytes: Vec<u8>,
    },
    /// Image generated from a description.
    Describe {
        /// Exact prompt string.
        prompt: String,
    },
}

/// Content fingerprint tying an overlay to the inputs that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    /// Textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the signature of a content input. Pure.
pub fn signature_of(input: &ContentInput) -> Signature {
    match input {
        ContentInput::Text { line_mode, text } => {
            Signature(format!("text:{}:{}", line_mode.as_str(), text))
        }
        ContentInput::Upload { bytes } => Signature(format!("upload:{}", content_hash(bytes))),
        ContentInput::Describe { prompt } => Signature(format!("describe:{prompt}")),
    }
}

fn content_hash(bytes: &[u8]) -> String {
    format!("{:032x}", xxh3_128_with_seed(bytes, XXH3_SEED))
}

/// Whether a prepared overlay survives a content change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheDecision {
    /// Same content: reuse the existing overlay.
    Keep,
    /// Content changed (or nothing was prepared yet): the overlay must be rebuilt.
    Invalidate,
}

/// Compare the signature an overlay was built from with the current one.
pub fn reconcile(old: Option<&Signature>, new: &Signature) -> CacheDecision {
    match old {
        Some(old) if old == new => CacheDecision::Keep,
        _ => CacheDecision::Invalidate,
    }
}

/// Identifies one in-flight preparation: the hotspot and the content it was started for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreparationTicket {
    /// Target hotspot.
    pub mark_id: MarkId,
    /// Signature of the content being prepared.
    pub signature: Signature,
}

/// Current content signature per hotspot.
#[derive(Clone, Debug, Default)]
pub struct SignatureCache {
    current: BTreeMap<MarkId, Signature>,
}

impl SignatureCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record new content for `mark_id` and report whether its overlay must be rebuilt.
    pub fn update(&mut self, mark_id: &str, input: &ContentInput) -> (Signature, CacheDecision) {
        let sig = signature_of(input);
        let decision = reconcile(self.current.get(mark_id), &sig);
        if decision == CacheDecision::Invalidate {
            self.current.insert(mark_id.to_string(), sig.clone());
        }
        (sig, decision)
    }

    /// Signature currently associated with a hotspot.
    pub fn current(&self, mark_id: &str) -> Option<&Signature> {
        self.current.get(mark_id)
    }

    /// Whether a ticket still matches the hotspot's current content.
    pub fn is_current(&self, ticket: &PreparationTicket) -> bool {
        self.current.get(&ticket.mark_id) == Some(&ticket.signature)
    }

    /// Drop the signature of a hotspot.
    pub fn forget(&mut self, mark_id: &str) -> Option<Signature> {
        self.current.remove(mark_id)
    }

    /// Drop every signature.
    pub fn clear(&mut self) {
        self.current.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/signature/cache.rs"]
mod tests;
