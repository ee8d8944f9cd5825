//! Core data types for the Chapterlift pipeline.
//!
//! These types describe one batch invocation: what goes in (source items and
//! a transform configuration), what each page turns into, and what the caller
//! gets back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Smallest and largest quality accepted by the encoder.
const QUALITY_RANGE: (u8, u8) = (1, 100);

/// Per-batch transform configuration.
///
/// Never rejected: out-of-range values are clamped and a zero
/// `max_dimension` simply disables resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Shrink pages wider than `max_dimension`
    pub resize_enabled: bool,
    /// Target width in pixels
    pub max_dimension: u32,
    /// Encoder quality, 0-100
    pub quality: u8,
    /// Replace real work with a fixed delay and a synthetic URL
    pub simulate_only: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            resize_enabled: true,
            max_dimension: 1600,
            quality: 80,
            simulate_only: false,
        }
    }
}

impl TransformConfig {
    /// Return a copy with every field forced into its usable range.
    pub fn clamped(self) -> Self {
        Self {
            resize_enabled: self.resize_enabled && self.max_dimension > 0,
            quality: self.quality.clamp(QUALITY_RANGE.0, QUALITY_RANGE.1),
            ..self
        }
    }

    /// Whether an image of the given width must be shrunk.
    ///
    /// Resizing only ever shrinks: widths at or below the threshold are kept.
    pub fn should_resize(&self, width: u32) -> bool {
        self.resize_enabled && self.max_dimension > 0 && width > self.max_dimension
    }
}

/// One input page. `index` is the only link between input and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    /// Position in the caller-supplied list
    pub index: usize,
    /// Local file path
    pub path: PathBuf,
}

impl SourceItem {
    /// Number a list of paths in order.
    pub fn from_paths<I, P>(paths: I) -> Vec<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Self {
                index,
                path: path.into(),
            })
            .collect()
    }
}

/// BLAKE3 digest of raw source bytes, rendered as 64 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub(crate) fn from_hex(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An encoded page ready for upload. Owned by a single task.
#[derive(Debug)]
pub struct ProcessedAsset {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// Remote object key
    pub output_name: String,
    /// Length of `bytes`
    pub size: u64,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

impl ProcessedAsset {
    /// MIME type of the fixed target format.
    pub const CONTENT_TYPE: &'static str = "image/jpeg";
}

/// What happened to one source item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success { url: String },
    Failure { source_path: PathBuf, message: String },
}

impl UploadOutcome {
    /// Failure reason, `None` for a success.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}

/// Aggregate result of one batch.
///
/// `links` always has one entry per input; failed slots are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    pub links: Vec<String>,
    /// First-failure summary, empty on success
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl BatchResult {
    /// Every item produced a URL.
    pub fn complete(links: Vec<String>) -> Self {
        Self {
            success: true,
            links,
            error: String::new(),
        }
    }

    /// Some items failed; `links` keeps whatever did succeed.
    pub fn partial(links: Vec<String>, failed: usize, first_message: &str) -> Self {
        Self {
            success: false,
            links,
            error: format!("{failed} failed, first: {first_message}"),
        }
    }

    /// The batch was cancelled, regardless of how far it got.
    pub fn cancelled(links: Vec<String>) -> Self {
        Self {
            success: false,
            links,
            error: "upload cancelled before the batch finished".to_string(),
        }
    }

    /// Count of populated slots.
    pub fn uploaded(&self) -> usize {
        self.links.iter().filter(|l| !l.is_empty()).count()
    }
}

/// Progress notification, emitted once per finished item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_quality() {
        let high = TransformConfig {
            quality: 250,
            ..TransformConfig::default()
        }
        .clamped();
        assert_eq!(high.quality, 100);

        let zero = TransformConfig {
            quality: 0,
            ..TransformConfig::default()
        }
        .clamped();
        assert_eq!(zero.quality, 1);
    }

    #[test]
    fn test_zero_max_dimension_disables_resize() {
        let config = TransformConfig {
            resize_enabled: true,
            max_dimension: 0,
            ..TransformConfig::default()
        }
        .clamped();
        assert!(!config.resize_enabled);
        assert!(!config.should_resize(5000));
    }

    #[test]
    fn test_should_resize_only_shrinks() {
        let config = TransformConfig {
            max_dimension: 1000,
            ..TransformConfig::default()
        };
        assert!(config.should_resize(1001));
        assert!(!config.should_resize(1000));
        assert!(!config.should_resize(400));

        let off = TransformConfig {
            resize_enabled: false,
            ..config
        };
        assert!(!off.should_resize(5000));
    }

    #[test]
    fn test_source_items_are_numbered_in_order() {
        let items = SourceItem::from_paths(["a.png", "b.png", "c.png"]);
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].index, 2);
        assert_eq!(items[2].path, PathBuf::from("c.png"));
    }

    #[test]
    fn test_partial_result_summary() {
        let result = BatchResult::partial(
            vec!["u0".into(), String::new(), "u2".into()],
            1,
            "Read error for x.png: missing",
        );
        assert!(!result.success);
        assert_eq!(result.error, "1 failed, first: Read error for x.png: missing");
        assert_eq!(result.uploaded(), 2);
    }

    #[test]
    fn test_complete_result_omits_error_in_json() {
        let json = serde_json::to_string(&BatchResult::complete(vec!["u".into()])).unwrap();
        assert_eq!(json, r#"{"success":true,"links":["u"]}"#);
    }
}
