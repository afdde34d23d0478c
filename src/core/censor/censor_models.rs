// Censor domain models - data structures for image moderation.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer converts messages to and from these.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of concept categories the safety checker scores per image.
pub const CONCEPT_COUNT: usize = 17;

/// i18n key for the warning shown in place of a blocked image.
pub const UNSAFE_IMAGE_KEY: &str = "image-censor.detected-unsafe-images";

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised by the outbound ports. The censor service recovers all of
/// them internally (fail-open), so callers only ever see a `Verdict`.
#[derive(Debug, Error)]
pub enum CensorError {
    #[error("image fetch failed: {0}")]
    Fetch(String),

    #[error("classification request failed: {0}")]
    Classify(String),

    #[error("classification response did not contain concept_scores")]
    MissingScores,
}

/// Configuration problems that must abort activation. These are never
/// recovered per-image.
#[derive(Debug, Error)]
pub enum CensorConfigError {
    #[error("classification endpoint must be an http(s) URL, got {0:?}")]
    Endpoint(String),

    #[error("threshold vector must have {expected} entries, got {actual}")]
    ThresholdLength { expected: usize, actual: usize },

    #[error("offset {0} is outside [-1, 1]")]
    OffsetRange(f64),

    #[error("threshold[{index}] = {value} is outside [-1, 1]")]
    ThresholdRange { index: usize, value: f64 },
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Image moderation configuration. Loaded once at startup, validated, and
/// then read-only for the life of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CensorConfig {
    /// Classification endpoint URL. Required - there is no default host.
    pub endpoint: String,
    /// Log the raw score vector of every image (for threshold tuning).
    pub debug: bool,
    /// Added to every score before the threshold comparison.
    pub offset: f64,
    /// Per-category block threshold. Must have exactly `CONCEPT_COUNT` entries.
    pub threshold: Vec<f64>,
    /// Filter images in messages the bot sends.
    pub censor_send: bool,
    /// Filter images in incoming messages and delete offenders.
    pub censor_message: bool,
    /// Channels inspected when `censor_message` is on. Empty means none.
    pub scope: Vec<u64>,
    /// Locale used for the channel warning.
    pub locale: String,
}

impl Default for CensorConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            debug: false,
            offset: -0.016,
            threshold: vec![0.0; CONCEPT_COUNT],
            censor_send: false,
            censor_message: false,
            scope: Vec::new(),
            locale: "zh-CN".to_string(),
        }
    }
}

impl CensorConfig {
    /// Validate the configuration. Called once before the plugin starts;
    /// any error here must prevent activation rather than fail per-image.
    pub fn validate(&self) -> Result<(), CensorConfigError> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(CensorConfigError::Endpoint(self.endpoint.clone()));
        }

        if self.threshold.len() != CONCEPT_COUNT {
            return Err(CensorConfigError::ThresholdLength {
                expected: CONCEPT_COUNT,
                actual: self.threshold.len(),
            });
        }

        if !(-1.0..=1.0).contains(&self.offset) {
            return Err(CensorConfigError::OffsetRange(self.offset));
        }

        for (index, value) in self.threshold.iter().enumerate() {
            if !(-1.0..=1.0).contains(value) {
                return Err(CensorConfigError::ThresholdRange {
                    index,
                    value: *value,
                });
            }
        }

        Ok(())
    }
}

// ============================================================================
// ELEMENT MODEL
// ============================================================================

/// Reference to an image by source URL, plus whatever rendering attributes
/// travelled with it. The bytes are owned by wherever the URL points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Resolvable byte source (attachment or embed URL).
    pub source: String,
    /// Optional attribute such as a filename or alt text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ImageRef {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            summary: None,
        }
    }

    pub fn with_summary(source: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            summary: Some(summary.into()),
        }
    }
}

/// One node of a message content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Plain text content.
    Text(String),
    /// An image reference.
    Image(ImageRef),
    /// A placeholder resolved through the locale string table at render time.
    Localized(String),
}

impl Element {
    /// Dispatch key for render interception.
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Image(_) => ElementKind::Image,
            _ => ElementKind::Other,
        }
    }
}

/// The element kinds render hooks can be registered for. Every host spelling
/// of an image element maps onto the single `Image` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Image,
    Other,
}

// ============================================================================
// VERDICT
// ============================================================================

/// Placeholder for a blocked image. Carries the i18n key of the warning that
/// is rendered in its place.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockedMarker {
    pub message_key: String,
}

impl BlockedMarker {
    pub fn unsafe_image() -> Self {
        Self {
            message_key: UNSAFE_IMAGE_KEY.to_string(),
        }
    }
}

/// Outcome of moderating one image.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Image is safe (or moderation was unavailable) - pass it through.
    Pass(ImageRef),
    /// Image is unsafe - replace it with the warning.
    Blocked(BlockedMarker),
}

impl Verdict {
    /// Fold the verdict back into the content tree.
    pub fn into_element(self) -> Element {
        match self {
            Verdict::Pass(image) => Element::Image(image),
            Verdict::Blocked(marker) => Element::Localized(marker.message_key),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
