//! Core type definitions for comment-sentiment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an analysis run
/// Format: YYYYMMDDHHMMSS-<short_uuid>
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new RunId
    pub fn generate() -> Self {
        let now = Utc::now();
        let uuid = Uuid::new_v4();
        let short_uuid = &uuid.to_string()[..8];
        RunId(format!("{}-{}", now.format("%Y%m%d%H%M%S"), short_uuid))
    }

    /// Create from a string with validation
    pub fn from_string(s: impl Into<String>) -> crate::Result<Self> {
        let s = s.into();
        if Self::validate(&s) {
            Ok(RunId(s))
        } else {
            Err(crate::SentimentError::Validation(format!(
                "Invalid run ID format: {}",
                s
            )))
        }
    }

    /// 14 digits, a dash, then 8 lowercase hex digits. Run ids become file
    /// names, so nothing else is accepted.
    fn validate(s: &str) -> bool {
        match s.split_once('-') {
            Some((stamp, suffix)) => {
                stamp.len() == 14
                    && stamp.bytes().all(|b| b.is_ascii_digit())
                    && suffix.len() == 8
                    && suffix.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
            }
            None => false,
        }
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Schema version of persisted files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
}

impl ProtocolVersion {
    pub const V1_0: Self = Self { major: 1, minor: 0 };

    /// Parse a `major.minor` string
    pub fn parse(s: &str) -> Option<Self> {
        let (major, minor) = s.split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Check if this version is compatible with another version
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.major == other.major
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::V1_0
    }
}

/// A user comment as fetched from the video platform. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Display name of the author
    #[serde(default)]
    pub author: String,
    /// Comment text as delivered by the API
    #[serde(alias = "text")]
    pub raw_text: String,
    /// Number of likes
    #[serde(default, alias = "likeCount")]
    pub like_count: u64,
    /// When the comment was published
    #[serde(alias = "publishedAt")]
    pub published_at: DateTime<Utc>,
    /// When the comment was last edited
    #[serde(alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A comment together with its normalized text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedComment {
    #[serde(flatten)]
    pub record: CommentRecord,
    /// Deterministic function of `record.raw_text`
    pub clean_text: String,
}

impl CleanedComment {
    /// Normalize a fetched record
    pub fn from_record(record: CommentRecord) -> Self {
        let clean_text = crate::normalize::normalize(&record.raw_text);
        Self { record, clean_text }
    }
}

/// Three-way sentiment taxonomy shared by the neural scorer and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = crate::SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(crate::SentimentError::Validation(format!(
                "Unknown sentiment label: {}",
                other
            ))),
        }
    }
}

/// A cleaned comment with the predictions of both classifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub comment: CleanedComment,
    /// Label from the statistical classifier, absent when its artifacts are not loaded
    #[serde(default)]
    pub statistical_label: Option<String>,
    /// Three-way label derived from the neural model
    pub neural_label: SentimentLabel,
    /// Confidence the neural model reported for its binary label
    pub neural_confidence: f64,
    /// Binary label exactly as the neural model emitted it
    pub neural_raw_label: String,
}

impl ScoredRecord {
    /// Whether both classifiers produced the same label
    pub fn agrees(&self) -> Option<bool> {
        self.statistical_label
            .as_deref()
            .map(|label| label.eq_ignore_ascii_case(self.neural_label.as_str()))
    }
}
