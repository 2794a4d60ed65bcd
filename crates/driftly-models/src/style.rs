//! Visual style and duration settings for a generation request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Visual style passed to script generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStyle {
    /// Film look: grading, grain, shallow depth of field
    #[default]
    Cinematic,
    /// Photorealistic rendering
    Realistic,
    /// High contrast, strong shadows
    Dramatic,
    /// Saturated colors, high-key lighting
    Vibrant,
    /// Blue hour, silhouettes, fog
    Moody,
}

impl VideoStyle {
    pub const ALL: &'static [VideoStyle] = &[
        VideoStyle::Cinematic,
        VideoStyle::Realistic,
        VideoStyle::Dramatic,
        VideoStyle::Vibrant,
        VideoStyle::Moody,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStyle::Cinematic => "cinematic",
            VideoStyle::Realistic => "realistic",
            VideoStyle::Dramatic => "dramatic",
            VideoStyle::Vibrant => "vibrant",
            VideoStyle::Moody => "moody",
        }
    }
}

impl fmt::Display for VideoStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        VideoStyle::ALL
            .iter()
            .copied()
            .find(|style| style.as_str() == wanted)
            .ok_or_else(|| StyleParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown video style: {0} (expected one of {names})", names = style_names())]
pub struct StyleParseError(String);

fn style_names() -> String {
    VideoStyle::ALL
        .iter()
        .map(|style| style.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Length of one generated segment in seconds.
pub const SEGMENT_SECONDS: u32 = 8;

/// Target video length in seconds, a positive multiple of [`SEGMENT_SECONDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct VideoDuration(u32);

impl VideoDuration {
    pub fn new(seconds: u32) -> Result<Self, DurationError> {
        if seconds == 0 || seconds % SEGMENT_SECONDS != 0 {
            return Err(DurationError(seconds));
        }
        Ok(Self(seconds))
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Number of 8 second segments the service will render.
    pub fn segments(&self) -> u32 {
        self.0 / SEGMENT_SECONDS
    }
}

impl Default for VideoDuration {
    fn default() -> Self {
        Self(SEGMENT_SECONDS)
    }
}

impl TryFrom<u32> for VideoDuration {
    type Error = DurationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VideoDuration> for u32 {
    fn from(value: VideoDuration) -> Self {
        value.0
    }
}

impl fmt::Display for VideoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
#[error("Invalid duration {0}s: must be a positive multiple of 8 seconds")]
pub struct DurationError(u32);
