//! Shared data models for the Driftly video studio client.
//!
//! This crate provides Serde-serializable types for:
//! - Generation jobs and their status
//! - AI generated script data and its display normalization
//! - Scheduled generations
//! - Request/response envelopes of the studio HTTP API
//! - Phase text to progress projection

pub mod api;
pub mod job;
pub mod progress;
pub mod schedule;
pub mod script;
pub mod style;
pub mod utils;

// Re-export common types
pub use api::{AuthStatus, Envelope, RecentVideo, Stats};
pub use job::{Job, JobId, JobStatus};
pub use progress::{phase_progress, PhaseRule, COMPLETE_PERCENT, PHASE_RULES};
pub use schedule::{ScheduleEntry, ScheduleRequest, ScheduleStatus, ScheduleView};
pub use script::ScriptData;
pub use style::{VideoDuration, VideoStyle};
pub use utils::{escape_html, mask_secret, time_ago};
