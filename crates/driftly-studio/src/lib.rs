//! Driftly studio workflows.
//!
//! This crate provides:
//! - Script review and video generation with status polling
//! - Scheduled generations
//! - Credential storage
//! - Progress reporting and simulated progress
//! - Dashboard views and login

pub mod auth;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod error;
pub mod images;
pub mod logging;
pub mod preview;
pub mod progress;
pub mod retry;
pub mod schedule;
pub mod session;
pub mod workflow;

pub use auth::AuthManager;
pub use config::{PollConfig, StudioConfig};
pub use credentials::{CredentialStore, Credentials, FileStore, KeyValueStore, MemoryStore, SetupForm};
pub use dashboard::{Dashboard, RecentVideoView};
pub use error::{StudioError, StudioResult};
pub use images::ImageSelection;
pub use logging::JobLogger;
pub use preview::PromptPreview;
pub use progress::{MemorySink, NullSink, ProgressSimulator, ProgressSink};
pub use schedule::{ScheduleConfirmation, ScheduleDraft, ScheduleManager};
pub use session::SessionState;
pub use workflow::{GenerationWorkflow, JobOutcome, VideoDraft};
