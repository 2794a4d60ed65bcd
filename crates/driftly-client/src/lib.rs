//! Client for the Driftly studio service.
//!
//! This crate talks to the HTTP service that writes scripts, renders videos
//! and keeps the generation schedule. It handles the session cookie and
//! CSRF token, multipart image uploads and the `{success, error}` reply
//! envelope shared by all endpoints.

pub mod attachment;
pub mod client;
pub mod csrf;
pub mod error;
pub mod types;

pub use attachment::{ImageAttachment, ALLOWED_EXTENSIONS};
pub use client::{ClientConfig, StudioClient, NO_SCRIPT_DATA};
pub use error::{ClientError, ClientResult};
pub use types::{LoginOutcome, ScriptRequest, VideoRequest};
