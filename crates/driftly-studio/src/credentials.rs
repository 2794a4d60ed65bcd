//! Persistent API keys and settings.
//!
//! Values are kept under fixed string keys in a [`KeyValueStore`]. The
//! default store is a JSON file in the user's config directory; tests use
//! [`MemoryStore`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use driftly_models::mask_secret;
use tracing::{debug, info};

use crate::error::{StudioError, StudioResult};

/// Storage keys.
pub mod keys {
    pub const GROK_API_KEY: &str = "grokApiKey";
    pub const FAL_API_KEY: &str = "falApiKey";
    pub const SPREADSHEET_ID: &str = "spreadsheetId";
    pub const USE_YOUTUBE: &str = "useYoutube";
    pub const YOUTUBE_CLIENT_SECRETS: &str = "youtubeClientSecrets";
}

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> StudioResult<()>;

    fn remove(&mut self, key: &str) -> StudioResult<()>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> StudioResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StudioResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object on disk.
///
/// The whole file is rewritten on every change. A missing file reads as an
/// empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> StudioResult<Self> {
        let path = path.into();

        let values = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                StudioError::credentials(format!("{} is not valid JSON: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), entries = values.len(), "Opened credential store");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StudioResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&self.values)?)?;
        restrict_permissions(&tmp)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> StudioResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> StudioResult<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Snapshot of the stored settings used to build a request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub grok_api_key: String,
    pub fal_api_key: String,
    pub spreadsheet_id: Option<String>,
    pub use_youtube: bool,
    pub youtube_client_secrets: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("grok_api_key", &mask_secret(&self.grok_api_key))
            .field("fal_api_key", &mask_secret(&self.fal_api_key))
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("use_youtube", &self.use_youtube)
            .finish()
    }
}

/// Values entered in the setup form.
#[derive(Clone, Default)]
pub struct SetupForm {
    pub grok_api_key: String,
    pub fal_api_key: String,
    pub spreadsheet_id: String,
    pub use_youtube: bool,
    pub youtube_client_secrets: String,
}

impl fmt::Debug for SetupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupForm")
            .field("grok_api_key", &mask_secret(&self.grok_api_key))
            .field("fal_api_key", &mask_secret(&self.fal_api_key))
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("use_youtube", &self.use_youtube)
            .finish()
    }
}

/// Typed access to the stored settings.
pub struct CredentialStore<S = FileStore> {
    store: S,
}

impl CredentialStore<FileStore> {
    /// Open the file-backed store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> StudioResult<Self> {
        Ok(Self::new(FileStore::open(path)?))
    }
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.store.get(key).filter(|v| !v.is_empty())
    }

    pub fn grok_api_key(&self) -> Option<String> {
        self.non_empty(keys::GROK_API_KEY)
    }

    pub fn fal_api_key(&self) -> Option<String> {
        self.non_empty(keys::FAL_API_KEY)
    }

    pub fn spreadsheet_id(&self) -> Option<String> {
        self.non_empty(keys::SPREADSHEET_ID)
    }

    pub fn use_youtube(&self) -> bool {
        self.store.get(keys::USE_YOUTUBE).as_deref() == Some("true")
    }

    pub fn youtube_client_secrets(&self) -> Option<String> {
        self.non_empty(keys::YOUTUBE_CLIENT_SECRETS)
    }

    /// Both API keys are configured; otherwise first-time setup is due.
    pub fn has_api_keys(&self) -> bool {
        self.grok_api_key().is_some() && self.fal_api_key().is_some()
    }

    pub fn snapshot(&self) -> Credentials {
        Credentials {
            grok_api_key: self.grok_api_key().unwrap_or_default(),
            fal_api_key: self.fal_api_key().unwrap_or_default(),
            spreadsheet_id: self.spreadsheet_id(),
            use_youtube: self.use_youtube(),
            youtube_client_secrets: self.youtube_client_secrets().unwrap_or_default(),
        }
    }

    /// Current values for pre-filling the setup form.
    pub fn setup_form(&self) -> SetupForm {
        let creds = self.snapshot();
        SetupForm {
            grok_api_key: creds.grok_api_key,
            fal_api_key: creds.fal_api_key,
            spreadsheet_id: creds.spreadsheet_id.unwrap_or_default(),
            use_youtube: creds.use_youtube,
            youtube_client_secrets: creds.youtube_client_secrets,
        }
    }

    /// Validate and persist the setup form.
    ///
    /// Nothing is written unless the whole form is valid. An empty
    /// spreadsheet id leaves the stored one untouched.
    pub fn save_setup(&mut self, form: &SetupForm) -> StudioResult<()> {
        let grok = form.grok_api_key.trim();
        let fal = form.fal_api_key.trim();
        let sheet = form.spreadsheet_id.trim();
        let secrets = form.youtube_client_secrets.trim();

        if grok.is_empty() || fal.is_empty() {
            return Err(StudioError::validation("Please enter both API keys"));
        }
        if form.use_youtube && secrets.is_empty() {
            return Err(StudioError::validation(
                "Please paste your YouTube client secrets JSON",
            ));
        }
        if !secrets.is_empty() && serde_json::from_str::<serde_json::Value>(secrets).is_err() {
            return Err(StudioError::validation(
                "Invalid JSON format for YouTube credentials",
            ));
        }

        self.store.set(keys::GROK_API_KEY, grok)?;
        self.store.set(keys::FAL_API_KEY, fal)?;
        if !sheet.is_empty() {
            self.store.set(keys::SPREADSHEET_ID, sheet)?;
        }
        self.store
            .set(keys::USE_YOUTUBE, if form.use_youtube { "true" } else { "false" })?;
        if !secrets.is_empty() {
            self.store.set(keys::YOUTUBE_CLIENT_SECRETS, secrets)?;
        }

        info!(
            grok_api_key = %mask_secret(grok),
            fal_api_key = %mask_secret(fal),
            use_youtube = form.use_youtube,
            "Saved setup"
        );
        Ok(())
    }

    /// Entered API keys that differ from the stored ones.
    ///
    /// Only non-empty entries count, so clearing a field is not a change.
    pub fn has_unsaved_changes(&self, form: &SetupForm) -> bool {
        let saved_grok = self.store.get(keys::GROK_API_KEY).unwrap_or_default();
        let saved_fal = self.store.get(keys::FAL_API_KEY).unwrap_or_default();

        (!form.grok_api_key.is_empty() && form.grok_api_key != saved_grok)
            || (!form.fal_api_key.is_empty() && form.fal_api_key != saved_fal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(grok: &str, fal: &str) -> SetupForm {
        SetupForm {
            grok_api_key: grok.to_string(),
            fal_api_key: fal.to_string(),
            ..SetupForm::default()
        }
    }

    #[test]
    fn test_save_requires_both_keys() {
        let mut store = CredentialStore::new(MemoryStore::new());
        let err = store.save_setup(&form("xai-1", "  ")).unwrap_err();
        assert_eq!(err.to_string(), "Please enter both API keys");
        assert!(!store.has_api_keys());
    }

    #[test]
    fn test_youtube_secrets_must_be_json() {
        let mut store = CredentialStore::new(MemoryStore::new());

        let mut setup = form("xai-1", "fal-1");
        setup.use_youtube = true;
        assert!(store.save_setup(&setup).is_err());

        setup.youtube_client_secrets = "{not json".to_string();
        let err = store.save_setup(&setup).unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON format for YouTube credentials");
        // Rejected forms leave the store untouched.
        assert!(store.grok_api_key().is_none());

        setup.youtube_client_secrets = r#"{"installed": {"client_id": "x"}}"#.to_string();
        store.save_setup(&setup).unwrap();
        assert!(store.use_youtube());
        assert!(store.youtube_client_secrets().is_some());
    }

    #[test]
    fn test_empty_spreadsheet_keeps_stored_one() {
        let mut store = CredentialStore::new(MemoryStore::new());

        let mut setup = form(" xai-1 ", "fal-1");
        setup.spreadsheet_id = "sheet-abc".to_string();
        store.save_setup(&setup).unwrap();
        assert_eq!(store.grok_api_key().as_deref(), Some("xai-1"));

        store.save_setup(&form("xai-2", "fal-2")).unwrap();
        assert_eq!(store.spreadsheet_id().as_deref(), Some("sheet-abc"));
        assert!(!store.use_youtube());
    }

    #[test]
    fn test_unsaved_changes() {
        let mut store = CredentialStore::new(MemoryStore::new());
        store.save_setup(&form("xai-1", "fal-1")).unwrap();

        assert!(!store.has_unsaved_changes(&form("xai-1", "fal-1")));
        assert!(!store.has_unsaved_changes(&form("", "")));
        assert!(store.has_unsaved_changes(&form("xai-9", "")));
        assert!(store.has_unsaved_changes(&form("", "fal-9")));
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        {
            let mut store = CredentialStore::open(&path).unwrap();
            assert!(!store.has_api_keys());
            store.save_setup(&form("xai-1", "fal-1")).unwrap();
        }

        let store = CredentialStore::open(&path).unwrap();
        assert!(store.has_api_keys());
        assert_eq!(store.fal_api_key().as_deref(), Some("fal-1"));
        assert_eq!(store.inner().path(), path.as_path());
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StudioError::Credentials(_))
        ));
    }

    #[test]
    fn test_debug_masks_keys() {
        let creds = Credentials {
            grok_api_key: "xai-0123456789abcdef".to_string(),
            ..Credentials::default()
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("abcdef"));
    }
}
