//! Reference image attachments sent with script and video requests.

use std::fmt;
use std::path::Path;

use reqwest::multipart::Part;

use crate::error::{ClientError, ClientResult};

/// Extensions the service accepts for reference images.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// An image file loaded into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    file_name: String,
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Build an attachment from raw bytes, validating the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> ClientResult<Self> {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name).ok_or_else(|| {
            ClientError::InvalidAttachment(format!(
                "Invalid file type: {}. Allowed types: {}",
                file_name,
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Read an image from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::InvalidAttachment(format!("Not a file: {}", path.display()))
            })?
            .to_string();

        // Validate before touching the disk.
        mime_for(&file_name).ok_or_else(|| {
            ClientError::InvalidAttachment(format!(
                "Invalid file type: {}. Allowed types: {}",
                file_name,
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

        let bytes = tokio::fs::read(path).await?;
        Self::new(file_name, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Multipart part for the `images` field.
    pub(crate) fn to_part(&self) -> ClientResult<Part> {
        Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(self.mime_type)
            .map_err(ClientError::Network)
    }
}

impl fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert_eq!(
            ImageAttachment::new("shot.PNG", vec![1]).unwrap().mime_type(),
            "image/png"
        );
        assert_eq!(
            ImageAttachment::new("a.b.jpeg", vec![1]).unwrap().mime_type(),
            "image/jpeg"
        );
    }

    #[test]
    fn test_rejected_extensions() {
        let err = ImageAttachment::new("notes.txt", vec![]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidAttachment(_)));
        assert!(err.to_string().contains("png, jpg, jpeg, gif, webp"));
        assert!(ImageAttachment::new("noextension", vec![]).is_err());
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.webp");
        std::fs::write(&path, [7u8, 8, 9]).unwrap();

        let image = ImageAttachment::from_path(&path).await.unwrap();
        assert_eq!(image.file_name(), "frame.webp");
        assert_eq!(image.len(), 3);
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.png");
        tokio_test::assert_err!(tokio_test::block_on(ImageAttachment::from_path(&missing)));
    }
}
