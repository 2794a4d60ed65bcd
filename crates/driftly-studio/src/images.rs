//! Reference images picked for a generation.

use std::path::Path;

use driftly_client::ImageAttachment;

use crate::error::{StudioError, StudioResult};

/// Ordered selection of reference images.
#[derive(Debug, Clone, Default)]
pub struct ImageSelection {
    images: Vec<ImageAttachment>,
}

/// Entry in the rendered preview list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreviewItem {
    pub index: usize,
    pub label: String,
    pub file_name: String,
}

impl ImageSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: ImageAttachment) {
        self.images.push(image);
    }

    /// Load and append image files. Stops at the first invalid file.
    pub async fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> StudioResult<()> {
        for path in paths {
            self.images.push(ImageAttachment::from_path(path).await?);
        }
        Ok(())
    }

    /// Remove the image at `index`; later images move up by one.
    pub fn remove(&mut self, index: usize) -> StudioResult<ImageAttachment> {
        if index >= self.images.len() {
            return Err(StudioError::validation(format!(
                "No image at position {} ({} selected)",
                index + 1,
                self.images.len()
            )));
        }
        Ok(self.images.remove(index))
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[ImageAttachment] {
        &self.images
    }

    pub fn to_vec(&self) -> Vec<ImageAttachment> {
        self.images.clone()
    }

    /// Preview entries, indexed `0..len` and labelled "Image 1", "Image 2", ...
    pub fn previews(&self) -> Vec<ImagePreviewItem> {
        self.images
            .iter()
            .enumerate()
            .map(|(index, image)| ImagePreviewItem {
                index,
                label: format!("Image {}", index + 1),
                file_name: image.file_name().to_string(),
            })
            .collect()
    }
}

impl From<Vec<ImageAttachment>> for ImageSelection {
    fn from(images: Vec<ImageAttachment>) -> Self {
        Self { images }
    }
}
