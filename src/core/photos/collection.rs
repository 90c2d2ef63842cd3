//! Ordered set of stamped photos for one work order.

use crate::core::watermark::EncodedImage;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use uuid::Uuid;

/// A photo that has been stamped and accepted into the form.
///
/// Its caption reflects the location at the moment it was added.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub id: Uuid,
    pub original_name: String,
    image: EncodedImage,
}

impl std::fmt::Debug for CapturedPhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedPhoto")
            .field("id", &self.id)
            .field("original_name", &self.original_name)
            .field("image", &self.image)
            .finish()
    }
}

impl CapturedPhoto {
    pub fn new(original_name: impl Into<String>, image: EncodedImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_name: original_name.into(),
            image,
        }
    }

    /// The stamped JPEG bytes
    pub fn image_data(&self) -> &[u8] {
        &self.image.bytes
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }

    /// Output file name for the photo at `position` in a batch.
    ///
    /// The 1-based position prefix keeps names distinct when two source
    /// files share a stem (`a/site.jpg`, `b/site.png`).
    pub fn stamped_file_name(&self, position: usize) -> String {
        let stem = Path::new(&self.original_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.id.simple().to_string());
        format!("{:02}-{}-stamped.jpg", position + 1, stem)
    }

    /// `data:image/jpeg;base64,...` form sent to the collection endpoint
    pub fn data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", STANDARD.encode(&self.image.bytes))
    }
}

/// Photos in the order the technician added them.
///
/// Identical photos are kept as separate entries.
#[derive(Debug, Clone, Default)]
pub struct PhotoCollection {
    photos: Vec<CapturedPhoto>,
}

impl PhotoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a photo at the end
    pub fn add(&mut self, photo: CapturedPhoto) {
        self.photos.push(photo);
    }

    /// Remove the photo at `index`, shifting later photos down.
    ///
    /// Returns `None` and leaves the collection unchanged when out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<CapturedPhoto> {
        if index < self.photos.len() {
            Some(self.photos.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&CapturedPhoto> {
        self.photos.get(index)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapturedPhoto> {
        self.photos.iter()
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }
}
