//! Stamping a selection of photos.
//!
//! Each photo is decoded, stamped and re-encoded on its own blocking task.
//! Tasks finish in any order; `join_all` hands results back in selection
//! order, so the collection sees them in the order the technician chose.

use super::CapturedPhoto;
use crate::core::watermark::{Caption, ImageFormat, Watermarker};
use crate::error::WatermarkError;
use crate::events::{Event, EventSender, PhotoEvent};
use futures::future::join_all;
use std::path::{Path, PathBuf};

/// A raw photo picked by the technician
#[derive(Clone)]
pub struct PhotoFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PhotoFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoFile")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl PhotoFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a photo from disk, naming it after the file
    pub fn read(path: &Path) -> Result<Self, WatermarkError> {
        let bytes = std::fs::read(path).map_err(|e| WatermarkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Only image files are accepted; others are skipped
    pub fn is_image(&self) -> bool {
        ImageFormat::sniff(&self.bytes).is_image()
            || ImageFormat::from_path(Path::new(&self.name)).is_image()
    }
}

/// A photo that could not be stamped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPhoto {
    /// Position in the original selection
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Result of stamping one selection
#[derive(Debug, Default)]
pub struct IntakeReport {
    /// Stamped photos, in selection order
    pub accepted: Vec<CapturedPhoto>,
    pub rejected: Vec<RejectedPhoto>,
}

/// Read every path, turning unreadable ones into rejections.
///
/// A rejection's `index` is its position in `paths`.
pub fn read_selection(paths: &[PathBuf]) -> (Vec<PhotoFile>, Vec<RejectedPhoto>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut rejected = Vec::new();

    for (index, path) in paths.iter().enumerate() {
        match PhotoFile::read(path) {
            Ok(file) => files.push(file),
            Err(e) => {
                tracing::warn!(index, path = %path.display(), error = %e, "photo unreadable");
                rejected.push(RejectedPhoto {
                    index,
                    name: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (files, rejected)
}

/// Runs the watermarker over a selection of photos
#[derive(Debug, Clone)]
pub struct PhotoIntake {
    watermarker: Watermarker,
}

impl PhotoIntake {
    pub fn new(watermarker: Watermarker) -> Self {
        Self { watermarker }
    }

    pub fn watermarker(&self) -> &Watermarker {
        &self.watermarker
    }

    /// Stamp every file with the same caption.
    ///
    /// A failure on one file never affects the others.
    pub async fn annotate_batch(
        &self,
        files: Vec<PhotoFile>,
        caption: &Caption,
        events: &EventSender,
    ) -> IntakeReport {
        events.send(Event::Photo(PhotoEvent::BatchStarted { total: files.len() }));

        let tasks = files.into_iter().enumerate().map(|(index, file)| {
            let watermarker = self.watermarker.clone();
            let caption = caption.clone();
            async move {
                let name = file.name.clone();
                let result = stamp_one(watermarker, file, caption).await;
                (index, name, result)
            }
        });

        let mut report = IntakeReport::default();
        for (index, name, result) in join_all(tasks).await {
            match result {
                Ok(photo) => {
                    tracing::debug!(index, name = %name, "photo stamped");
                    events.send(Event::Photo(PhotoEvent::Stamped {
                        index,
                        name: name.clone(),
                    }));
                    report.accepted.push(photo);
                }
                Err(e) => {
                    tracing::warn!(index, name = %name, error = %e, "photo skipped");
                    events.send(Event::Photo(PhotoEvent::Rejected {
                        index,
                        name: name.clone(),
                        reason: e.to_string(),
                    }));
                    report.rejected.push(RejectedPhoto {
                        index,
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        events.send(Event::Photo(PhotoEvent::BatchCompleted {
            accepted: report.accepted.len(),
            rejected: report.rejected.len(),
        }));
        report
    }
}

async fn stamp_one(
    watermarker: Watermarker,
    file: PhotoFile,
    caption: Caption,
) -> Result<CapturedPhoto, WatermarkError> {
    if !file.is_image() {
        return Err(WatermarkError::UnsupportedType { name: file.name });
    }

    let name = file.name.clone();
    let encoded = tokio::task::spawn_blocking(move || {
        watermarker.annotate(&file.name, &file.bytes, &caption)
    })
    .await
    .map_err(|e| WatermarkError::TaskFailed {
        name: name.clone(),
        reason: e.to_string(),
    })??;

    Ok(CapturedPhoto::new(name, encoded))
}
