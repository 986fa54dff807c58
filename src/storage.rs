// SPDX-License-Identifier: GPL-3.0-only

//! Photo storage
//!
//! Captured photos live behind the [`PhotoStore`] trait so the booth does
//! not care where bytes end up. Two implementations are provided: an
//! in-memory store for tests and short-lived sessions, and a disk store
//! that persists photos as timestamped image files.
//!
//! Previews are derived asynchronously after a photo is stored and attached
//! via [`PhotoStore::attach_preview`]; they are never persisted.

use crate::pipelines::photo::encoding::EncodingFormat;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Identifier assigned to a stored photo
pub type PhotoId = u64;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Error types for storage operations
#[derive(Debug, Clone)]
pub enum StorageError {
    /// No photo with the given id
    NotFound(PhotoId),
    /// Failed to read photo data
    Read(String),
    /// Failed to persist photo data
    Write(String),
    /// Failed to delete photo data
    Delete(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound(id) => write!(f, "Photo {} not found", id),
            StorageError::Read(msg) => write!(f, "Storage read failed: {}", msg),
            StorageError::Write(msg) => write!(f, "Storage write failed: {}", msg),
            StorageError::Delete(msg) => write!(f, "Storage delete failed: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// A photo as returned from a store
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub id: PhotoId,
    /// Encoded image bytes
    pub data: Arc<[u8]>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Local>,
    /// Small JPEG preview, once derived (falls back to `data` for display)
    pub preview: Option<Arc<[u8]>>,
}

/// A freshly captured photo to be stored
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub data: Arc<[u8]>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Local>,
}

/// Where captured photos are kept
///
/// `get_all` lists newest first. `delete` and `delete_all` only drop a
/// photo from the listing once its backing data is actually gone.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store a photo and assign it an id
    async fn add(&self, photo: NewPhoto) -> StorageResult<PhotoId>;

    /// List all photos, newest first
    async fn get_all(&self) -> StorageResult<Vec<CapturedPhoto>>;

    /// Attach a derived preview to an existing photo
    async fn attach_preview(&self, id: PhotoId, preview: Arc<[u8]>) -> StorageResult<()>;

    /// Delete one photo
    async fn delete(&self, id: PhotoId) -> StorageResult<()>;

    /// Delete every photo
    async fn delete_all(&self) -> StorageResult<()>;
}

// ===== In-memory store =====

struct MemoryState {
    next_id: PhotoId,
    photos: Vec<CapturedPhoto>,
}

/// Keeps photos in memory, in insertion order
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                photos: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhotoStore for MemoryStore {
    async fn add(&self, photo: NewPhoto) -> StorageResult<PhotoId> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.photos.push(CapturedPhoto {
            id,
            data: photo.data,
            format: photo.format,
            width: photo.width,
            height: photo.height,
            created_at: photo.created_at,
            preview: None,
        });
        debug!(id, "Photo stored in memory");
        Ok(id)
    }

    async fn get_all(&self) -> StorageResult<Vec<CapturedPhoto>> {
        let state = self.state.lock().unwrap();
        Ok(state.photos.iter().rev().cloned().collect())
    }

    async fn attach_preview(&self, id: PhotoId, preview: Arc<[u8]>) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.photos.iter_mut().find(|photo| photo.id == id) {
            Some(photo) => {
                photo.preview = Some(preview);
                Ok(())
            }
            None => Err(StorageError::NotFound(id)),
        }
    }

    async fn delete(&self, id: PhotoId) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.photos.iter().position(|photo| photo.id == id) {
            Some(index) => {
                state.photos.remove(index);
                Ok(())
            }
            None => Err(StorageError::NotFound(id)),
        }
    }

    async fn delete_all(&self) -> StorageResult<()> {
        self.state.lock().unwrap().photos.clear();
        Ok(())
    }
}

// ===== Disk store =====

#[derive(Clone)]
struct DiskEntry {
    path: PathBuf,
    format: EncodingFormat,
    width: u32,
    height: u32,
    created_at: DateTime<Local>,
}

struct DiskState {
    next_id: PhotoId,
    entries: BTreeMap<PhotoId, DiskEntry>,
    previews: HashMap<PhotoId, Arc<[u8]>>,
}

/// Persists photos as `IMG_<timestamp>_<id>.<ext>` files in one directory
///
/// The directory is scanned once at open, so photos from earlier runs show
/// up in listings. Previews are kept in memory only.
pub struct DiskStore {
    dir: PathBuf,
    state: Mutex<DiskState>,
}

impl DiskStore {
    /// Open a store at the given directory, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::Write(format!("cannot create {}: {}", dir.display(), e)))?;

        let mut entries = BTreeMap::new();
        let mut next_id: PhotoId = 1;

        let dir_entries = std::fs::read_dir(&dir)
            .map_err(|e| StorageError::Read(format!("cannot scan {}: {}", dir.display(), e)))?;
        for entry in dir_entries.flatten() {
            let path = entry.path();
            match parse_photo_filename(&path) {
                Some((id, created_at, format)) => {
                    let (width, height) = match image::ImageReader::open(&path)
                        .and_then(|reader| reader.with_guessed_format())
                        .map_err(|e| e.to_string())
                        .and_then(|reader| reader.into_dimensions().map_err(|e| e.to_string()))
                    {
                        Ok(dimensions) => dimensions,
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "Skipping unreadable photo");
                            continue;
                        }
                    };
                    next_id = next_id.max(id + 1);
                    entries.insert(
                        id,
                        DiskEntry {
                            path,
                            format,
                            width,
                            height,
                            created_at,
                        },
                    );
                }
                None => debug!(path = %path.display(), "Ignoring non-photo file"),
            }
        }

        info!(dir = %dir.display(), photos = entries.len(), "Photo store opened");
        Ok(Self {
            dir,
            state: Mutex::new(DiskState {
                next_id,
                entries,
                previews: HashMap::new(),
            }),
        })
    }

    /// Directory this store writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl PhotoStore for DiskStore {
    async fn add(&self, photo: NewPhoto) -> StorageResult<PhotoId> {
        let (id, path) = {
            let mut state = self.state.lock().unwrap();
            let id = state.next_id;
            state.next_id += 1;
            let filename = format!(
                "IMG_{}_{}.{}",
                photo.created_at.format("%Y%m%d_%H%M%S"),
                id,
                photo.format.extension()
            );
            (id, self.dir.join(filename))
        };

        tokio::fs::write(&path, photo.data.as_ref())
            .await
            .map_err(|e| StorageError::Write(format!("cannot write {}: {}", path.display(), e)))?;

        info!(id, path = %path.display(), size = photo.data.len(), "Photo saved");

        let mut state = self.state.lock().unwrap();
        state.entries.insert(
            id,
            DiskEntry {
                path,
                format: photo.format,
                width: photo.width,
                height: photo.height,
                created_at: photo.created_at,
            },
        );
        Ok(id)
    }

    async fn get_all(&self) -> StorageResult<Vec<CapturedPhoto>> {
        let (snapshot, previews) = {
            let state = self.state.lock().unwrap();
            (
                state
                    .entries
                    .iter()
                    .map(|(id, entry)| (*id, entry.clone()))
                    .collect::<Vec<_>>(),
                state.previews.clone(),
            )
        };

        let mut photos = Vec::with_capacity(snapshot.len());
        for (id, entry) in snapshot {
            match tokio::fs::read(&entry.path).await {
                Ok(data) => photos.push(CapturedPhoto {
                    id,
                    data: Arc::from(data),
                    format: entry.format,
                    width: entry.width,
                    height: entry.height,
                    created_at: entry.created_at,
                    preview: previews.get(&id).cloned(),
                }),
                Err(e) => {
                    // A file removed behind our back disappears from the
                    // listing rather than failing it.
                    warn!(id, path = %entry.path.display(), error = %e, "Skipping unreadable photo");
                }
            }
        }

        photos.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(photos)
    }

    async fn attach_preview(&self, id: PhotoId, preview: Arc<[u8]>) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.entries.contains_key(&id) {
            return Err(StorageError::NotFound(id));
        }
        state.previews.insert(id, preview);
        Ok(())
    }

    async fn delete(&self, id: PhotoId) -> StorageResult<()> {
        let path = {
            let state = self.state.lock().unwrap();
            match state.entries.get(&id) {
                Some(entry) => entry.path.clone(),
                None => return Err(StorageError::NotFound(id)),
            }
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            // Already gone counts as deleted
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::Delete(format!(
                    "cannot delete {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        let mut state = self.state.lock().unwrap();
        state.entries.remove(&id);
        state.previews.remove(&id);
        info!(id, path = %path.display(), "Photo deleted");
        Ok(())
    }

    async fn delete_all(&self) -> StorageResult<()> {
        let snapshot: Vec<(PhotoId, PathBuf)> = {
            let state = self.state.lock().unwrap();
            state
                .entries
                .iter()
                .map(|(id, entry)| (*id, entry.path.clone()))
                .collect()
        };

        let mut failed = 0usize;
        for (id, path) in snapshot {
            let removed = match tokio::fs::remove_file(&path).await {
                Ok(()) => true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
                Err(e) => {
                    warn!(id, path = %path.display(), error = %e, "Failed to delete photo");
                    failed += 1;
                    false
                }
            };
            if removed {
                let mut state = self.state.lock().unwrap();
                state.entries.remove(&id);
                state.previews.remove(&id);
            }
        }

        if failed > 0 {
            return Err(StorageError::Delete(format!(
                "{} photo(s) could not be deleted",
                failed
            )));
        }
        info!("All photos deleted");
        Ok(())
    }
}

/// Parse `IMG_%Y%m%d_%H%M%S_<id>.<ext>` into its parts
fn parse_photo_filename(path: &Path) -> Option<(PhotoId, DateTime<Local>, EncodingFormat)> {
    let format = match path.extension()?.to_str()? {
        ext if ext.eq_ignore_ascii_case("png") => EncodingFormat::Png,
        ext if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => {
            EncodingFormat::Jpeg
        }
        _ => return None,
    };

    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix("IMG_")?;
    let (timestamp, id) = rest.rsplit_once('_')?;
    let id: PhotoId = id.parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(timestamp, "%Y%m%d_%H%M%S").ok()?;
    let created_at = Local.from_local_datetime(&naive).single()?;

    Some((id, created_at, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_parsing() {
        let parsed = parse_photo_filename(Path::new("/photos/IMG_20260815_142233_7.png"))
            .expect("valid filename");
        assert_eq!(parsed.0, 7);
        assert_eq!(parsed.2, EncodingFormat::Png);
        assert_eq!(
            parsed.1.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2026-08-15 14:22:33"
        );
    }

    #[test]
    fn test_filename_parsing_rejects_foreign_files() {
        assert!(parse_photo_filename(Path::new("/photos/notes.txt")).is_none());
        assert!(parse_photo_filename(Path::new("/photos/holiday.png")).is_none());
        assert!(parse_photo_filename(Path::new("/photos/IMG_badstamp_x.png")).is_none());
    }
}
