use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::enrollment::domain::enrollment_store::{EnrollmentError, EnrollmentStore};
use crate::enrollment::exchange_format::EncodedImage;
use crate::shared::constants::{APP_DIR_NAME, ENROLLMENT_FILE_NAME};

/// On-disk form of the single enrolled face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub enrolled_image_base64: String,
    pub enrolled_at_unix_ms: u64,
}

/// Keeps the enrollment as one JSON file, replaced atomically on write.
pub struct FileEnrollmentStore {
    path: PathBuf,
}

impl FileEnrollmentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform data directory, e.g.
    /// `~/.local/share/FaceEnroll/face_enrollment.json` on Linux.
    pub fn at_default_location() -> Result<Self, EnrollmentError> {
        Ok(Self::new(default_store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<EnrollmentRecord>, EnrollmentError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(EnrollmentError::StoreRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| EnrollmentError::InvalidStore {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    fn write_error(&self, source: std::io::Error) -> EnrollmentError {
        EnrollmentError::StoreWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl EnrollmentStore for FileEnrollmentStore {
    fn has_enrollment(&self) -> Result<bool, EnrollmentError> {
        Ok(self.load()?.is_some())
    }

    fn clear(&mut self) -> Result<(), EnrollmentError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_error(e)),
        }
    }

    fn enroll(&mut self, image: &EncodedImage) -> Result<(), EnrollmentError> {
        let record = EnrollmentRecord {
            enrolled_image_base64: image.as_str().to_string(),
            enrolled_at_unix_ms: unix_millis(),
        };
        let json = serde_json::to_vec_pretty(&record).map_err(|e| EnrollmentError::InvalidStore {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.write_error(e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.write_error(e))?;
        tmp.write_all(&json).map_err(|e| self.write_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.write_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.write_error(e.error))?;
        Ok(())
    }
}

pub fn default_store_path() -> Result<PathBuf, EnrollmentError> {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME).join(ENROLLMENT_FILE_NAME))
        .ok_or(EnrollmentError::NoDataDir)
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
