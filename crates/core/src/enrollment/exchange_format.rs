use std::fs;

use base64::{engine::general_purpose, Engine as _};

use crate::enrollment::domain::enrollment_store::EnrollmentError;
use crate::shared::frame_handle::FrameHandle;

/// Captured image bytes as standard base64, the form stores exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(general_purpose::STANDARD.encode(bytes))
    }

    /// Reads the frame's file and encodes it.
    pub fn from_frame(frame: &FrameHandle) -> Result<Self, EnrollmentError> {
        let bytes = fs::read(frame.path()).map_err(|source| EnrollmentError::ReadImage {
            path: frame.path().to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Wraps an already-encoded string, e.g. one loaded back from a store.
    pub fn from_base64(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        general_purpose::STANDARD.decode(&self.0)
    }

    /// Size of the decoded image in bytes.
    pub fn decoded_len(&self) -> usize {
        let padding = self.0.bytes().rev().take_while(|&b| b == b'=').count();
        (self.0.len() / 4 * 3).saturating_sub(padding)
    }
}
