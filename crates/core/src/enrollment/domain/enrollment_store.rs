use std::path::PathBuf;

use thiserror::Error;

use crate::enrollment::exchange_format::EncodedImage;

#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error("failed to read captured image {path}: {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read enrollment store {path}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write enrollment store {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid enrollment store {path}: {message}")]
    InvalidStore { path: PathBuf, message: String },
    #[error("could not determine data directory")]
    NoDataDir,
    #[error("enrollment store unavailable: {0}")]
    Unavailable(String),
    #[error("no committed image to enroll")]
    NothingCommitted,
    #[error("no replace decision is pending")]
    NoPendingChoice,
}

/// Persistence boundary holding at most one enrolled face image.
///
/// The core only ever asks whether a record exists, clears it on an explicit
/// replace, and hands over a newly encoded image.
pub trait EnrollmentStore: Send {
    fn has_enrollment(&self) -> Result<bool, EnrollmentError>;

    fn clear(&mut self) -> Result<(), EnrollmentError>;

    fn enroll(&mut self, image: &EncodedImage) -> Result<(), EnrollmentError>;
}
