use std::sync::{Arc, Mutex, MutexGuard};

use crate::enrollment::domain::enrollment_store::{EnrollmentError, EnrollmentStore};
use crate::enrollment::exchange_format::EncodedImage;

#[derive(Debug, Default)]
struct Inner {
    record: Option<EncodedImage>,
    #[cfg(test)]
    operations: Vec<&'static str>,
    #[cfg(test)]
    fail_next_enroll: bool,
}

/// Process-local store. Clones share the same record, so a caller can keep
/// a handle to inspect what a session wrote.
#[derive(Clone, Debug, Default)]
pub struct InMemoryEnrollmentStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(image: EncodedImage) -> Self {
        let store = Self::new();
        store.lock().record = Some(image);
        store
    }

    pub fn current(&self) -> Option<EncodedImage> {
        self.lock().record.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
impl InMemoryEnrollmentStore {
    /// Mutating calls in the order they were made.
    pub(crate) fn operations(&self) -> Vec<&'static str> {
        self.lock().operations.clone()
    }

    /// Number of `enroll` attempts, successful or not.
    pub(crate) fn enroll_calls(&self) -> usize {
        self.lock().operations.iter().filter(|op| **op == "enroll").count()
    }

    /// Makes the next `enroll` call fail once.
    pub(crate) fn fail_next_enroll(&self) {
        self.lock().fail_next_enroll = true;
    }
}

impl EnrollmentStore for InMemoryEnrollmentStore {
    fn has_enrollment(&self) -> Result<bool, EnrollmentError> {
        Ok(self.lock().record.is_some())
    }

    fn clear(&mut self) -> Result<(), EnrollmentError> {
        let mut inner = self.lock();
        #[cfg(test)]
        inner.operations.push("clear");
        inner.record = None;
        Ok(())
    }

    fn enroll(&mut self, image: &EncodedImage) -> Result<(), EnrollmentError> {
        let mut inner = self.lock();
        #[cfg(test)]
        {
            inner.operations.push("enroll");
            if std::mem::take(&mut inner.fail_next_enroll) {
                return Err(EnrollmentError::Unavailable("simulated write failure".into()));
            }
        }
        inner.record = Some(image.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryEnrollmentStore::new();
        let mut writer = store.clone();
        writer.enroll(&EncodedImage::from_bytes(b"x")).unwrap();
        assert!(store.has_enrollment().unwrap());
        assert_eq!(store.current(), Some(EncodedImage::from_bytes(b"x")));
    }

    #[test]
    fn test_clear_removes_record() {
        let mut store = InMemoryEnrollmentStore::with_existing(EncodedImage::from_bytes(b"x"));
        store.clear().unwrap();
        assert!(!store.has_enrollment().unwrap());
        assert_eq!(store.operations(), vec!["clear"]);
    }

    #[test]
    fn test_simulated_failure_applies_once() {
        let mut store = InMemoryEnrollmentStore::new();
        store.fail_next_enroll();
        assert!(store.enroll(&EncodedImage::from_bytes(b"x")).is_err());
        assert!(store.current().is_none());
        assert!(store.enroll(&EncodedImage::from_bytes(b"x")).is_ok());
        assert_eq!(store.enroll_calls(), 2);
    }
}
