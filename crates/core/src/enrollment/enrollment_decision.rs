use crate::enrollment::domain::enrollment_store::{EnrollmentError, EnrollmentStore};
use crate::enrollment::exchange_format::EncodedImage;
use crate::shared::frame_handle::FrameHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionState {
    /// Nothing confirmed yet, or a previous attempt failed and may be retried.
    Pending,
    AwaitReplaceChoice,
    /// The new image reached the store. Terminal.
    Proceeded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplaceChoice {
    Replace,
    Keep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
    Enrolled,
    AwaitingReplaceChoice,
    KeptExisting,
}

/// Resolves a confirmed capture into a new enrollment, a replacement, or
/// keeping the existing record.
///
/// The new image is written only on the proceed paths; choosing to keep
/// never touches the store.
pub struct EnrollmentDecision {
    store: Box<dyn EnrollmentStore>,
    state: DecisionState,
}

impl EnrollmentDecision {
    pub fn new(store: Box<dyn EnrollmentStore>) -> Self {
        Self {
            store,
            state: DecisionState::Pending,
        }
    }

    pub fn state(&self) -> DecisionState {
        self.state
    }

    pub fn store(&self) -> &dyn EnrollmentStore {
        &*self.store
    }

    /// The user accepted the reviewed capture.
    pub fn confirm(&mut self, image: &FrameHandle) -> Result<DecisionOutcome, EnrollmentError> {
        match self.state {
            DecisionState::Proceeded => Ok(DecisionOutcome::Enrolled),
            DecisionState::AwaitReplaceChoice => Ok(DecisionOutcome::AwaitingReplaceChoice),
            DecisionState::Pending => {
                if self.store.has_enrollment()? {
                    log::info!("Existing enrollment found, asking whether to replace it");
                    self.state = DecisionState::AwaitReplaceChoice;
                    Ok(DecisionOutcome::AwaitingReplaceChoice)
                } else {
                    self.proceed(image)
                }
            }
        }
    }

    pub fn choose(
        &mut self,
        choice: ReplaceChoice,
        image: &FrameHandle,
    ) -> Result<DecisionOutcome, EnrollmentError> {
        if self.state != DecisionState::AwaitReplaceChoice {
            return Err(EnrollmentError::NoPendingChoice);
        }
        match choice {
            ReplaceChoice::Replace => {
                // A failed clear leaves the choice pending so it can be retried.
                self.store.clear()?;
                log::info!("Previous enrollment cleared");
                self.proceed(image)
            }
            ReplaceChoice::Keep => {
                log::info!("Keeping existing enrollment, discarding new capture");
                self.state = DecisionState::Pending;
                Ok(DecisionOutcome::KeptExisting)
            }
        }
    }

    /// Back to `Pending` for a fresh capture.
    pub fn reset(&mut self) {
        self.state = DecisionState::Pending;
    }

    fn proceed(&mut self, image: &FrameHandle) -> Result<DecisionOutcome, EnrollmentError> {
        let result = EncodedImage::from_frame(image).and_then(|encoded| self.store.enroll(&encoded));
        match result {
            Ok(()) => {
                log::info!("Enrolled face image from frame {}", image.sequence());
                self.state = DecisionState::Proceeded;
                Ok(DecisionOutcome::Enrolled)
            }
            Err(e) => {
                self.state = DecisionState::Pending;
                Err(e)
            }
        }
    }
}
