use std::time::{Duration, Instant};

use crate::capture::auto_capture_scheduler::{AutoCaptureScheduler, SchedulerState, TimerToken};
use crate::capture::domain::camera::CaptureError;
use crate::capture::frame_sampler::FrameSampler;
use crate::capture::session::{CaptureSession, CaptureTrigger, LatestSample, SessionPhase};
use crate::enrollment::domain::enrollment_store::EnrollmentError;
use crate::enrollment::enrollment_decision::{
    DecisionOutcome, DecisionState, EnrollmentDecision, ReplaceChoice,
};
use crate::shared::frame_handle::FrameHandle;
use crate::validation::face_checklist::FaceChecklist;
use crate::validation::face_validator::{FaceValidator, ValidationVerdict};

/// What one sampling cycle produced, for display.
#[derive(Clone, Debug)]
pub struct CycleReport {
    pub verdict: ValidationVerdict,
    pub checklist: Option<FaceChecklist>,
    pub face_count: usize,
    pub frame: Option<FrameHandle>,
}

/// Drives one enrollment attempt: sampling, automatic and manual capture,
/// retake, and the enrollment decision that follows a confirmed capture.
///
/// Every mutation of the session goes through `&mut self`, so the sampler,
/// the auto-capture timer and user actions are serialized by construction.
pub struct CaptureCoordinator {
    session: CaptureSession,
    sampler: FrameSampler,
    scheduler: AutoCaptureScheduler,
    validator: FaceValidator,
    decision: EnrollmentDecision,
}

impl CaptureCoordinator {
    pub fn new(
        sampler: FrameSampler,
        scheduler: AutoCaptureScheduler,
        validator: FaceValidator,
        decision: EnrollmentDecision,
    ) -> Self {
        Self {
            session: CaptureSession::new(),
            sampler,
            scheduler,
            validator,
            decision,
        }
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn scheduler(&self) -> &AutoCaptureScheduler {
        &self.scheduler
    }

    pub fn decision(&self) -> &EnrollmentDecision {
        &self.decision
    }

    pub fn sample_interval(&self) -> Duration {
        self.sampler.interval()
    }

    /// The armed auto-capture timer, if any: its deadline and the token that
    /// must be presented to fire it.
    pub fn pending_timer(&self) -> Option<(Instant, TimerToken)> {
        match self.scheduler.state() {
            SchedulerState::Armed { deadline, token } => Some((deadline, token)),
            SchedulerState::Idle => None,
        }
    }

    /// Runs one sampling cycle and feeds its verdict to the scheduler.
    ///
    /// Returns `None` without touching the camera when the session is not
    /// sampling or a cycle is already in flight.
    pub fn sample_cycle(&mut self, now: Instant) -> Option<CycleReport> {
        if !self.session.can_sample() {
            return None;
        }
        let outcome = self.sampler.sample()?;
        let verdict = self.validator.validate(&outcome.faces);
        let checklist = FaceChecklist::for_sample(&outcome.faces, self.validator.criteria());
        let report = CycleReport {
            verdict,
            checklist,
            face_count: outcome.faces.len(),
            frame: outcome.frame.clone(),
        };

        // Without a frame there is nothing the timer could commit.
        let committable = verdict.is_valid() && outcome.frame.is_some();
        self.session.record_sample(LatestSample {
            frame: outcome.frame,
            faces: outcome.faces,
            verdict,
        });
        self.scheduler
            .observe(committable, self.session.has_committed_image(), now);

        Some(report)
    }

    /// Fires whichever auto-capture timer is currently armed, if it is due.
    pub fn fire_due_timer(&mut self, now: Instant) -> bool {
        match self.pending_timer() {
            Some((_, token)) => self.fire_timer(token, now),
            None => false,
        }
    }

    /// Fires the timer `token` was issued for.
    ///
    /// Nothing happens if the token was cancelled or replaced, or the deadline
    /// has not passed. Re-checks the session at fire time: the commit happens
    /// only while sampling is active, nothing is committed yet, and the most
    /// recent sample is still valid. Returns `true` if this call committed.
    pub fn fire_timer(&mut self, token: TimerToken, now: Instant) -> bool {
        if !self.scheduler.fire(token, now) {
            return false;
        }
        let frame = match self.session.latest() {
            Some(LatestSample {
                frame: Some(frame),
                verdict,
                ..
            }) if verdict.is_valid() => frame.clone(),
            _ => {
                log::debug!("Auto-capture timer fired without a valid sample, ignoring");
                return false;
            }
        };
        self.commit(frame, CaptureTrigger::Automatic)
    }

    /// User-initiated capture, bypassing the stability window.
    ///
    /// Returns `Ok(false)` when the session is not accepting captures.
    /// Camera failures are returned and leave the session sampling.
    pub fn capture_manually(&mut self) -> Result<bool, CaptureError> {
        if !self.session.can_sample() {
            return Ok(false);
        }
        let frame = self.sampler.capture_still()?;
        Ok(self.commit(frame, CaptureTrigger::Manual))
    }

    /// Designates `frame` as the session's image. Only the first call wins.
    pub fn commit(&mut self, frame: FrameHandle, trigger: CaptureTrigger) -> bool {
        let sequence = frame.sequence();
        if !self.session.commit(frame, trigger) {
            log::debug!("Ignoring {trigger:?} commit of frame {sequence}: session already committed");
            return false;
        }
        self.scheduler.cancel();
        log::info!("Committed frame {sequence} ({trigger:?})");
        true
    }

    /// Discards any committed image and restarts sampling.
    ///
    /// Enrolled and ended sessions are final; retake leaves them untouched
    /// and returns `false`.
    pub fn retake(&mut self) -> bool {
        if matches!(
            self.session.phase(),
            SessionPhase::Enrolled | SessionPhase::Ended
        ) {
            log::debug!("Retake ignored: session is {:?}", self.session.phase());
            return false;
        }
        self.scheduler.cancel();
        self.decision.reset();
        self.session.reset();
        log::info!("Retake: sampling restarted");
        true
    }

    /// Stops the session for good. Any armed timer is dropped first.
    pub fn teardown(&mut self) {
        self.scheduler.cancel();
        self.session.end();
    }

    /// The user accepted the reviewed capture.
    pub fn confirm(&mut self) -> Result<DecisionOutcome, EnrollmentError> {
        let frame = self.committed_frame()?;
        let result = self.decision.confirm(&frame);
        self.settle(result)
    }

    /// Answer to the replace-existing-enrollment question.
    pub fn choose(&mut self, choice: ReplaceChoice) -> Result<DecisionOutcome, EnrollmentError> {
        let frame = self.committed_frame()?;
        let result = self.decision.choose(choice, &frame);
        self.settle(result)
    }

    fn settle(
        &mut self,
        result: Result<DecisionOutcome, EnrollmentError>,
    ) -> Result<DecisionOutcome, EnrollmentError> {
        match result {
            Ok(outcome) => {
                self.apply(outcome);
                Ok(outcome)
            }
            Err(e) => {
                // A failed write drops the decision back to pending; the
                // committed image stays up for review and a fresh confirm.
                if self.decision.state() == DecisionState::Pending {
                    self.session.set_phase(SessionPhase::Review);
                }
                Err(e)
            }
        }
    }

    fn committed_frame(&self) -> Result<FrameHandle, EnrollmentError> {
        self.session
            .committed_image()
            .map(|c| c.frame.clone())
            .ok_or(EnrollmentError::NothingCommitted)
    }

    fn apply(&mut self, outcome: DecisionOutcome) {
        match outcome {
            DecisionOutcome::Enrolled => {
                self.session.set_phase(SessionPhase::Enrolled);
                self.teardown();
            }
            DecisionOutcome::AwaitingReplaceChoice => {
                self.session.set_phase(SessionPhase::AwaitingReplaceChoice);
            }
            DecisionOutcome::KeptExisting => {
                self.retake();
            }
        }
    }
}
