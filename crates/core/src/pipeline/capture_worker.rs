use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{select, Receiver, SendError, Sender};

use crate::capture::capture_coordinator::{CaptureCoordinator, CycleReport};
use crate::capture::session::CaptureTrigger;
use crate::enrollment::domain::enrollment_store::EnrollmentError;
use crate::enrollment::enrollment_decision::{DecisionOutcome, ReplaceChoice};
use crate::shared::frame_handle::FrameHandle;
use crate::validation::face_checklist::FaceChecklist;
use crate::validation::face_validator::ValidationVerdict;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureCommand {
    CaptureNow,
    Retake,
    Confirm,
    Choose(ReplaceChoice),
    Stop,
}

#[derive(Clone, Debug)]
pub enum CaptureEvent {
    Sampled {
        verdict: ValidationVerdict,
        checklist: Option<FaceChecklist>,
        face_count: usize,
    },
    Committed {
        frame: FrameHandle,
        trigger: CaptureTrigger,
    },
    CaptureFailed(String),
    AwaitingReplaceChoice,
    Enrolled,
    KeptExisting,
    EnrollmentFailed(String),
    Retaken,
    Stopped,
}

/// Handle to a session running on its own thread.
///
/// The thread owns the coordinator, so sampling ticks, the auto-capture
/// deadline and user commands are handled one at a time.
pub struct CaptureWorker {
    commands: Sender<CaptureCommand>,
    events: Receiver<CaptureEvent>,
    handle: JoinHandle<CaptureCoordinator>,
}

impl CaptureWorker {
    pub fn send(&self, command: CaptureCommand) -> Result<(), SendError<CaptureCommand>> {
        self.commands.send(command)
    }

    pub fn events(&self) -> &Receiver<CaptureEvent> {
        &self.events
    }

    /// Asks the worker to tear down and waits for it, handing back the
    /// coordinator for inspection.
    pub fn stop(self) -> thread::Result<CaptureCoordinator> {
        let _ = self.commands.send(CaptureCommand::Stop);
        self.handle.join()
    }
}

pub fn spawn(coordinator: CaptureCoordinator) -> CaptureWorker {
    let (command_tx, command_rx) = crossbeam_channel::unbounded::<CaptureCommand>();
    let (event_tx, event_rx) = crossbeam_channel::unbounded::<CaptureEvent>();

    let handle = thread::spawn(move || run_session(coordinator, &command_rx, &event_tx));

    CaptureWorker {
        commands: command_tx,
        events: event_rx,
        handle,
    }
}

fn run_session(
    mut coordinator: CaptureCoordinator,
    commands: &Receiver<CaptureCommand>,
    events: &Sender<CaptureEvent>,
) -> CaptureCoordinator {
    let ticker = crossbeam_channel::tick(coordinator.sample_interval());
    log::info!(
        "Capture session started, sampling every {:?}",
        coordinator.sample_interval()
    );

    loop {
        // Rebuilt every iteration so a cancelled deadline is never waited on.
        let pending = coordinator.pending_timer();
        let timer = match pending {
            Some((deadline, _)) => crossbeam_channel::at(deadline),
            None => crossbeam_channel::never(),
        };

        select! {
            recv(commands) -> msg => match msg {
                Ok(CaptureCommand::Stop) | Err(_) => break,
                Ok(command) => handle_command(&mut coordinator, command, events),
            },
            recv(ticker) -> _ => {
                if let Some(report) = coordinator.sample_cycle(Instant::now()) {
                    emit(events, sampled(report));
                }
            },
            recv(timer) -> _ => {
                if let Some((_, token)) = pending {
                    if coordinator.fire_timer(token, Instant::now()) {
                        emit_committed(&coordinator, events);
                    }
                }
            },
        }
    }

    coordinator.teardown();
    log::info!("Capture session stopped");
    emit(events, CaptureEvent::Stopped);
    coordinator
}

fn handle_command(
    coordinator: &mut CaptureCoordinator,
    command: CaptureCommand,
    events: &Sender<CaptureEvent>,
) {
    match command {
        CaptureCommand::CaptureNow => match coordinator.capture_manually() {
            Ok(true) => emit_committed(coordinator, events),
            Ok(false) => log::debug!("Manual capture ignored: session not sampling"),
            Err(e) => {
                log::warn!("Manual capture failed: {e}");
                emit(events, CaptureEvent::CaptureFailed(e.to_string()));
            }
        },
        CaptureCommand::Retake => {
            if coordinator.retake() {
                emit(events, CaptureEvent::Retaken);
            }
        }
        CaptureCommand::Confirm => emit_decision(coordinator.confirm(), events),
        CaptureCommand::Choose(choice) => emit_decision(coordinator.choose(choice), events),
        CaptureCommand::Stop => {}
    }
}

fn emit_decision(result: Result<DecisionOutcome, EnrollmentError>, events: &Sender<CaptureEvent>) {
    let event = match result {
        Ok(DecisionOutcome::Enrolled) => CaptureEvent::Enrolled,
        Ok(DecisionOutcome::AwaitingReplaceChoice) => CaptureEvent::AwaitingReplaceChoice,
        Ok(DecisionOutcome::KeptExisting) => CaptureEvent::KeptExisting,
        Err(e) => {
            log::error!("Enrollment failed: {e}");
            CaptureEvent::EnrollmentFailed(e.to_string())
        }
    };
    emit(events, event);
}

fn emit_committed(coordinator: &CaptureCoordinator, events: &Sender<CaptureEvent>) {
    if let Some(committed) = coordinator.session().committed_image() {
        emit(
            events,
            CaptureEvent::Committed {
                frame: committed.frame.clone(),
                trigger: committed.trigger,
            },
        );
    }
}

fn sampled(report: CycleReport) -> CaptureEvent {
    CaptureEvent::Sampled {
        verdict: report.verdict,
        checklist: report.checklist,
        face_count: report.face_count,
    }
}

fn emit(events: &Sender<CaptureEvent>, event: CaptureEvent) {
    // Nobody listening is not an error; the session keeps its own state.
    let _ = events.send(event);
}
