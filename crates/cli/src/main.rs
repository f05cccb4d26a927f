mod console;
mod settings;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossbeam_channel::{select, Receiver};

use face_enroll_core::capture::auto_capture_scheduler::AutoCaptureScheduler;
use face_enroll_core::capture::capture_coordinator::CaptureCoordinator;
use face_enroll_core::capture::frame_sampler::FrameSampler;
use face_enroll_core::capture::infrastructure::replay_camera::ReplayCamera;
use face_enroll_core::detection::infrastructure::sidecar_face_detector::SidecarFaceDetector;
use face_enroll_core::enrollment::domain::enrollment_store::EnrollmentStore;
use face_enroll_core::enrollment::enrollment_decision::{EnrollmentDecision, ReplaceChoice};
use face_enroll_core::enrollment::exchange_format::EncodedImage;
use face_enroll_core::enrollment::infrastructure::file_enrollment_store::{
    default_store_path, FileEnrollmentStore,
};
use face_enroll_core::enrollment::infrastructure::memory_enrollment_store::InMemoryEnrollmentStore;
use face_enroll_core::pipeline::capture_worker::{self, CaptureCommand, CaptureEvent, CaptureWorker};
use face_enroll_core::validation::face_validator::{FaceValidator, VerdictReason};

use console::Input;
use settings::Settings;

/// Face enrollment capture from a directory of recorded frames.
#[derive(Parser)]
#[command(name = "face-enroll")]
struct Cli {
    /// Settings file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enrollment store file (defaults to the platform data directory).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a capture session against recorded frames.
    Capture(CaptureArgs),
    /// Report whether a face is enrolled.
    Status,
    /// Remove the enrolled face.
    Clear,
    /// Print the effective settings.
    Settings {
        /// Write the effective settings back to the settings file.
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
struct CaptureArgs {
    /// Directory of frames; detections are read from a .json file next to each frame.
    #[arg(long)]
    frames: PathBuf,

    /// Restart from the first frame after the last one.
    #[arg(long)]
    loop_frames: bool,

    /// Sampling interval in milliseconds (overrides settings).
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Auto-capture delay in milliseconds (overrides settings).
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Confirm the captured image without waiting for input.
    #[arg(long)]
    auto_confirm: bool,

    /// What to do when a face is already enrolled.
    #[arg(long, value_enum, default_value = "ask")]
    on_existing: OnExisting,

    /// Keep the enrollment in memory instead of writing the store.
    #[arg(long)]
    dry_run: bool,

    /// Give up after this many seconds without an enrollment.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnExisting {
    Ask,
    Replace,
    Keep,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match &cli.command {
        Command::Capture(args) => {
            validate(args)?;
            let settings = apply_overrides(settings, args);
            settings.validate()?;
            run_capture(args, &settings, cli.store.as_deref())
        }
        Command::Status => run_status(&store_path(cli.store.as_deref())?),
        Command::Clear => run_clear(&store_path(cli.store.as_deref())?),
        Command::Settings { save } => run_settings(&settings, cli.config.as_deref(), *save),
    }
}

fn load_settings(config: Option<&Path>) -> Result<Settings, settings::SettingsError> {
    match config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
}

fn validate(args: &CaptureArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.frames.is_dir() {
        return Err(format!("Frames directory not found: {}", args.frames.display()).into());
    }
    if args.interval_ms == Some(0) {
        return Err("--interval-ms must be greater than 0".into());
    }
    if args.timeout_secs == Some(0) {
        return Err("--timeout-secs must be greater than 0".into());
    }
    if args.dry_run && args.on_existing != OnExisting::Ask {
        log::warn!("--on-existing has no effect with --dry-run: the in-memory store starts empty");
    }
    Ok(())
}

fn apply_overrides(mut settings: Settings, args: &CaptureArgs) -> Settings {
    if let Some(ms) = args.interval_ms {
        settings.sample_interval_ms = ms;
    }
    if let Some(ms) = args.delay_ms {
        settings.auto_capture_delay_ms = ms;
    }
    settings
}

fn store_path(explicit: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(default_store_path()?),
    }
}

fn run_capture(
    args: &CaptureArgs,
    settings: &Settings,
    store: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let camera = ReplayCamera::open(&args.frames, args.loop_frames)?;
    eprintln!(
        "Replaying {} frames from {}",
        camera.frame_count(),
        args.frames.display()
    );

    let dry_run_store = args.dry_run.then(InMemoryEnrollmentStore::new);
    let store: Box<dyn EnrollmentStore> = match &dry_run_store {
        Some(memory) => Box::new(memory.clone()),
        None => Box::new(FileEnrollmentStore::new(store_path(store)?)),
    };

    let sampler = FrameSampler::new(
        Box::new(camera),
        Box::new(SidecarFaceDetector::new()),
        settings.sample_interval(),
    );
    let coordinator = CaptureCoordinator::new(
        sampler,
        AutoCaptureScheduler::new(settings.auto_capture_delay()),
        FaceValidator::new(settings.criteria.clone()),
        EnrollmentDecision::new(store),
    );

    let worker = capture_worker::spawn(coordinator);
    let input = spawn_stdin_reader();
    eprintln!("{}", console::HELP);

    let result = drive_session(&worker, &input, args);
    let coordinator = worker
        .stop()
        .map_err(|_| "capture worker panicked")?;
    log::debug!("Session finished in phase {:?}", coordinator.session().phase());
    if let Some(image) = dry_run_store.and_then(|memory| memory.current()) {
        println!(
            "Dry run: {} byte image would have been enrolled.",
            image.decoded_len()
        );
    }
    result
}

/// Relays worker events to the terminal and user input to the worker until
/// the session reaches an end state.
fn drive_session(
    worker: &CaptureWorker,
    input: &Receiver<String>,
    args: &CaptureArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let deadline = match args.timeout_secs {
        Some(secs) => crossbeam_channel::after(Duration::from_secs(secs)),
        None => crossbeam_channel::never(),
    };
    let mut input = Some(input.clone());
    let mut last_reason: Option<VerdictReason> = None;

    loop {
        let lines = input.clone().unwrap_or_else(crossbeam_channel::never);
        select! {
            recv(worker.events()) -> event => {
                let Ok(event) = event else {
                    return Err("capture worker exited unexpectedly".into());
                };
                match handle_event(worker, event, args, &mut last_reason)? {
                    Flow::Continue => {}
                    Flow::Done => return Ok(()),
                }
            },
            recv(lines) -> line => match line {
                Ok(line) => match console::parse_input(&line) {
                    Some(Input::Command(command)) => worker.send(command)?,
                    Some(Input::Quit) => {
                        println!("Session ended without enrollment.");
                        return Ok(());
                    }
                    Some(Input::Help) => eprintln!("{}", console::HELP),
                    Some(Input::Unknown(word)) => {
                        eprintln!("Unknown command '{word}'. {}", console::HELP)
                    }
                    None => {}
                },
                // Stdin closed; keep running on auto-capture alone.
                Err(_) => input = None,
            },
            recv(deadline) -> _ => {
                return Err(format!(
                    "no enrollment within {}s",
                    args.timeout_secs.unwrap_or_default()
                )
                .into());
            },
        }
    }
}

enum Flow {
    Continue,
    Done,
}

fn handle_event(
    worker: &CaptureWorker,
    event: CaptureEvent,
    args: &CaptureArgs,
    last_reason: &mut Option<VerdictReason>,
) -> Result<Flow, Box<dyn std::error::Error>> {
    match event {
        CaptureEvent::Sampled {
            verdict, checklist, ..
        } => {
            if *last_reason != Some(verdict.reason()) {
                *last_reason = Some(verdict.reason());
                let hint = if verdict.can_manually_capture() {
                    " (press c to capture)"
                } else {
                    ""
                };
                println!("{verdict}{hint}");
                if let Some(checklist) = checklist {
                    println!("  {}", console::render_checklist(&checklist));
                }
            }
        }
        CaptureEvent::Committed { frame, trigger } => {
            *last_reason = None;
            println!(
                "Captured {} by {}.",
                frame.path().display(),
                console::trigger_label(trigger)
            );
            if args.auto_confirm {
                worker.send(CaptureCommand::Confirm)?;
            } else {
                println!("Confirm with 'y' or retake with 'r'.");
            }
        }
        CaptureEvent::CaptureFailed(message) => {
            eprintln!("Capture failed: {message}. Try again.");
        }
        CaptureEvent::AwaitingReplaceChoice => match args.on_existing {
            OnExisting::Replace => worker.send(CaptureCommand::Choose(ReplaceChoice::Replace))?,
            OnExisting::Keep => worker.send(CaptureCommand::Choose(ReplaceChoice::Keep))?,
            OnExisting::Ask => {
                println!("A face is already enrolled. Type 'replace' to overwrite it or 'keep' to discard this capture.");
            }
        },
        CaptureEvent::Enrolled => {
            println!("Face enrolled.");
            return Ok(Flow::Done);
        }
        CaptureEvent::KeptExisting => {
            println!("Kept the existing enrollment.");
            // Unattended keep would otherwise capture and discard forever.
            if args.on_existing == OnExisting::Keep {
                return Ok(Flow::Done);
            }
            println!("Sampling restarted.");
        }
        CaptureEvent::EnrollmentFailed(message) => {
            if args.auto_confirm {
                return Err(format!("enrollment failed: {message}").into());
            }
            eprintln!("Enrollment failed: {message}. Retry with 'y' or retake with 'r'.");
        }
        CaptureEvent::Retaken => {
            *last_reason = None;
            println!("Retake: sampling restarted.");
        }
        CaptureEvent::Stopped => {
            return Err("capture session stopped".into());
        }
    }
    Ok(Flow::Continue)
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded::<String>();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn run_status(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match FileEnrollmentStore::new(path).load()? {
        Some(record) => {
            let image = EncodedImage::from_base64(record.enrolled_image_base64);
            println!(
                "Enrolled: {} byte image, stored at unix ms {} ({})",
                image.decoded_len(),
                record.enrolled_at_unix_ms,
                path.display()
            );
        }
        None => println!("No face enrolled ({})", path.display()),
    }
    Ok(())
}

/// Removes the store file whatever its contents, so a corrupt record can
/// always be reset.
fn run_clear(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        println!("No face enrolled.");
        return Ok(());
    }
    FileEnrollmentStore::new(path).clear()?;
    println!("Enrollment removed from {}", path.display());
    Ok(())
}

fn run_settings(
    settings: &Settings,
    config: Option<&Path>,
    save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    settings.validate()?;
    println!("{}", serde_json::to_string_pretty(settings)?);
    if save {
        let path = match config {
            Some(path) => {
                settings.save_to(path)?;
                path.to_path_buf()
            }
            None => settings.save()?,
        };
        eprintln!("Settings saved to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_clear_removes_corrupt_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_enrollment.json");
        fs::write(&path, "{ truncated").unwrap();
        assert!(FileEnrollmentStore::new(&path).has_enrollment().is_err());

        run_clear(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_clear_without_store_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_enrollment.json");
        run_clear(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_clear_removes_valid_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_enrollment.json");
        FileEnrollmentStore::new(&path)
            .enroll(&EncodedImage::from_bytes(b"face"))
            .unwrap();

        run_clear(&path).unwrap();
        assert!(!FileEnrollmentStore::new(&path).has_enrollment().unwrap());
    }
}
