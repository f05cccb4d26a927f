use face_enroll_core::capture::session::CaptureTrigger;
use face_enroll_core::enrollment::enrollment_decision::ReplaceChoice;
use face_enroll_core::pipeline::capture_worker::CaptureCommand;
use face_enroll_core::validation::face_checklist::FaceChecklist;

pub const HELP: &str = "Commands: c = capture now, r = retake, y = confirm, \
replace / keep = answer the replace prompt, q = quit";

/// One line typed by the user.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(CaptureCommand),
    Quit,
    Help,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Option<Input> {
    let word = line.trim().to_ascii_lowercase();
    let input = match word.as_str() {
        "" => return None,
        "c" | "capture" => Input::Command(CaptureCommand::CaptureNow),
        "r" | "retake" => Input::Command(CaptureCommand::Retake),
        "y" | "yes" | "confirm" => Input::Command(CaptureCommand::Confirm),
        "replace" => Input::Command(CaptureCommand::Choose(ReplaceChoice::Replace)),
        "keep" => Input::Command(CaptureCommand::Choose(ReplaceChoice::Keep)),
        "q" | "quit" => Input::Quit,
        "h" | "help" | "?" => Input::Help,
        _ => Input::Unknown(word),
    };
    Some(input)
}

pub fn render_checklist(checklist: &FaceChecklist) -> String {
    let mark = |ok: bool| if ok { "x" } else { " " };
    format!(
        "[{}] eyes open  [{}] centered  [{}] head straight  [{}] clear face",
        mark(checklist.eyes_open),
        mark(checklist.centered),
        mark(checklist.head_straight),
        mark(checklist.clear_face),
    )
}

pub fn trigger_label(trigger: CaptureTrigger) -> &'static str {
    match trigger {
        CaptureTrigger::Automatic => "auto-capture",
        CaptureTrigger::Manual => "manual capture",
    }
}
